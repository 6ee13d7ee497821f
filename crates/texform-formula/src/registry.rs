// this_file: crates/texform-formula/src/registry.rs

//! Symbol, command and predefined-formula tables shared by every formula.
//!
//! A [`Registry`] is built once (usually from the embedded defaults) and then passed by
//! reference into parsing and formula construction. Symbol and command tables are plain maps
//! filled before the registry is shared. External fonts and predefined formulas can still be
//! registered afterwards; those tables sit behind `parking_lot::RwLock`s, and callers that
//! register concurrently are responsible for ordering their calls.

use crate::atom::ExternalFont;
use crate::constants::AtomType;
use crate::formula::{Formula, FormulaParts};
use crate::parser::Parser;
use crate::unicode::UnicodeBlock;
use log::{debug, trace};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use texform_core::{Result, TexError};

const DEFAULTS_JSON: &str = include_str!("../resources/defaults.json");

/// A named symbol: its character and spacing class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SymbolDef {
    pub ch: char,
    #[serde(rename = "type")]
    pub kind: AtomType,
}

/// A user command expanded textually before parsing; `#1`..`#9` name its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MacroDef {
    #[serde(default)]
    pub args: usize,
    pub body: String,
}

impl MacroDef {
    /// Substitute arguments into the body.
    pub fn expand(&self, args: &[String]) -> String {
        let mut out = String::with_capacity(self.body.len());
        let mut chars = self.body.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '#' {
                if let Some(idx) = chars.peek().and_then(|c| c.to_digit(10)) {
                    chars.next();
                    if let Some(arg) = (idx as usize).checked_sub(1).and_then(|i| args.get(i)) {
                        out.push_str(arg);
                    }
                    continue;
                }
            }
            out.push(ch);
        }
        out
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegistryDocument {
    symbols: HashMap<String, SymbolDef>,
    symbol_mappings: HashMap<String, String>,
    symbol_formulas: HashMap<String, String>,
    commands: HashMap<String, MacroDef>,
    formulas: HashMap<String, String>,
}

fn single_char(name: &str, key: &str) -> Result<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(TexError::resource(
            name,
            format!("mapping key '{key}' is not a single character"),
        )),
    }
}

/// Lookup tables consulted by the parser and by formula construction.
#[derive(Debug, Default)]
pub struct Registry {
    symbols: HashMap<String, SymbolDef>,
    symbol_mappings: HashMap<char, String>,
    symbol_formulas: HashMap<char, String>,
    commands: HashMap<String, MacroDef>,
    external_fonts: RwLock<HashMap<UnicodeBlock, ExternalFont>>,
    predefined: RwLock<HashMap<String, String>>,
    cache: RwLock<HashMap<String, FormulaParts>>,
}

impl Registry {
    /// An empty registry: no symbols, no commands, no predefined formulas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated from the bundled resource tables.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry.merge_document("defaults.json", DEFAULTS_JSON.as_bytes())?;
        debug!(
            target: "texform::registry",
            "loaded defaults: {} symbols, {} commands, {} formulas",
            registry.symbols.len(),
            registry.commands.len(),
            registry.predefined.read().len()
        );
        Ok(registry)
    }

    /// Merge a full registry document (`symbols`, `symbol_mappings`, `symbol_formulas`,
    /// `commands`, `formulas`).
    pub fn load_json<R: Read>(&mut self, reader: R) -> Result<()> {
        self.merge_document("registry document", reader)
    }

    fn merge_document<R: Read>(&mut self, name: &str, reader: R) -> Result<()> {
        let doc: RegistryDocument =
            serde_json::from_reader(reader).map_err(|e| TexError::resource(name, e))?;
        self.symbols.extend(doc.symbols);
        self.merge_mappings(name, doc.symbol_mappings, doc.symbol_formulas)?;
        self.commands.extend(doc.commands);
        self.insert_predefined(doc.formulas);
        Ok(())
    }

    fn merge_mappings(
        &mut self,
        name: &str,
        symbols: HashMap<String, String>,
        formulas: HashMap<String, String>,
    ) -> Result<()> {
        for (key, symbol) in symbols {
            let ch = single_char(name, &key)?;
            if !self.symbols.contains_key(&symbol) {
                return Err(TexError::resource(
                    name,
                    format!("'{key}' maps to unknown symbol '{symbol}'"),
                ));
            }
            self.symbol_mappings.insert(ch, symbol);
        }
        for (key, source) in formulas {
            self.symbol_formulas.insert(single_char(name, &key)?, source);
        }
        Ok(())
    }

    /// Merge per-character mappings from a document holding `symbol_mappings` and/or
    /// `symbol_formulas`.
    pub fn add_symbol_mappings<R: Read>(&mut self, reader: R) -> Result<()> {
        let doc: RegistryDocument = serde_json::from_reader(reader)
            .map_err(|e| TexError::resource("symbol mappings", e))?;
        self.merge_mappings("symbol mappings", doc.symbol_mappings, doc.symbol_formulas)
    }

    /// Register predefined formulas from a JSON object of `name -> source`.
    pub fn add_predefined_formulas<R: Read>(&self, reader: R) -> Result<()> {
        let formulas: HashMap<String, String> = serde_json::from_reader(reader)
            .map_err(|e| TexError::resource("predefined formulas", e))?;
        self.insert_predefined(formulas);
        Ok(())
    }

    /// Register (or replace) one predefined formula.
    pub fn register_predefined(&self, name: impl Into<String>, source: impl Into<String>) {
        self.insert_predefined([(name.into(), source.into())]);
    }

    fn insert_predefined(&self, formulas: impl IntoIterator<Item = (String, String)>) {
        let mut predefined = self.predefined.write();
        let mut cache = self.cache.write();
        for (name, source) in formulas {
            cache.remove(&name);
            predefined.insert(name, source);
        }
    }

    pub fn is_predefined(&self, name: &str) -> bool {
        self.predefined.read().contains_key(name)
    }

    /// Whether `name` currently has a parsed instance cached.
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.read().contains_key(name)
    }

    /// Fetch a predefined formula.
    ///
    /// Sources are parsed on first use and cached; every call hands out an independent copy.
    pub fn get(&self, name: &str) -> Result<Formula<'_>> {
        self.get_nested(name, 0)
    }

    pub(crate) fn get_nested(&self, name: &str, depth: usize) -> Result<Formula<'_>> {
        let cached = self.cache.read().get(name).cloned();
        if let Some(parts) = cached {
            trace!(target: "texform::registry", "cache hit for '{name}'");
            return Ok(Formula::from_parts(self, parts));
        }

        let source = self
            .predefined
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| TexError::lookup(name))?;
        debug!(target: "texform::registry", "parsing predefined formula '{name}'");
        let formula = Parser::new(self, &source, false)
            .with_depth(depth)
            .parse_into(Formula::new(self))?;
        self.cache
            .write()
            .insert(name.to_string(), formula.to_parts());
        Ok(formula)
    }

    pub fn symbol(&self, name: &str) -> Option<SymbolDef> {
        self.symbols.get(name).copied()
    }

    pub fn command(&self, name: &str) -> Option<&MacroDef> {
        self.commands.get(name)
    }

    /// Register a symbol programmatically.
    pub fn add_symbol(&mut self, name: impl Into<String>, ch: char, kind: AtomType) {
        self.symbols.insert(name.into(), SymbolDef { ch, kind });
    }

    /// Register a command macro programmatically.
    pub fn add_command(&mut self, name: impl Into<String>, args: usize, body: impl Into<String>) {
        self.commands.insert(
            name.into(),
            MacroDef {
                args,
                body: body.into(),
            },
        );
    }

    /// Symbol a character maps to, if any.
    pub fn symbol_for_char(&self, ch: char) -> Option<(&str, SymbolDef)> {
        let name = self.symbol_mappings.get(&ch)?;
        self.symbols.get(name).map(|def| (name.as_str(), *def))
    }

    /// Formula source a character expands to, if any.
    pub fn formula_for_char(&self, ch: char) -> Option<&str> {
        self.symbol_formulas.get(&ch).map(String::as_str)
    }

    /// Associate fallback font families with a Unicode block.
    ///
    /// Passing `None` for both families removes the mapping. Any change to the Basic Latin
    /// mapping drops every cached predefined formula.
    pub fn register_external_font(
        &self,
        block: UnicodeBlock,
        sans_serif: Option<&str>,
        serif: Option<&str>,
    ) {
        if sans_serif.is_none() && serif.is_none() {
            self.external_fonts.write().remove(&block);
            debug!(target: "texform::registry", "removed external font for {block}");
        } else {
            let defaults = ExternalFont::default();
            let font = ExternalFont::new(
                sans_serif.unwrap_or(&defaults.sans_serif),
                serif.unwrap_or(&defaults.serif),
            );
            debug!(
                target: "texform::registry",
                "external font for {block}: sans={} serif={}",
                font.sans_serif,
                font.serif
            );
            self.external_fonts.write().insert(block, font);
        }
        if block == UnicodeBlock::BasicLatin {
            self.cache.write().clear();
        }
    }

    /// Same family for sans-serif and serif text.
    pub fn register_external_font_family(&self, block: UnicodeBlock, family: &str) {
        self.register_external_font(block, Some(family), Some(family));
    }

    /// Fonts for a block, or `SansSerif`/`Serif` when nothing is registered.
    pub fn external_font(&self, block: UnicodeBlock) -> ExternalFont {
        self.external_fonts
            .read()
            .get(&block)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_registered_block(&self, block: UnicodeBlock) -> bool {
        self.external_fonts.read().contains_key(&block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;

    #[test]
    fn test_defaults_load() {
        let registry = Registry::with_defaults().unwrap();
        assert_eq!(
            registry.symbol("alpha"),
            Some(SymbolDef {
                ch: 'α',
                kind: AtomType::Ordinary
            })
        );
        let (name, def) = registry.symbol_for_char('+').unwrap();
        assert_eq!(name, "plus");
        assert_eq!(def.kind, AtomType::BinaryOperator);
        assert_eq!(registry.formula_for_char('½'), Some("\\frac{1}{2}"));
        assert!(registry.command("abs").is_some());
        assert!(registry.is_predefined("implies"));
    }

    #[test]
    fn test_macro_expand() {
        let def = MacroDef {
            args: 2,
            body: "#2-#1#3".to_string(),
        };
        assert_eq!(def.expand(&["a".into(), "b".into()]), "b-a");
    }

    #[test]
    fn test_get_unknown_fails_with_lookup() {
        let registry = Registry::with_defaults().unwrap();
        let err = registry.get("undefined-name").unwrap_err();
        assert!(matches!(err, TexError::Lookup { ref name } if name == "undefined-name"));
    }

    #[test]
    fn test_loader_registration_then_get() {
        let registry = Registry::with_defaults().unwrap();
        assert!(registry.get("golden").is_err());
        registry
            .add_predefined_formulas(r#"{ "golden": "\\frac{1+x}{2}" }"#.as_bytes())
            .unwrap();

        let mut first = registry.get("golden").unwrap();
        let second = registry.get("golden").unwrap();
        assert_eq!(first.root(), second.root());

        first.add(Atom::Char { ch: 'z' });
        let third = registry.get("golden").unwrap();
        assert_ne!(first.root(), third.root());
        assert_eq!(second.root(), third.root());
    }

    #[test]
    fn test_basic_latin_font_invalidates_cache() {
        let registry = Registry::with_defaults().unwrap();
        registry.register_predefined("greeting", "\\text{hi}");

        let before = registry.get("greeting").unwrap();
        assert!(registry.is_cached("greeting"));
        assert!(matches!(
            before.root(),
            Some(Atom::Text { font, .. }) if font.sans_serif == "SansSerif"
        ));

        registry.register_external_font(UnicodeBlock::BasicLatin, Some("Inter"), Some("Lora"));
        assert!(!registry.is_cached("greeting"));

        let after = registry.get("greeting").unwrap();
        assert!(matches!(
            after.root(),
            Some(Atom::Text { font, .. }) if font.sans_serif == "Inter" && font.serif == "Lora"
        ));
    }

    #[test]
    fn test_basic_latin_removal_invalidates_cache() {
        let registry = Registry::with_defaults().unwrap();
        registry.register_predefined("greeting", "\\text{hi}");
        registry.register_external_font(UnicodeBlock::BasicLatin, Some("Inter"), Some("Lora"));
        let styled = registry.get("greeting").unwrap();
        assert!(matches!(
            styled.root(),
            Some(Atom::Text { font, .. }) if font.sans_serif == "Inter"
        ));
        assert!(registry.is_cached("greeting"));

        registry.register_external_font(UnicodeBlock::BasicLatin, None, None);
        assert!(!registry.is_cached("greeting"));
        assert!(!registry.is_registered_block(UnicodeBlock::BasicLatin));
        let plain = registry.get("greeting").unwrap();
        assert!(matches!(
            plain.root(),
            Some(Atom::Text { font, .. }) if font.sans_serif == "SansSerif" && font.serif == "Serif"
        ));
    }

    #[test]
    fn test_other_blocks_keep_cache() {
        let registry = Registry::with_defaults().unwrap();
        registry.get("log").unwrap();
        registry.register_external_font_family(UnicodeBlock::Greek, "GFS Didot");
        assert!(registry.is_cached("log"));
        assert!(registry.is_registered_block(UnicodeBlock::Greek));
    }

    #[test]
    fn test_external_font_defaults_and_removal() {
        let registry = Registry::new();
        assert_eq!(
            registry.external_font(UnicodeBlock::Cyrillic),
            ExternalFont::new("SansSerif", "Serif")
        );
        registry.register_external_font(UnicodeBlock::Cyrillic, Some("PT Sans"), None);
        assert_eq!(
            registry.external_font(UnicodeBlock::Cyrillic),
            ExternalFont::new("PT Sans", "Serif")
        );
        registry.register_external_font(UnicodeBlock::Cyrillic, None, None);
        assert!(!registry.is_registered_block(UnicodeBlock::Cyrillic));
    }

    #[test]
    fn test_bad_documents_are_resource_errors() {
        let mut registry = Registry::with_defaults().unwrap();
        let err = registry.load_json("not json".as_bytes()).unwrap_err();
        assert!(matches!(err, TexError::Resource { .. }));

        let err = registry
            .add_symbol_mappings(r#"{ "symbol_mappings": { "ab": "plus" } }"#.as_bytes())
            .unwrap_err();
        assert!(matches!(err, TexError::Resource { .. }));

        let err = registry
            .add_symbol_mappings(r#"{ "symbol_mappings": { "~": "nothing" } }"#.as_bytes())
            .unwrap_err();
        assert!(matches!(err, TexError::Resource { .. }));

        registry
            .add_symbol_mappings(r#"{ "symbol_mappings": { "÷": "div" } }"#.as_bytes())
            .unwrap();
        assert_eq!(registry.symbol_for_char('÷').unwrap().0, "div");
    }

    #[test]
    fn test_replacing_predefined_drops_stale_cache() {
        let registry = Registry::new();
        registry.register_predefined("x", "a");
        assert_eq!(registry.get("x").unwrap().root(), Some(&Atom::Char { ch: 'a' }));
        registry.register_predefined("x", "b");
        assert_eq!(registry.get("x").unwrap().root(), Some(&Atom::Char { ch: 'b' }));
    }
}
