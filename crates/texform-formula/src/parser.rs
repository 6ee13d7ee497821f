// this_file: crates/texform-formula/src/parser.rs

//! Parser for the TeX subset understood by texform.
//!
//! Offsets in parse errors count characters from the start of the source. Commands resolve
//! in this order: built-in constructs, registry symbols, command macros, predefined
//! formulas. Macros, predefined formulas and per-character formulas are parsed by a nested
//! parser; nesting deeper than [`MAX_EXPANSION_DEPTH`] is reported as a parse error so that
//! self-referencing definitions terminate.

use crate::atom::{Atom, MiddleAtom};
use crate::constants::{FontType, Length, SpaceKind};
use crate::formula::Formula;
use crate::registry::Registry;
use crate::unicode::UnicodeBlock;
use log::debug;
use texform_core::{Color, Result, TexError};

pub const MAX_EXPANSION_DEPTH: usize = 32;

/// Single-use parser over one source string.
pub struct Parser<'r> {
    registry: &'r Registry,
    chars: Vec<char>,
    pos: usize,
    partial: bool,
    depth: usize,
}

fn group_atom(mut items: Vec<Atom>) -> Atom {
    match items.len() {
        0 => Atom::Empty,
        1 => items.pop().unwrap_or(Atom::Empty),
        _ => Atom::Row(items),
    }
}

impl<'r> Parser<'r> {
    /// `partial` turns failing sub-expressions into [`Atom::Empty`] instead of errors.
    pub fn new(registry: &'r Registry, source: &str, partial: bool) -> Self {
        Self {
            registry,
            chars: source.chars().collect(),
            pos: 0,
            partial,
            depth: 0,
        }
    }

    pub(crate) fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Parse the whole source into its top-level atoms.
    pub fn parse(mut self) -> Result<Vec<Atom>> {
        self.parse_sequence(None)
    }

    /// Parse the source and append every top-level atom to `formula`.
    pub fn parse_into(self, mut formula: Formula<'r>) -> Result<Formula<'r>> {
        for atom in self.parse()? {
            formula.add(atom);
        }
        Ok(formula)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += 1;
            } else if ch == '%' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> TexError {
        TexError::parse(offset, message)
    }

    /// Swallow `err` in partial mode, leaving a placeholder behind.
    fn recover(&mut self, err: TexError, start: usize, items: &mut Vec<Atom>) -> Result<()> {
        if !self.partial {
            return Err(err);
        }
        debug!(target: "texform::parser", "partial parse skipped: {err}");
        items.push(Atom::Empty);
        if self.pos <= start {
            self.pos = start + 1;
        }
        Ok(())
    }

    fn parse_sequence(&mut self, close: Option<char>) -> Result<Vec<Atom>> {
        let open = self.pos.saturating_sub(1);
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(ch) = self.peek() else {
                match close {
                    Some(close) if !self.partial => {
                        return Err(self.error_at(open, format!("Missing '{close}'")));
                    }
                    _ => break,
                }
            };
            if Some(ch) == close {
                self.pos += 1;
                break;
            }

            let start = self.pos;
            let step = match ch {
                '}' => {
                    self.pos += 1;
                    Err(self.error_at(start, "Unmatched '}'"))
                }
                '^' | '_' => {
                    self.pos += 1;
                    self.parse_script(&mut items, ch == '^', start)
                }
                _ => self.parse_atom().map(|atom| items.push(atom)),
            };
            if let Err(err) = step {
                self.recover(err, start, &mut items)?;
            }
        }
        Ok(items)
    }

    fn parse_script(&mut self, items: &mut Vec<Atom>, is_sup: bool, start: usize) -> Result<()> {
        if let Some(Atom::Scripts { sup, sub, .. }) = items.last() {
            if is_sup && sup.is_some() {
                return Err(self.error_at(start, "Double superscript"));
            }
            if !is_sup && sub.is_some() {
                return Err(self.error_at(start, "Double subscript"));
            }
        }
        let script = Box::new(self.parse_argument(start)?);
        let atom = match items.pop() {
            Some(Atom::Scripts { base, sub, .. }) if is_sup => Atom::Scripts {
                base,
                sup: Some(script),
                sub,
            },
            Some(Atom::Scripts { base, sup, .. }) => Atom::Scripts {
                base,
                sup,
                sub: Some(script),
            },
            base => {
                let base = Box::new(base.unwrap_or(Atom::Empty));
                if is_sup {
                    Atom::Scripts {
                        base,
                        sup: Some(script),
                        sub: None,
                    }
                } else {
                    Atom::Scripts {
                        base,
                        sup: None,
                        sub: Some(script),
                    }
                }
            }
        };
        items.push(atom);
        Ok(())
    }

    /// A braced group or a single token.
    fn parse_argument(&mut self, owner: usize) -> Result<Atom> {
        self.skip_whitespace();
        match self.peek() {
            None | Some('}') | Some('^') | Some('_') => {
                Err(self.error_at(owner, "Missing argument"))
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<Atom> {
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Err(self.error_at(start, "Unexpected end of input"));
        };
        match ch {
            '{' => Ok(group_atom(self.parse_sequence(Some('}'))?)),
            '\\' => self.parse_command(start),
            '#' | '&' => Err(self.error_at(start, format!("Unexpected '{ch}'"))),
            '~' => Ok(Atom::Space(SpaceKind::Thick)),
            _ => self.parse_char(ch, start),
        }
    }

    fn parse_char(&mut self, ch: char, start: usize) -> Result<Atom> {
        if let Some(source) = self.registry.formula_for_char(ch) {
            let source = source.to_string();
            return self.nested(&source, start, &format!("'{ch}'"));
        }
        if let Some((name, def)) = self.registry.symbol_for_char(ch) {
            return Ok(Atom::symbol(name, def.ch, def.kind));
        }
        Ok(Atom::Char { ch })
    }

    fn nested(&self, source: &str, start: usize, what: &str) -> Result<Atom> {
        self.check_depth(start)?;
        let items = Parser::new(self.registry, source, self.partial)
            .with_depth(self.depth + 1)
            .parse()
            .map_err(|e| self.rebase(e, start, what))?;
        Ok(group_atom(items))
    }

    fn check_depth(&self, start: usize) -> Result<()> {
        if self.depth >= MAX_EXPANSION_DEPTH {
            return Err(self.error_at(start, "Expansion nested too deeply"));
        }
        Ok(())
    }

    /// Report errors from nested sources at the position of the expanding token.
    fn rebase(&self, err: TexError, start: usize, what: &str) -> TexError {
        match err {
            TexError::Parse { message, .. } => self.error_at(start, format!("in {what}: {message}")),
            other => other,
        }
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek().filter(char::is_ascii_alphabetic) {
            name.push(ch);
            self.pos += 1;
        }
        name
    }

    fn parse_command(&mut self, start: usize) -> Result<Atom> {
        let Some(ch) = self.peek() else {
            return Err(self.error_at(start, "Missing command name after '\\'"));
        };
        if !ch.is_ascii_alphabetic() {
            self.pos += 1;
            return match ch {
                ',' => Ok(Atom::Space(SpaceKind::Thin)),
                ':' | '>' => Ok(Atom::Space(SpaceKind::Medium)),
                ';' | ' ' => Ok(Atom::Space(SpaceKind::Thick)),
                '!' => Ok(Atom::Space(SpaceKind::NegativeThin)),
                '{' => Ok(self.named_symbol("lbrace", ch)),
                '}' => Ok(self.named_symbol("rbrace", ch)),
                '%' | '&' | '$' | '#' | '_' => Ok(Atom::Char { ch }),
                _ => Err(self.error_at(start, format!("Unknown command '\\{ch}'"))),
            };
        }

        let name = self.read_name();
        match name.as_str() {
            "frac" => {
                let numerator = Box::new(self.parse_argument(start)?);
                let denominator = Box::new(self.parse_argument(start)?);
                Ok(Atom::Fraction {
                    numerator,
                    denominator,
                })
            }
            "sqrt" => {
                let index = if self.eat('[') {
                    Some(Box::new(group_atom(self.parse_sequence(Some(']'))?)))
                } else {
                    None
                };
                let base = Box::new(self.parse_argument(start)?);
                Ok(Atom::Sqrt { base, index })
            }
            "text" | "mbox" | "textrm" => {
                let text = self.read_raw_group(start)?;
                let block = text
                    .chars()
                    .find(|c| !c.is_whitespace())
                    .map_or(UnicodeBlock::BasicLatin, UnicodeBlock::of);
                let font = self.registry.external_font(block);
                Ok(Atom::Text { text, font })
            }
            "fbox" => Ok(Atom::Framed(Box::new(self.parse_argument(start)?))),
            "ovalbox" => Ok(Atom::Oval(Box::new(self.parse_argument(start)?))),
            "textcircled" => Ok(Atom::Circled(Box::new(self.parse_argument(start)?))),
            "vcenter" => Ok(Atom::VCentered(Box::new(self.parse_argument(start)?))),
            "rotatebox" => {
                let degrees = self.read_number(start)?;
                let base = Box::new(self.parse_argument(start)?);
                Ok(Atom::Rotated { base, degrees })
            }
            "scalebox" => {
                let x = self.read_number(start)?;
                let y = if self.eat('[') {
                    let raw = self.read_until(']', start)?;
                    self.number(&raw, start)?
                } else {
                    x
                };
                let base = Box::new(self.parse_argument(start)?);
                Ok(Atom::Scaled { base, x, y })
            }
            "textcolor" => {
                let color = self.read_color(start)?;
                let base = Box::new(self.parse_argument(start)?);
                Ok(Atom::Color {
                    base,
                    background: None,
                    foreground: Some(color),
                })
            }
            "colorbox" => {
                let color = self.read_color(start)?;
                let base = Box::new(self.parse_argument(start)?);
                Ok(Atom::Color {
                    base,
                    background: Some(color),
                    foreground: None,
                })
            }
            "middle" => {
                let delimiter = self.read_delimiter(start)?;
                Ok(Atom::Middle(MiddleAtom { delimiter }))
            }
            "quad" => Ok(Atom::Space(SpaceKind::Quad)),
            "qquad" => Ok(Atom::Space(SpaceKind::QQuad)),
            "thinspace" => Ok(Atom::Space(SpaceKind::Thin)),
            "medspace" => Ok(Atom::Space(SpaceKind::Medium)),
            "thickspace" => Ok(Atom::Space(SpaceKind::Thick)),
            "negthinspace" => Ok(Atom::Space(SpaceKind::NegativeThin)),
            "mathrm" | "mathbf" | "mathit" | "mathsf" | "mathtt" => {
                let font_type = text_style_font(&name).unwrap_or_default();
                let base = Box::new(self.parse_argument(start)?);
                Ok(Atom::Styled { font_type, base })
            }
            "hspace" => {
                let raw = self.read_raw_group(start)?;
                let width = parse_length(&raw).ok_or_else(|| {
                    self.error_at(start, format!("Invalid length '{raw}'"))
                })?;
                let zero = Length::new(width.unit, 0.0);
                Ok(Atom::Strut {
                    width,
                    height: zero,
                    depth: zero,
                })
            }
            _ => self.lookup_command(&name, start),
        }
    }

    fn named_symbol(&self, name: &str, fallback: char) -> Atom {
        self.registry
            .symbol(name)
            .map_or(Atom::Char { ch: fallback }, |def| {
                Atom::symbol(name, def.ch, def.kind)
            })
    }

    fn lookup_command(&mut self, name: &str, start: usize) -> Result<Atom> {
        if let Some(def) = self.registry.symbol(name) {
            return Ok(Atom::symbol(name, def.ch, def.kind));
        }
        if let Some(def) = self.registry.command(name).cloned() {
            let mut args = Vec::with_capacity(def.args);
            for _ in 0..def.args {
                args.push(self.read_raw_group(start)?);
            }
            let body = def.expand(&args);
            return self.nested(&body, start, &format!("\\{name}"));
        }
        if self.registry.is_predefined(name) {
            self.check_depth(start)?;
            let formula = self
                .registry
                .get_nested(name, self.depth + 1)
                .map_err(|e| self.rebase(e, start, &format!("\\{name}")))?;
            return Ok(formula.into_root().unwrap_or(Atom::Empty));
        }
        Err(self.error_at(start, format!("Unknown command '\\{name}'")))
    }

    /// Verbatim contents of a braced group, or a single token.
    fn read_raw_group(&mut self, owner: usize) -> Result<String> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error_at(owner, "Missing argument")),
            Some('{') => {
                let open = self.pos;
                self.pos += 1;
                let mut depth = 1usize;
                let mut out = String::new();
                while let Some(ch) = self.bump() {
                    match ch {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                return Ok(out);
                            }
                        }
                        '\\' => {
                            out.push(ch);
                            if let Some(next) = self.bump() {
                                out.push(next);
                            }
                            continue;
                        }
                        _ => {}
                    }
                    out.push(ch);
                }
                if self.partial {
                    Ok(out)
                } else {
                    Err(self.error_at(open, "Missing '}'"))
                }
            }
            Some('\\') => {
                self.pos += 1;
                let name = self.read_name();
                if name.is_empty() {
                    let ch = self.bump().map(String::from).unwrap_or_default();
                    Ok(format!("\\{ch}"))
                } else {
                    Ok(format!("\\{name}"))
                }
            }
            Some(ch) => {
                self.pos += 1;
                Ok(ch.to_string())
            }
        }
    }

    fn read_until(&mut self, close: char, owner: usize) -> Result<String> {
        let mut out = String::new();
        while let Some(ch) = self.bump() {
            if ch == close {
                return Ok(out);
            }
            out.push(ch);
        }
        Err(self.error_at(owner, format!("Missing '{close}'")))
    }

    fn number(&self, raw: &str, owner: usize) -> Result<f32> {
        raw.trim()
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.error_at(owner, format!("Invalid number '{}'", raw.trim())))
    }

    fn read_number(&mut self, owner: usize) -> Result<f32> {
        let raw = self.read_raw_group(owner)?;
        self.number(&raw, owner)
    }

    fn read_color(&mut self, owner: usize) -> Result<Color> {
        let raw = self.read_raw_group(owner)?;
        raw.parse::<Color>()
            .map_err(|e| self.error_at(owner, e.to_string()))
    }

    fn read_delimiter(&mut self, owner: usize) -> Result<char> {
        self.skip_whitespace();
        match self.bump() {
            None => Err(self.error_at(owner, "Missing delimiter")),
            Some('\\') => {
                let name = self.read_name();
                if name.is_empty() {
                    return self
                        .bump()
                        .ok_or_else(|| self.error_at(owner, "Missing delimiter"));
                }
                self.registry
                    .symbol(&name)
                    .map(|def| def.ch)
                    .ok_or_else(|| self.error_at(owner, format!("Unknown delimiter '\\{name}'")))
            }
            Some(ch) => Ok(ch),
        }
    }
}

/// Font type selected by a `\math..` style name.
pub fn text_style_font(name: &str) -> Option<FontType> {
    match name {
        "mathrm" => Some(FontType::ROMAN),
        "mathbf" => Some(FontType::BOLD),
        "mathit" => Some(FontType::ITALIC),
        "mathsf" => Some(FontType::SANS_SERIF),
        "mathtt" => Some(FontType::TYPEWRITER),
        "mathnormal" => Some(FontType::SERIF),
        _ => None,
    }
}

/// Parse lengths such as `2em`, `-3.5pt` or `10px`.
pub fn parse_length(raw: &str) -> Option<Length> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(raw.len());
    let (value, unit) = raw.split_at(split);
    let value = value.trim().parse::<f32>().ok()?;
    let unit = unit.trim().parse().ok()?;
    Some(Length::new(unit, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AtomType, Unit};

    fn registry() -> Registry {
        Registry::with_defaults().unwrap()
    }

    fn parse(registry: &Registry, source: &str) -> Result<Vec<Atom>> {
        Parser::new(registry, source, false).parse()
    }

    fn ch(c: char) -> Atom {
        Atom::Char { ch: c }
    }

    #[test]
    fn test_chars_and_mapped_symbols() {
        let registry = registry();
        let atoms = parse(&registry, "1 + x").unwrap();
        assert_eq!(atoms.len(), 3);
        assert_eq!(atoms[0], ch('1'));
        assert_eq!(atoms[1], Atom::symbol("plus", '+', AtomType::BinaryOperator));
        assert_eq!(atoms[2], ch('x'));
    }

    #[test]
    fn test_scripts_attach_to_previous_atom() {
        let registry = registry();
        let atoms = parse(&registry, "x^2_i").unwrap();
        assert_eq!(
            atoms,
            vec![Atom::Scripts {
                base: Box::new(ch('x')),
                sup: Some(Box::new(ch('2'))),
                sub: Some(Box::new(ch('i'))),
            }]
        );
        assert_eq!(parse(&registry, "x_i^2").unwrap(), atoms);

        let err = parse(&registry, "x^2^3").unwrap_err();
        assert!(matches!(err, TexError::Parse { offset: 3, .. }));
    }

    #[test]
    fn test_frac_and_sqrt() {
        let registry = registry();
        let atoms = parse(&registry, "\\frac{a}{b c}").unwrap();
        assert_eq!(
            atoms,
            vec![Atom::Fraction {
                numerator: Box::new(ch('a')),
                denominator: Box::new(Atom::Row(vec![ch('b'), ch('c')])),
            }]
        );

        let atoms = parse(&registry, "\\sqrt[3]{x}").unwrap();
        assert_eq!(
            atoms,
            vec![Atom::Sqrt {
                base: Box::new(ch('x')),
                index: Some(Box::new(ch('3'))),
            }]
        );
    }

    #[test]
    fn test_grouping_errors_carry_offsets() {
        let registry = registry();
        let err = parse(&registry, "a{b").unwrap_err();
        assert!(matches!(err, TexError::Parse { offset: 1, ref message } if message.contains("Missing")));

        let err = parse(&registry, "ab}").unwrap_err();
        assert!(matches!(err, TexError::Parse { offset: 2, .. }));

        let err = parse(&registry, "x + \\nosuch").unwrap_err();
        assert!(matches!(err, TexError::Parse { offset: 4, ref message } if message.contains("nosuch")));

        let err = parse(&registry, "\\frac{a}").unwrap_err();
        assert!(matches!(err, TexError::Parse { offset: 0, .. }));
    }

    #[test]
    fn test_partial_mode_degrades_to_empty() {
        let registry = registry();
        let atoms = Parser::new(&registry, "\\nosuch + 1", true).parse().unwrap();
        assert_eq!(atoms[0], Atom::Empty);
        assert_eq!(atoms.last(), Some(&ch('1')));

        let atoms = Parser::new(&registry, "\\frac{a}{b", true).parse().unwrap();
        assert!(matches!(atoms[0], Atom::Fraction { .. }));

        let atoms = Parser::new(&registry, "a}b", true).parse().unwrap();
        assert_eq!(atoms, vec![ch('a'), Atom::Empty, ch('b')]);
    }

    #[test]
    fn test_macros_and_predefined_commands() {
        let registry = registry();
        let atoms = parse(&registry, "\\abs{x}").unwrap();
        let Atom::Row(items) = &atoms[0] else {
            panic!("expected row, got {:?}", atoms[0]);
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], ch('x'));

        let atoms = parse(&registry, "\\log x").unwrap();
        assert!(matches!(
            &atoms[0],
            Atom::Styled { font_type, .. } if *font_type == FontType::ROMAN
        ));
        assert_eq!(atoms[1], ch('x'));
    }

    #[test]
    fn test_self_referencing_predefined_terminates() {
        let registry = registry();
        registry.register_predefined("loop", "\\loop");
        let err = parse(&registry, "\\loop").unwrap_err();
        assert!(matches!(err, TexError::Parse { offset: 0, ref message } if message.contains("too deeply")));
    }

    #[test]
    fn test_symbol_formula_mapping() {
        let registry = registry();
        let atoms = parse(&registry, "½").unwrap();
        assert!(matches!(atoms[0], Atom::Fraction { .. }));
    }

    #[test]
    fn test_color_commands() {
        let registry = registry();
        let atoms = parse(&registry, "\\textcolor{red}{x}\\colorbox{#00ff00}{y}").unwrap();
        assert!(matches!(
            &atoms[0],
            Atom::Color { foreground: Some(c), background: None, .. } if *c == Color::RED
        ));
        assert!(matches!(
            &atoms[1],
            Atom::Color { background: Some(c), .. } if *c == Color::rgb(0, 255, 0)
        ));
        assert!(parse(&registry, "\\textcolor{nope}{x}").is_err());
    }

    #[test]
    fn test_boxes_and_transforms() {
        let registry = registry();
        let atoms = parse(&registry, "\\rotatebox{90}{a}\\scalebox{2}[0.5]{b}\\fbox{c}").unwrap();
        assert!(matches!(atoms[0], Atom::Rotated { degrees, .. } if degrees == 90.0));
        assert!(matches!(atoms[1], Atom::Scaled { x, y, .. } if x == 2.0 && y == 0.5));
        assert!(matches!(atoms[2], Atom::Framed(_)));
        assert!(parse(&registry, "\\rotatebox{left}{a}").is_err());
    }

    #[test]
    fn test_text_and_middle() {
        let registry = registry();
        let atoms = parse(&registry, "\\text{hello world} \\middle|").unwrap();
        assert!(matches!(&atoms[0], Atom::Text { text, .. } if text == "hello world"));
        assert_eq!(atoms[1], Atom::Middle(MiddleAtom { delimiter: '|' }));
    }

    #[test]
    fn test_spacing_commands() {
        let registry = registry();
        let atoms = parse(&registry, "a\\,b\\quad c\\hspace{2em}").unwrap();
        assert_eq!(atoms[1], Atom::Space(SpaceKind::Thin));
        assert_eq!(atoms[3], Atom::Space(SpaceKind::Quad));
        assert!(matches!(
            atoms[5],
            Atom::Strut { width, .. } if width == Length::new(Unit::Em, 2.0)
        ));
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("2em"), Some(Length::new(Unit::Em, 2.0)));
        assert_eq!(parse_length(" -3.5 pt"), Some(Length::new(Unit::Pt, -3.5)));
        assert_eq!(parse_length("10"), None);
        assert_eq!(parse_length("1furlong"), None);
    }
}
