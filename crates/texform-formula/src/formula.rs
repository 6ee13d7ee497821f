// this_file: crates/texform-formula/src/formula.rs

//! The formula model: an atom tree plus the state needed to build icons from it.

use crate::atom::{Atom, MiddleAtom};
use crate::boxes::TexBox;
use crate::builder::IconBuilder;
use crate::constants::{Alignment, AtomType, FontType, Length, SpaceKind, TexStyle, Unit};
use crate::environment::Environment;
use crate::icon::TexIcon;
use crate::layout;
use crate::parser::{self, Parser};
use crate::registry::Registry;
use crate::unicode::UnicodeBlock;
use texform_core::{Color, Result, TexError};

/// Registry-independent contents of a formula, as kept in the predefined cache.
#[derive(Debug, Clone)]
pub(crate) struct FormulaParts {
    root: Option<Atom>,
    middle: Vec<MiddleAtom>,
    text_style: Option<String>,
    colored: bool,
}

/// A mathematical formula bound to the registry it resolves names against.
#[derive(Debug, Clone)]
pub struct Formula<'r> {
    registry: &'r Registry,
    root: Option<Atom>,
    middle: Vec<MiddleAtom>,
    text_style: Option<String>,
    colored: bool,
}

impl<'r> Formula<'r> {
    /// An empty formula.
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            root: None,
            middle: Vec::new(),
            text_style: None,
            colored: false,
        }
    }

    /// Strict parse of `source`.
    pub fn parse(registry: &'r Registry, source: &str) -> Result<Self> {
        Parser::new(registry, source, false).parse_into(Self::new(registry))
    }

    /// Best-effort parse; failing sub-expressions become empty atoms.
    pub fn parse_partial(registry: &'r Registry, source: &str) -> Result<Self> {
        Parser::new(registry, source, true).parse_into(Self::new(registry))
    }

    /// Independent deep copy.
    pub fn copy_of(other: &Formula<'r>) -> Self {
        other.clone()
    }

    /// Plain text set in roman, one row per line.
    ///
    /// Lines are separated by newlines, `\\` or `\cr`.
    pub fn as_text(registry: &'r Registry, text: &str, alignment: Alignment) -> Self {
        let normalized = text.replace("\\\\", "\n").replace("\\cr", "\n");
        let mut rows: Vec<Atom> = normalized
            .split('\n')
            .map(|line| {
                let block = line
                    .chars()
                    .find(|c| !c.is_whitespace())
                    .map_or(UnicodeBlock::BasicLatin, UnicodeBlock::of);
                Atom::Text {
                    text: line.to_string(),
                    font: registry.external_font(block),
                }
            })
            .collect();
        let mut formula = Self::new(registry);
        let root = if rows.len() == 1 {
            rows.pop().unwrap_or(Atom::Empty)
        } else {
            Atom::Lines {
                rows,
                align: alignment,
            }
        };
        formula.add(root);
        formula
    }

    pub(crate) fn from_parts(registry: &'r Registry, parts: FormulaParts) -> Self {
        Self {
            registry,
            root: parts.root,
            middle: parts.middle,
            text_style: parts.text_style,
            colored: parts.colored,
        }
    }

    pub(crate) fn to_parts(&self) -> FormulaParts {
        FormulaParts {
            root: self.root.clone(),
            middle: self.middle.clone(),
            text_style: self.text_style.clone(),
            colored: self.colored,
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn root(&self) -> Option<&Atom> {
        self.root.as_ref()
    }

    pub fn into_root(self) -> Option<Atom> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.as_ref().map_or(true, Atom::is_empty)
    }

    /// `\middle` delimiters in insertion order.
    pub fn middle(&self) -> &[MiddleAtom] {
        &self.middle
    }

    /// Whether explicit colors were applied anywhere in the formula.
    pub fn is_colored(&self) -> bool {
        self.colored
    }

    pub fn text_style(&self) -> Option<&str> {
        self.text_style.as_deref()
    }

    /// Font type implied by the text style, if any.
    pub fn text_style_font(&self) -> Option<FontType> {
        self.text_style.as_deref().and_then(parser::text_style_font)
    }

    /// Set the text style used when no font type is configured at build time.
    ///
    /// Accepts the names of the math font commands, e.g. `mathbf` or `mathsf`.
    pub fn set_text_style(&mut self, name: Option<&str>) -> Result<()> {
        match name {
            None => self.text_style = None,
            Some(name) if parser::text_style_font(name).is_some() => {
                self.text_style = Some(name.to_string())
            }
            Some(name) => {
                return Err(TexError::configuration(format!(
                    "Unknown text style '{name}'"
                )))
            }
        }
        Ok(())
    }

    /// Append `atom` at the end of the formula.
    pub fn add(&mut self, atom: Atom) -> &mut Self {
        collect_middles(&atom, &mut self.middle);
        if contains_color(&atom) {
            self.colored = true;
        }
        let breakable =
            !matches!(atom, Atom::Row(_)) && atom.right_type().allows_break_after();
        match self.root.take() {
            None => self.root = Some(atom),
            Some(root) => {
                let mut items = match root {
                    Atom::Row(items) => items,
                    other => vec![other],
                };
                items.push(atom);
                if breakable {
                    items.push(Atom::BreakMark);
                }
                self.root = Some(Atom::Row(items));
            }
        }
        self
    }

    /// Append a copy of `other`'s tree. A row root is added as one nested row.
    pub fn add_formula(&mut self, other: &Formula<'_>) -> &mut Self {
        if let Some(root) = &other.root {
            self.add(root.clone());
        }
        self
    }

    /// Parse `source` strictly and append it as one atom; clears the text style.
    pub fn add_str(&mut self, source: &str) -> Result<&mut Self> {
        let parsed = Formula::parse(self.registry, source)?;
        self.text_style = None;
        Ok(self.add_formula(&parsed))
    }

    /// Parse `source` and append its atoms one by one.
    pub fn append(&mut self, source: &str) -> Result<&mut Self> {
        self.append_with(source, false)
    }

    pub fn append_partial(&mut self, source: &str) -> Result<&mut Self> {
        self.append_with(source, true)
    }

    fn append_with(&mut self, source: &str, partial: bool) -> Result<&mut Self> {
        let registry = self.registry;
        let current = std::mem::replace(self, Formula::new(registry));
        *self = Parser::new(registry, source, partial).parse_into(current)?;
        Ok(self)
    }

    /// Replace the whole formula by the parse of `source`.
    ///
    /// On error the formula is left empty.
    pub fn set_text(&mut self, source: &str) -> Result<&mut Self> {
        *self = Formula::new(self.registry);
        self.append(source)
    }

    /// Set the foreground of the whole formula, keeping any background.
    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.recolor(|_, foreground| *foreground = Some(color))
    }

    /// Set the background of the whole formula, keeping any foreground.
    pub fn set_background(&mut self, color: Color) -> &mut Self {
        self.recolor(|background, _| *background = Some(color))
    }

    fn recolor(&mut self, apply: impl FnOnce(&mut Option<Color>, &mut Option<Color>)) -> &mut Self {
        let mut root = match self.root.take() {
            Some(color @ Atom::Color { .. }) => color,
            other => Atom::Color {
                base: Box::new(other.unwrap_or(Atom::Empty)),
                background: None,
                foreground: None,
            },
        };
        if let Atom::Color {
            background,
            foreground,
            ..
        } = &mut root
        {
            apply(background, foreground);
        }
        self.root = Some(root);
        self.colored = true;
        self
    }

    /// Fix the spacing classes the formula presents to its neighbours.
    pub fn set_fixed_types(&mut self, left: AtomType, right: AtomType) -> Result<&mut Self> {
        for kind in [left, right] {
            if !kind.is_spacing_class() {
                return Err(TexError::InvalidAtomType(kind.code()));
            }
        }
        let base = Box::new(self.root.take().unwrap_or(Atom::Empty));
        self.root = Some(Atom::Typed { left, right, base });
        Ok(self)
    }

    /// Centre the formula vertically on the math axis.
    pub fn center_on_axis(&mut self) -> &mut Self {
        let base = Box::new(self.root.take().unwrap_or(Atom::Empty));
        self.root = Some(Atom::VCentered(base));
        self
    }

    /// Append an invisible box of the given dimensions.
    pub fn add_strut(&mut self, unit: Unit, width: f32, height: f32, depth: f32) -> &mut Self {
        self.add(Atom::Strut {
            width: Length::new(unit, width),
            height: Length::new(unit, height),
            depth: Length::new(unit, depth),
        })
    }

    pub fn add_skip(&mut self, kind: SpaceKind) -> &mut Self {
        self.add(Atom::Space(kind))
    }

    /// Lay the formula out in `env`. An empty formula gives an empty box.
    pub fn create_box(&self, env: &Environment) -> TexBox {
        self.root
            .as_ref()
            .map_or_else(TexBox::empty, |root| layout::create_box(root, env))
    }

    pub fn icon_builder(&self) -> IconBuilder<'_, 'r> {
        IconBuilder::new(self)
    }

    pub fn create_icon(&self, style: TexStyle, size: f32) -> Result<TexIcon> {
        self.icon_builder().style(style).size(size).build()
    }

    pub fn create_icon_typed(
        &self,
        style: TexStyle,
        size: f32,
        font_type: FontType,
        foreground: Option<Color>,
    ) -> Result<TexIcon> {
        let mut builder = self.icon_builder().style(style).size(size).font_type(font_type);
        if let Some(color) = foreground {
            builder = builder.foreground(color);
        }
        builder.build()
    }
}

fn nested(atom: &Atom) -> Vec<&Atom> {
    match atom {
        Atom::Row(items) => items.iter().collect(),
        Atom::Lines { rows, .. } => rows.iter().collect(),
        Atom::Typed { base, .. }
        | Atom::Color { base, .. }
        | Atom::Styled { base, .. }
        | Atom::Rotated { base, .. }
        | Atom::Scaled { base, .. }
        | Atom::VCentered(base)
        | Atom::Framed(base)
        | Atom::Oval(base)
        | Atom::Circled(base) => vec![base.as_ref()],
        Atom::Fraction {
            numerator,
            denominator,
        } => vec![numerator.as_ref(), denominator.as_ref()],
        Atom::Scripts { base, sup, sub } => std::iter::once(base.as_ref())
            .chain(sup.as_deref())
            .chain(sub.as_deref())
            .collect(),
        Atom::Sqrt { base, index } => std::iter::once(base.as_ref())
            .chain(index.as_deref())
            .collect(),
        _ => Vec::new(),
    }
}

fn collect_middles(atom: &Atom, out: &mut Vec<MiddleAtom>) {
    if let Atom::Middle(middle) = atom {
        out.push(*middle);
    }
    for child in nested(atom) {
        collect_middles(child, out);
    }
}

fn contains_color(atom: &Atom) -> bool {
    matches!(atom, Atom::Color { .. }) || nested(atom).into_iter().any(contains_color)
}
