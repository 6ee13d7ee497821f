// this_file: crates/texform-formula/src/atom.rs

//! The atom tree produced by the parser and consumed by layout.

use crate::constants::{Alignment, AtomType, FontType, Length, SpaceKind};
use serde::{Deserialize, Serialize};
use texform_core::Color;

/// Fallback font families for text runs of one Unicode block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalFont {
    pub sans_serif: String,
    pub serif: String,
}

impl ExternalFont {
    pub fn new(sans_serif: impl Into<String>, serif: impl Into<String>) -> Self {
        Self {
            sans_serif: sans_serif.into(),
            serif: serif.into(),
        }
    }
}

impl Default for ExternalFont {
    fn default() -> Self {
        Self::new("SansSerif", "Serif")
    }
}

/// A `\middle` delimiter; stretched to the height of its row at layout time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiddleAtom {
    pub delimiter: char,
}

/// One node of a parsed formula.
///
/// The set of variants is closed: layout matches on it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    /// Placeholder produced by partial parsing and empty groups.
    Empty,
    /// Variable or digit, set in the math font.
    Char { ch: char },
    /// Named symbol with an explicit spacing class.
    Symbol {
        name: String,
        ch: char,
        kind: AtomType,
    },
    Row(Vec<Atom>),
    /// Overrides the spacing classes seen by neighbours.
    Typed {
        left: AtomType,
        right: AtomType,
        base: Box<Atom>,
    },
    Color {
        base: Box<Atom>,
        background: Option<Color>,
        foreground: Option<Color>,
    },
    Fraction {
        numerator: Box<Atom>,
        denominator: Box<Atom>,
    },
    Scripts {
        base: Box<Atom>,
        sup: Option<Box<Atom>>,
        sub: Option<Box<Atom>>,
    },
    Sqrt {
        base: Box<Atom>,
        index: Option<Box<Atom>>,
    },
    Space(SpaceKind),
    Strut {
        width: Length,
        height: Length,
        depth: Length,
    },
    /// Text run set in an external font rather than the math font.
    Text { text: String, font: ExternalFont },
    /// Changes the font type of everything below it.
    Styled { font_type: FontType, base: Box<Atom> },
    /// Permitted line break position.
    BreakMark,
    Middle(MiddleAtom),
    /// Centred on the math axis.
    VCentered(Box<Atom>),
    Framed(Box<Atom>),
    Oval(Box<Atom>),
    Circled(Box<Atom>),
    Rotated { base: Box<Atom>, degrees: f32 },
    Scaled { base: Box<Atom>, x: f32, y: f32 },
    /// Stacked rows, used for multi-line text.
    Lines { rows: Vec<Atom>, align: Alignment },
}

impl Atom {
    pub fn symbol(name: impl Into<String>, ch: char, kind: AtomType) -> Self {
        Atom::Symbol {
            name: name.into(),
            ch,
            kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Atom::Empty => true,
            Atom::Row(items) => items.iter().all(Atom::is_empty),
            _ => false,
        }
    }

    /// Atoms that never take part in inter-atom glue.
    pub fn is_glue_neutral(&self) -> bool {
        matches!(
            self,
            Atom::Empty | Atom::BreakMark | Atom::Space(_) | Atom::Strut { .. }
        )
    }

    /// Spacing class seen by the atom on the left.
    pub fn left_type(&self) -> AtomType {
        match self {
            Atom::Symbol { kind, .. } => *kind,
            Atom::Typed { left, .. } => *left,
            Atom::Row(items) => items
                .iter()
                .find(|atom| !atom.is_glue_neutral())
                .map_or(AtomType::Ordinary, Atom::left_type),
            Atom::Color { base, .. }
            | Atom::Scripts { base, .. }
            | Atom::Styled { base, .. }
            | Atom::Scaled { base, .. } => base.left_type(),
            Atom::Fraction { .. } => AtomType::Inner,
            _ => AtomType::Ordinary,
        }
    }

    /// Spacing class seen by the atom on the right.
    pub fn right_type(&self) -> AtomType {
        match self {
            Atom::Symbol { kind, .. } => *kind,
            Atom::Typed { right, .. } => *right,
            Atom::Row(items) => items
                .iter()
                .rev()
                .find(|atom| !atom.is_glue_neutral())
                .map_or(AtomType::Ordinary, Atom::right_type),
            Atom::Color { base, .. }
            | Atom::Scripts { base, .. }
            | Atom::Styled { base, .. }
            | Atom::Scaled { base, .. } => base.right_type(),
            Atom::Fraction { .. } => AtomType::Inner,
            _ => AtomType::Ordinary,
        }
    }

    /// Flatten into the visible leaf sequence, in reading order.
    pub fn leaves(&self) -> Vec<&Atom> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Atom>) {
        match self {
            Atom::Row(items) => items.iter().for_each(|item| item.collect_leaves(out)),
            Atom::Typed { base, .. } | Atom::Color { base, .. } | Atom::Styled { base, .. } => {
                base.collect_leaves(out)
            }
            Atom::Empty | Atom::BreakMark => {}
            other => out.push(other),
        }
    }
}
