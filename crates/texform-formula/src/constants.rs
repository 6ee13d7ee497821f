// this_file: crates/texform-formula/src/constants.rs

//! Enumerations shared by the formula model and layout.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;
use texform_core::{Result, TexError};

/// Typesetting style. Cramped variants lower superscripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TexStyle {
    Display,
    DisplayCramped,
    Text,
    TextCramped,
    Script,
    ScriptCramped,
    ScriptScript,
    ScriptScriptCramped,
}

impl TexStyle {
    const ALL: [TexStyle; 8] = [
        TexStyle::Display,
        TexStyle::DisplayCramped,
        TexStyle::Text,
        TexStyle::TextCramped,
        TexStyle::Script,
        TexStyle::ScriptCramped,
        TexStyle::ScriptScript,
        TexStyle::ScriptScriptCramped,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_cramped(self) -> bool {
        self.code() % 2 == 1
    }

    pub fn is_display(self) -> bool {
        matches!(self, TexStyle::Display | TexStyle::DisplayCramped)
    }

    /// Display and text share a size class, so do the two script levels' cramped forms.
    fn level(self) -> i32 {
        self.code() / 2
    }

    fn from_level(level: i32, cramped: bool) -> Self {
        Self::ALL[(level.clamp(0, 3) * 2 + i32::from(cramped)) as usize]
    }

    pub fn cramp(self) -> Self {
        Self::from_level(self.level(), true)
    }

    pub fn sup(self) -> Self {
        let level = if self.level() <= 1 { 2 } else { 3 };
        Self::from_level(level, self.is_cramped())
    }

    pub fn sub(self) -> Self {
        self.sup().cramp()
    }

    pub fn num(self) -> Self {
        let level = match self.level() {
            0 => 1,
            1 => 2,
            _ => 3,
        };
        Self::from_level(level, self.is_cramped())
    }

    pub fn denom(self) -> Self {
        self.num().cramp()
    }

    /// Style of a radical's index.
    pub fn root(self) -> Self {
        TexStyle::ScriptScript
    }

    /// Scale applied to glyphs relative to the base font size.
    pub fn size_factor(self) -> f32 {
        match self.level() {
            0 | 1 => 1.0,
            2 => 0.7,
            _ => 0.5,
        }
    }

    pub fn is_script(self) -> bool {
        self.level() >= 2
    }
}

impl TryFrom<i32> for TexStyle {
    type Error = TexError;

    fn try_from(code: i32) -> Result<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or_else(|| TexError::configuration(format!("Invalid style code {code}")))
    }
}

impl FromStr for TexStyle {
    type Err = TexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "display" => Ok(TexStyle::Display),
            "text" => Ok(TexStyle::Text),
            "script" => Ok(TexStyle::Script),
            "scriptscript" => Ok(TexStyle::ScriptScript),
            other => Err(TexError::configuration(format!("Unknown style '{other}'"))),
        }
    }
}

/// Spacing classification of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomType {
    Ordinary,
    BigOperator,
    BinaryOperator,
    Relation,
    Opening,
    Closing,
    Punctuation,
    Inner,
    Accent,
    InterText,
    MultiColumn,
    HLine,
    MultiRow,
}

impl AtomType {
    pub fn code(self) -> i32 {
        match self {
            AtomType::Ordinary => 0,
            AtomType::BigOperator => 1,
            AtomType::BinaryOperator => 2,
            AtomType::Relation => 3,
            AtomType::Opening => 4,
            AtomType::Closing => 5,
            AtomType::Punctuation => 6,
            AtomType::Inner => 7,
            AtomType::Accent => 10,
            AtomType::InterText => 11,
            AtomType::MultiColumn => 12,
            AtomType::HLine => 13,
            AtomType::MultiRow => 14,
        }
    }

    /// Types that take part in inter-atom glue.
    pub fn is_spacing_class(self) -> bool {
        self.code() <= AtomType::Inner.code()
    }

    /// Whether a line may break after an atom of this type.
    pub fn allows_break_after(self) -> bool {
        matches!(self, AtomType::BinaryOperator | AtomType::Relation)
    }
}

impl TryFrom<i32> for AtomType {
    type Error = TexError;

    fn try_from(code: i32) -> Result<Self> {
        Ok(match code {
            0 => AtomType::Ordinary,
            1 => AtomType::BigOperator,
            2 => AtomType::BinaryOperator,
            3 => AtomType::Relation,
            4 => AtomType::Opening,
            5 => AtomType::Closing,
            6 => AtomType::Punctuation,
            7 => AtomType::Inner,
            10 => AtomType::Accent,
            11 => AtomType::InterText,
            12 => AtomType::MultiColumn,
            13 => AtomType::HLine,
            14 => AtomType::MultiRow,
            _ => return Err(TexError::InvalidAtomType(code)),
        })
    }
}

/// Measurement unit for widths, struts and spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Em,
    Ex,
    Pixel,
    /// Big point, 1/72 in.
    Point,
    Pica,
    Mu,
    Cm,
    Mm,
    In,
    Sp,
    /// TeX point, 1/72.27 in.
    Pt,
    Dd,
    Cc,
}

impl Unit {
    const ALL: [Unit; 13] = [
        Unit::Em,
        Unit::Ex,
        Unit::Pixel,
        Unit::Point,
        Unit::Pica,
        Unit::Mu,
        Unit::Cm,
        Unit::Mm,
        Unit::In,
        Unit::Sp,
        Unit::Pt,
        Unit::Dd,
        Unit::Cc,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Unit {
    type Error = TexError;

    fn try_from(code: i32) -> Result<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(TexError::InvalidUnit(code))
    }
}

impl FromStr for Unit {
    type Err = TexError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "em" => Unit::Em,
            "ex" => Unit::Ex,
            "px" | "pix" => Unit::Pixel,
            "bp" | "point" => Unit::Point,
            "pc" => Unit::Pica,
            "mu" => Unit::Mu,
            "cm" => Unit::Cm,
            "mm" => Unit::Mm,
            "in" => Unit::In,
            "sp" => Unit::Sp,
            "pt" => Unit::Pt,
            "dd" => Unit::Dd,
            "cc" => Unit::Cc,
            _ => return Err(TexError::InvalidUnit(-1)),
        })
    }
}

/// A length in a given unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub unit: Unit,
    pub value: f32,
}

impl Length {
    pub fn new(unit: Unit, value: f32) -> Self {
        Self { unit, value }
    }
}

/// Horizontal placement inside a wider box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Alignment {
    type Err = TexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            other => Err(TexError::configuration(format!("Unknown alignment '{other}'"))),
        }
    }
}

/// Font type bitmask; the empty mask means serif.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FontType(u8);

impl FontType {
    pub const SERIF: FontType = FontType(0);
    pub const SANS_SERIF: FontType = FontType(1);
    pub const BOLD: FontType = FontType(2);
    pub const ITALIC: FontType = FontType(4);
    pub const ROMAN: FontType = FontType(8);
    pub const TYPEWRITER: FontType = FontType(16);

    pub fn from_bits(bits: u8) -> Self {
        FontType(bits & 0x1f)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: FontType) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_serif(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for FontType {
    type Output = FontType;

    fn bitor(self, rhs: FontType) -> FontType {
        FontType(self.0 | rhs.0)
    }
}

impl BitOrAssign for FontType {
    fn bitor_assign(&mut self, rhs: FontType) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for FontType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_serif() {
            return f.write_str("serif");
        }
        let names = [
            (FontType::SANS_SERIF, "sans"),
            (FontType::BOLD, "bold"),
            (FontType::ITALIC, "italic"),
            (FontType::ROMAN, "roman"),
            (FontType::TYPEWRITER, "tt"),
        ];
        let parts: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&parts.join("+"))
    }
}

/// Predefined math skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceKind {
    Thin,
    Medium,
    Thick,
    NegativeThin,
    Quad,
    QQuad,
}

impl SpaceKind {
    /// Width in math units (1/18 em).
    pub fn mu(self) -> f32 {
        match self {
            SpaceKind::Thin => 3.0,
            SpaceKind::Medium => 4.0,
            SpaceKind::Thick => 5.0,
            SpaceKind::NegativeThin => -3.0,
            SpaceKind::Quad => 18.0,
            SpaceKind::QQuad => 36.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_transitions() {
        assert_eq!(TexStyle::Display.sup(), TexStyle::Script);
        assert_eq!(TexStyle::Display.sub(), TexStyle::ScriptCramped);
        assert_eq!(TexStyle::Script.sup(), TexStyle::ScriptScript);
        assert_eq!(TexStyle::Display.num(), TexStyle::Text);
        assert_eq!(TexStyle::Text.denom(), TexStyle::ScriptCramped);
        assert_eq!(TexStyle::ScriptScript.num(), TexStyle::ScriptScript);
        assert!(TexStyle::TextCramped.is_cramped());
        assert_eq!(TexStyle::Script.size_factor(), 0.7);
    }

    #[test]
    fn test_style_codes() {
        assert_eq!(TexStyle::try_from(2).unwrap(), TexStyle::Text);
        assert!(TexStyle::try_from(8).is_err());
        assert_eq!("display".parse::<TexStyle>().unwrap(), TexStyle::Display);
    }

    #[test]
    fn test_atom_type_range() {
        assert_eq!(AtomType::try_from(3).unwrap(), AtomType::Relation);
        assert_eq!(AtomType::try_from(13).unwrap(), AtomType::HLine);
        assert!(matches!(
            AtomType::try_from(8),
            Err(TexError::InvalidAtomType(8))
        ));
        assert!(matches!(
            AtomType::try_from(-1),
            Err(TexError::InvalidAtomType(-1))
        ));
        assert!(AtomType::Inner.is_spacing_class());
        assert!(!AtomType::Accent.is_spacing_class());
    }

    #[test]
    fn test_unit_range() {
        assert_eq!(Unit::try_from(2).unwrap(), Unit::Pixel);
        assert_eq!(Unit::try_from(12).unwrap(), Unit::Cc);
        assert!(matches!(Unit::try_from(13), Err(TexError::InvalidUnit(13))));
        assert_eq!("pt".parse::<Unit>().unwrap(), Unit::Pt);
    }

    #[test]
    fn test_font_type_mask() {
        let t = FontType::BOLD | FontType::SANS_SERIF;
        assert!(t.contains(FontType::BOLD));
        assert!(!t.contains(FontType::ITALIC));
        assert!(!t.is_serif());
        assert!(FontType::default().is_serif());
        assert_eq!(t.to_string(), "sans+bold");
    }
}
