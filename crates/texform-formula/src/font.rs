// this_file: crates/texform-formula/src/font.rs

//! Synthetic math font: per-character metrics and TeX layout parameters.
//!
//! All values are in em at the base size; callers scale them by the style's size factor.
//! There are no font files behind this, the numbers approximate Computer Modern so that
//! layout behaves plausibly.

use crate::constants::{FontType, TexStyle};

/// Box metrics of one character, in em.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharMetrics {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Extra advance after slanted glyphs.
    pub italic: f32,
}

impl CharMetrics {
    const fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
            italic: 0.0,
        }
    }

    fn scaled(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
            depth: self.depth * factor,
            italic: self.italic * factor,
        }
    }
}

/// How a character's placeholder is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphShape {
    Plus,
    Minus,
    Times,
    Equals,
    Slash,
    Bar,
    Dot,
    /// Solid ink rectangle.
    Block,
}

impl GlyphShape {
    pub fn of(ch: char) -> Self {
        match ch {
            '+' | '±' => GlyphShape::Plus,
            '-' | '−' | '∓' => GlyphShape::Minus,
            '×' | '∗' => GlyphShape::Times,
            '=' | '≡' | '≠' | '≈' => GlyphShape::Equals,
            '/' => GlyphShape::Slash,
            '|' => GlyphShape::Bar,
            '.' | '⋅' | '·' | ',' => GlyphShape::Dot,
            _ => GlyphShape::Block,
        }
    }
}

const ASCENDERS: &str = "bdfhklt";
const DESCENDERS: &str = "gjpqy";

fn base_metrics(ch: char) -> CharMetrics {
    match ch {
        '0'..='9' => CharMetrics::new(0.5, 0.644, 0.0),
        'i' | 'j' | 'l' => CharMetrics::new(0.3, 0.694, if ch == 'j' { 0.194 } else { 0.0 }),
        'm' => CharMetrics::new(0.833, 0.431, 0.0),
        'w' => CharMetrics::new(0.722, 0.431, 0.0),
        'a'..='z' => {
            let height = if ASCENDERS.contains(ch) { 0.694 } else { 0.431 };
            let depth = if DESCENDERS.contains(ch) { 0.194 } else { 0.0 };
            CharMetrics::new(0.5, height, depth)
        }
        'A'..='Z' => CharMetrics::new(0.722, 0.683, 0.0),
        '+' | '−' | '-' | '±' | '∓' | '×' | '÷' | '∗' | '⋅' => CharMetrics::new(0.778, 0.583, 0.083),
        '=' | '<' | '>' | '≤' | '≥' | '≠' | '≈' | '≡' | '∼' | '∈' | '⊂' => {
            CharMetrics::new(0.778, 0.367, 0.0)
        }
        '→' | '←' | '⇒' | '⇔' => CharMetrics::new(1.0, 0.511, 0.011),
        '∑' | '∏' => CharMetrics::new(1.056, 1.0, 0.5),
        '∫' | '∮' => CharMetrics::new(0.556, 1.111, 0.611),
        '(' | ')' | '[' | ']' | '{' | '}' | '⟨' | '⟩' | '|' => CharMetrics::new(0.389, 0.75, 0.25),
        ',' | ';' => CharMetrics::new(0.278, 0.106, 0.194),
        ':' | '.' | '!' => CharMetrics::new(0.278, 0.431, 0.0),
        '/' => CharMetrics::new(0.5, 0.75, 0.25),
        '…' | '⋯' => CharMetrics::new(1.172, 0.123, 0.0),
        '\'' | '′' => CharMetrics::new(0.275, 0.75, 0.0),
        ' ' => CharMetrics::new(0.333, 0.0, 0.0),
        c if c.is_alphabetic() => CharMetrics::new(0.6, 0.694, 0.0),
        _ => CharMetrics::new(0.6, 0.683, 0.0),
    }
}

/// Math font at a fixed point size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexFont {
    size: f32,
    font_type: FontType,
}

impl TexFont {
    /// Default math font.
    pub fn new(size: f32) -> Self {
        Self::with_type(size, FontType::SERIF)
    }

    /// Font customised by a type bitmask; the empty mask is serif.
    pub fn with_type(size: f32, font_type: FontType) -> Self {
        Self { size, font_type }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn font_type(&self) -> FontType {
        self.font_type
    }

    /// Same size, different type bits.
    pub fn derive(&self, font_type: FontType) -> Self {
        Self::with_type(self.size, font_type)
    }

    pub fn char_metrics(&self, ch: char, style: TexStyle) -> CharMetrics {
        let mut metrics = base_metrics(ch);
        let t = self.font_type;
        if t.contains(FontType::TYPEWRITER) {
            metrics.width = 0.525;
        } else {
            if t.contains(FontType::SANS_SERIF) {
                metrics.width *= 0.95;
            }
            if t.contains(FontType::BOLD) {
                metrics.width *= 1.1;
            }
        }
        // bold keeps the math italic of its serif base
        let serif_base = !t.contains(FontType::SANS_SERIF) && !t.contains(FontType::TYPEWRITER);
        let slanted = t.contains(FontType::ITALIC) || (serif_base && ch.is_alphabetic());
        if slanted && !t.contains(FontType::ROMAN) {
            metrics.italic = 0.05;
        }
        metrics.scaled(style.size_factor())
    }

    /// Stroke weight for placeholder glyphs, relative to the rule thickness.
    pub fn weight(&self) -> f32 {
        if self.font_type.contains(FontType::BOLD) {
            1.6
        } else {
            1.0
        }
    }

    pub fn quad(&self, style: TexStyle) -> f32 {
        style.size_factor()
    }

    /// One math unit, 1/18 quad.
    pub fn mu(&self, style: TexStyle) -> f32 {
        self.quad(style) / 18.0
    }

    pub fn x_height(&self, style: TexStyle) -> f32 {
        0.431 * style.size_factor()
    }

    pub fn axis_height(&self, style: TexStyle) -> f32 {
        0.25 * style.size_factor()
    }

    pub fn rule_thickness(&self, style: TexStyle) -> f32 {
        0.04 * style.size_factor()
    }

    pub fn sup_shift(&self, style: TexStyle) -> f32 {
        let em = if style.is_cramped() { 0.289 } else { 0.413 };
        em * style.size_factor()
    }

    pub fn sub_shift(&self, style: TexStyle) -> f32 {
        0.15 * style.size_factor()
    }

    pub fn num_shift(&self, style: TexStyle) -> f32 {
        let em = if style.is_display() { 0.677 } else { 0.394 };
        em * style.size_factor()
    }

    pub fn denom_shift(&self, style: TexStyle) -> f32 {
        let em = if style.is_display() { 0.686 } else { 0.345 };
        em * style.size_factor()
    }
}
