// this_file: crates/texform-formula/src/environment.rs

//! Layout context threaded through box construction.

use crate::constants::{FontType, Length, TexStyle, Unit};
use crate::font::TexFont;
use std::cell::Cell;
use std::rc::Rc;

/// Points per inch.
const PT_PER_IN: f32 = 72.0;
/// TeX points per inch.
const TEX_PT_PER_IN: f32 = 72.27;

/// Style, font and optional width constraints for one build.
///
/// Derived environments (for scripts, numerators and so on) share the colored flag with the
/// environment they came from, so a color met anywhere in the tree is visible to the builder.
#[derive(Debug, Clone)]
pub struct Environment {
    style: TexStyle,
    font: TexFont,
    text_width: Option<f32>,
    interline: Option<f32>,
    pixels_per_point: f32,
    colored: Rc<Cell<bool>>,
}

impl Environment {
    pub fn new(style: TexStyle, font: TexFont) -> Self {
        Self {
            style,
            font,
            text_width: None,
            interline: None,
            pixels_per_point: 1.0,
            colored: Rc::new(Cell::new(false)),
        }
    }

    pub fn with_pixels_per_point(mut self, ppp: f32) -> Self {
        self.pixels_per_point = ppp;
        self
    }

    /// Constrain the text width; stored in em.
    pub fn set_text_width(&mut self, unit: Unit, value: f32) {
        self.text_width = Some(value * self.unit_factor(unit));
    }

    /// Gap between broken lines; stored in em.
    pub fn set_interline(&mut self, unit: Unit, value: f32) {
        self.interline = Some(value * self.unit_factor(unit));
    }

    pub fn style(&self) -> TexStyle {
        self.style
    }

    pub fn font(&self) -> &TexFont {
        &self.font
    }

    pub fn text_width(&self) -> Option<f32> {
        self.text_width
    }

    pub fn interline(&self) -> Option<f32> {
        self.interline
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    pub fn is_colored(&self) -> bool {
        self.colored.get()
    }

    pub fn mark_colored(&self) {
        self.colored.set(true);
    }

    fn with_style(&self, style: TexStyle) -> Self {
        Self {
            style,
            ..self.clone()
        }
    }

    pub fn sup_style(&self) -> Self {
        self.with_style(self.style.sup())
    }

    pub fn sub_style(&self) -> Self {
        self.with_style(self.style.sub())
    }

    pub fn num_style(&self) -> Self {
        self.with_style(self.style.num())
    }

    pub fn denom_style(&self) -> Self {
        self.with_style(self.style.denom())
    }

    pub fn root_style(&self) -> Self {
        self.with_style(self.style.root())
    }

    pub fn cramp_style(&self) -> Self {
        self.with_style(self.style.cramp())
    }

    /// Same context with extra font type bits.
    pub fn with_font_type(&self, font_type: FontType) -> Self {
        Self {
            font: self.font.derive(self.font.font_type() | font_type),
            ..self.clone()
        }
    }

    /// Size of one `unit` in em at the current style.
    pub fn unit_factor(&self, unit: Unit) -> f32 {
        let size = self.font.size();
        let pt = 1.0 / size;
        let tex_pt = PT_PER_IN / TEX_PT_PER_IN * pt;
        let dd = 1238.0 / 1157.0 * tex_pt;
        match unit {
            Unit::Em => self.font.quad(self.style),
            Unit::Ex => self.font.x_height(self.style),
            Unit::Pixel => 1.0 / (size * self.pixels_per_point),
            Unit::Point => pt,
            Unit::Pt => tex_pt,
            Unit::Pica => 12.0 * tex_pt,
            Unit::Mu => self.font.mu(self.style),
            Unit::Cm => PT_PER_IN / 2.54 * pt,
            Unit::Mm => PT_PER_IN / 25.4 * pt,
            Unit::In => PT_PER_IN * pt,
            Unit::Sp => tex_pt / 65536.0,
            Unit::Dd => dd,
            Unit::Cc => 12.0 * dd,
        }
    }

    pub fn length(&self, length: Length) -> f32 {
        length.value * self.unit_factor(length.unit)
    }
}
