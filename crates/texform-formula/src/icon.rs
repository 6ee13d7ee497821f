// this_file: crates/texform-formula/src/icon.rs

//! Paintable handle to a laid-out formula.

use crate::boxes::TexBox;
use texform_core::{Color, Graphics2D, Insets, StateGuard};

/// Padding added on every side when the icon does not use true values, as a fraction of the
/// size.
const PADDING: f32 = 0.18;

/// A laid-out formula at a fixed size.
///
/// Box, size and true-values mode are fixed at build time; foreground and insets can be
/// changed afterwards.
#[derive(Debug, Clone)]
pub struct TexIcon {
    tex_box: TexBox,
    size: f32,
    true_values: bool,
    foreground: Option<Color>,
    colored: bool,
    insets: Insets,
    pixels_per_point: f32,
}

impl TexIcon {
    pub fn new(tex_box: TexBox, size: f32, true_values: bool, pixels_per_point: f32) -> Self {
        let mut icon = Self {
            tex_box,
            size,
            true_values,
            foreground: None,
            colored: false,
            insets: Insets::default(),
            pixels_per_point,
        };
        icon.set_insets(Insets::default());
        icon
    }

    pub(crate) fn set_colored(&mut self, colored: bool) {
        self.colored = colored;
    }

    pub fn tex_box(&self) -> &TexBox {
        &self.tex_box
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn true_values(&self) -> bool {
        self.true_values
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    /// Whether the formula contained explicit colors.
    pub fn is_colored(&self) -> bool {
        self.colored
    }

    pub fn foreground(&self) -> Option<Color> {
        self.foreground
    }

    pub fn set_foreground(&mut self, color: Option<Color>) {
        self.foreground = color;
    }

    pub fn insets(&self) -> Insets {
        self.insets
    }

    /// Replace the insets; without true values the size-relative padding is added on top.
    pub fn set_insets(&mut self, insets: Insets) {
        self.insets = insets;
        if !self.true_values {
            let pad = (PADDING * self.size) as i32;
            self.insets.top = self.insets.top.saturating_add(pad);
            self.insets.left = self.insets.left.saturating_add(pad);
            self.insets.bottom = self.insets.bottom.saturating_add(pad);
            self.insets.right = self.insets.right.saturating_add(pad);
        }
    }

    fn scale(&self) -> f32 {
        self.size * self.pixels_per_point
    }

    /// Round a box metric up to whole pixels, saturating at `i32::MAX`.
    fn pixels(&self, metric: f32) -> i32 {
        (metric as f64 * self.scale() as f64 + 0.99) as i32
    }

    /// Width in pixels, insets included. Saturates at `i32::MAX`.
    pub fn width(&self) -> i32 {
        self.pixels(self.tex_box.width)
            .saturating_add(self.insets.left)
            .saturating_add(self.insets.right)
    }

    /// Height in pixels, insets included. Saturates at `i32::MAX`.
    pub fn height(&self) -> i32 {
        self.pixels(self.tex_box.height)
            .saturating_add(self.insets.top)
            .saturating_add(self.pixels(self.tex_box.depth))
            .saturating_add(self.insets.bottom)
    }

    /// Baseline position as a fraction of the height, measured from the top.
    pub fn base_line(&self) -> f32 {
        let s = self.scale();
        let above = self.tex_box.height * s + 0.99 + self.insets.top as f32;
        let total = self.tex_box.total_height() * s
            + 0.99
            + self.insets.top as f32
            + self.insets.bottom as f32;
        if total > 0.0 {
            above / total
        } else {
            0.0
        }
    }

    /// Paint with the top-left corner (outside the insets) at `(x, y)`.
    ///
    /// Draws in the icon's foreground, or opaque black when none is set. The surface state is
    /// restored afterwards.
    pub fn paint(&self, g: &mut dyn Graphics2D, x: f64, y: f64) {
        let mut guard = StateGuard::new(g);
        let g = guard.graphics();
        g.set_color(self.foreground.unwrap_or(Color::BLACK));
        g.translate(x + self.insets.left as f64, y + self.insets.top as f64);
        let s = self.scale() as f64;
        g.scale(s, s);
        self.tex_box.paint(g, 0.0, self.tex_box.height);
    }
}
