// this_file: backends/texform-core/src/types.rs

//! Value types passed across the drawing abstraction.
//!
//! Everything here is a plain `Copy` value: a backend converts these into its native types
//! at the call boundary and never hands out references into its own state.

use crate::TexError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque RGB color. Alpha is not modeled; adapters paint fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// RGBA bytes with the alpha channel forced opaque.
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = TexError;

    /// Accepts `#rrggbb` and a handful of names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() == 6 && hex.is_ascii() {
                let channel = |range: std::ops::Range<usize>| {
                    u8::from_str_radix(&hex[range], 16)
                        .map_err(|e| TexError::configuration(format!("Illegal color '{s}': {e}")))
                };
                return Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?));
            }
            return Err(TexError::configuration(format!("Illegal color string: '{s}'")));
        }

        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Color::BLACK),
            "white" => Ok(Color::WHITE),
            "red" => Ok(Color::RED),
            "green" => Ok(Color::GREEN),
            "blue" => Ok(Color::BLUE),
            "gray" | "grey" => Ok(Color::GRAY),
            _ => Err(TexError::configuration(format!("Illegal color string: '{s}'"))),
        }
    }
}

/// End cap of stroked lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Join of stroked path segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Stroke parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
}

impl Stroke {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
        }
    }
}

/// 2D affine transform, laid out as `[sx kx tx; ky sy ty]`.
///
/// A copy is a new value: mutating it never touches the transform it came from, nor the
/// live transform of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub sx: f64,
    pub ky: f64,
    pub kx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        sx: 1.0,
        ky: 0.0,
        kx: 0.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn from_translate(x: f64, y: f64) -> Self {
        Self {
            tx: x,
            ty: y,
            ..Self::IDENTITY
        }
    }

    pub fn from_scale(x: f64, y: f64) -> Self {
        Self {
            sx: x,
            sy: y,
            ..Self::IDENTITY
        }
    }

    pub fn scale_x(&self) -> f64 {
        self.sx
    }

    pub fn scale_y(&self) -> f64 {
        self.sy
    }

    /// Concatenate `other` after this transform: `self * other`.
    pub fn concat(&mut self, other: &AffineTransform) {
        let Self {
            sx,
            ky,
            kx,
            sy,
            tx,
            ty,
        } = *self;
        self.sx = sx * other.sx + kx * other.ky;
        self.ky = ky * other.sx + sy * other.ky;
        self.kx = sx * other.kx + kx * other.sy;
        self.sy = ky * other.kx + sy * other.sy;
        self.tx = sx * other.tx + kx * other.ty + tx;
        self.ty = ky * other.tx + sy * other.ty + ty;
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.concat(&Self::from_translate(x, y));
    }

    pub fn scale(&mut self, x: f64, y: f64) {
        self.concat(&Self::from_scale(x, y));
    }

    /// Rotate by `theta` radians around the origin of the current user space.
    pub fn rotate(&mut self, theta: f64) {
        let (sin, cos) = theta.sin_cos();
        self.concat(&Self {
            sx: cos,
            ky: sin,
            kx: -sin,
            sy: cos,
            tx: 0.0,
            ty: 0.0,
        });
    }

    /// Rotate by `theta` radians around `(x, y)`.
    pub fn rotate_about(&mut self, theta: f64, x: f64, y: f64) {
        self.translate(x, y);
        self.rotate(theta);
        self.translate(-x, -y);
    }

    pub fn map_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.sx * x + self.kx * y + self.tx,
            self.ky * x + self.sy * y + self.ty,
        )
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// Rectangle with elliptical corners; `arc_w`/`arc_h` are corner diameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoundRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub arc_w: f32,
    pub arc_h: f32,
}

impl RoundRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32, arc_w: f32, arc_h: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            arc_w,
            arc_h,
        }
    }
}

/// Line segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Line {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// Elliptical arc inscribed in `(x, y, w, h)`.
///
/// Angles are in degrees, 0 at three o'clock, positive values turn counter-clockwise on
/// screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Arc {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub start: f32,
    pub extent: f32,
}

impl Arc {
    pub fn new(x: f32, y: f32, w: f32, h: f32, start: f32, extent: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            start,
            extent,
        }
    }

    /// Full ellipse inscribed in the rectangle.
    pub fn ellipse(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, w, h, 0.0, 360.0)
    }
}

/// Margins around a painted icon, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Insets {
    pub fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Bitmap image
#[derive(Debug, Clone)]
pub struct Bitmap {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel data (straight RGBA)
    pub data: Vec<u8>,
}

impl Bitmap {
    /// RGBA value of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        self.data
            .get(idx..idx + 4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_color() {
        assert_eq!("#FF0000".parse::<Color>().unwrap(), Color::RED);
        assert_eq!("#00ff7f".parse::<Color>().unwrap(), Color::rgb(0, 255, 127));
        assert_eq!("white".parse::<Color>().unwrap(), Color::WHITE);
        assert!("#12345".parse::<Color>().is_err());
        assert!("chartreuse-ish".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgb(1, 171, 255).to_string(), "#01abff");
        assert_eq!(Color::BLUE.to_rgba8(), [0, 0, 255, 255]);
    }

    #[test]
    fn test_transform_copy_is_independent() {
        let original = AffineTransform::from_scale(2.0, 3.0);
        let mut copy = original;
        copy.scale(10.0, 10.0);
        assert_relative_eq!(original.scale_x(), 2.0);
        assert_relative_eq!(copy.scale_x(), 20.0);
        assert_relative_eq!(copy.scale_y(), 30.0);
    }

    #[test]
    fn test_translate_then_scale() {
        let mut t = AffineTransform::IDENTITY;
        t.translate(10.0, 5.0);
        t.scale(2.0, 2.0);
        let (x, y) = t.map_point(1.0, 1.0);
        assert_relative_eq!(x, 12.0);
        assert_relative_eq!(y, 7.0);
    }

    #[test]
    fn test_rotate_about_keeps_pivot() {
        let mut t = AffineTransform::IDENTITY;
        t.rotate_about(std::f64::consts::FRAC_PI_2, 5.0, 5.0);
        let (x, y) = t.map_point(5.0, 5.0);
        assert_relative_eq!(x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(y, 5.0, epsilon = 1e-9);
        let (x, y) = t.map_point(6.0, 5.0);
        assert_relative_eq!(x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(y, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bitmap_pixel_bounds() {
        let bitmap = Bitmap {
            width: 2,
            height: 1,
            data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        assert_eq!(bitmap.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(bitmap.pixel(2, 0), None);
    }
}
