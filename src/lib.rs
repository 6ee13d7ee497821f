// this_file: src/lib.rs

//! texform: lay out formulas and paint them through pluggable 2D surfaces.
//!
//! This crate re-exports the workspace members:
//!
//! - [`drawing`]: the [`Graphics2D`] trait, drawing value types and [`TexError`]
//! - [`formula`]: formula model, registry, parser and the icon builder
//! - [`skia`]: tiny-skia surface
//! - [`headless`]: recording surface for inspection and tests
//! - [`render`]: rasterization and image export

pub use texform_core as drawing;
pub use texform_formula as formula;
pub use texform_headless as headless;
pub use texform_render as render;
pub use texform_skia as skia;

pub use texform_core::{Color, Graphics2D, ImageFormat, Insets, Result, TexError};
pub use texform_formula::{
    Alignment, Atom, AtomType, FontType, Formula, IconBuilder, Registry, TexIcon, TexStyle, Unit,
};
pub use texform_render::{RasterOptions, Rasterizer};
