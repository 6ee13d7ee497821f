// this_file: backends/texform-core/src/lib.rs

//! Core drawing abstraction, value types and errors for the texform formula renderer.

pub mod error;
pub mod graphics;
pub mod surface;
pub mod types;

pub use error::TexError;
pub use graphics::{Graphics2D, StateGuard};
pub use surface::{encode_bitmap, ImageFormat, RenderSurface};
pub use types::{
    AffineTransform, Arc, Bitmap, Color, Insets, Line, LineCap, LineJoin, Rect, RoundRect, Stroke,
};

/// Result type for texform operations
pub type Result<T> = std::result::Result<T, TexError>;
