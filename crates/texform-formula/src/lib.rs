// this_file: crates/texform-formula/src/lib.rs

//! Formula model and formula-to-icon build pipeline.
//!
//! A [`Formula`] holds an atom tree resolved against a [`Registry`]. An [`IconBuilder`] lays
//! it out into boxes and packages the result as a [`TexIcon`], which paints itself through any
//! [`texform_core::Graphics2D`] surface.

pub mod atom;
pub mod boxes;
pub mod builder;
pub mod constants;
pub mod diagnostics;
pub mod environment;
pub mod font;
pub mod formula;
pub mod icon;
pub mod layout;
pub mod linebreak;
pub mod parser;
pub mod registry;
pub mod unicode;

pub use atom::{Atom, ExternalFont, MiddleAtom};
pub use boxes::{BoxKind, TexBox};
pub use builder::{BuildConfig, IconBuilder, WidthConstraint};
pub use constants::{Alignment, AtomType, FontType, Length, SpaceKind, TexStyle, Unit};
pub use environment::Environment;
pub use font::TexFont;
pub use formula::Formula;
pub use icon::TexIcon;
pub use parser::Parser;
pub use registry::{MacroDef, Registry, SymbolDef};
pub use unicode::UnicodeBlock;
