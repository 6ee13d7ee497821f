// this_file: backends/texform-core/src/error.rs

//! Error type shared by every texform crate.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for texform operations.
#[derive(Error, Debug)]
pub enum TexError {
    /// Malformed formula source.
    #[error("Parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// Builder used with missing or out-of-order required fields.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown predefined formula.
    #[error("Predefined formula not found: {name}")]
    Lookup { name: String },

    /// Unit code outside the recognized enumeration.
    #[error("Invalid unit: {0}")]
    InvalidUnit(i32),

    /// Atom type outside the recognized enumeration (or not usable where it was given).
    #[error("Invalid atom type: {0}")]
    InvalidAtomType(i32),

    /// Registry resource could not be read.
    #[error("Invalid resource '{name}': {reason}")]
    Resource { name: String, reason: String },

    /// Painting or surface allocation failed.
    #[error("Render error: {0}")]
    Render(String),

    /// Raster encoding failed.
    #[error("Image encoding error: {0}")]
    Encode(String),

    /// Writing an image to its destination failed.
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl TexError {
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn lookup(name: impl Into<String>) -> Self {
        Self::Lookup { name: name.into() }
    }

    pub fn resource(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Resource {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` for the programmer-error class (misused builder).
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
