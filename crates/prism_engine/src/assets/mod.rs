//! Asset loading
//!
//! Text-format geometry and material parsers plus bitmap decoding. Parsing
//! failures surface immediately to the caller with the offending line; they
//! are fatal to the load operation, never to the process.

mod image_loader;
mod mtl_parser;
mod obj_loader;

pub use image_loader::ImageData;
pub use mtl_parser::{MtlData, MtlParser};
pub use obj_loader::ObjLoader;

use thiserror::Error;

/// Malformed geometry or material source
#[derive(Error, Debug)]
pub enum ParseError {
    /// Underlying file read failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be interpreted
    #[error("parse error at line {line}: {message}")]
    Malformed {
        /// 1-based source line
        line: usize,
        /// What went wrong
        message: String,
    },

    /// A face with other than three corners
    #[error("face at line {line} has {corners} corners; only triangular faces are accepted")]
    NonTriangularFace {
        /// 1-based source line
        line: usize,
        /// Corner count found
        corners: usize,
    },

    /// A face corner referenced an undeclared attribute
    #[error("index {index} at line {line} is out of bounds for the {pool} pool")]
    IndexOutOfBounds {
        /// 1-based source line
        line: usize,
        /// 1-based index as written in the source
        index: usize,
        /// Which attribute pool was exceeded
        pool: &'static str,
    },

    /// The source declared no usable geometry
    #[error("no geometry found in source")]
    NoGeometry,
}

/// Asset decoding errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Underlying file read failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image data could not be decoded
    #[error("failed to decode image: {0}")]
    Decode(String),
}
