//! Tree serialization
//!
//! Trees round-trip through JSON with validation on load. Mesh and voxel
//! formats are not handled here.

mod json;

pub use json::{from_json_string, read_json, to_json_string, write_json};

use thiserror::Error;

/// Serialization errors
#[derive(Error, Debug)]
pub enum IoError {
    /// Underlying reader or writer failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed document or invalid tree
    #[error("Serialization error: {0}")]
    Serialization(String),
}
