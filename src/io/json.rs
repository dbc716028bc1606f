//! JSON form of CSG trees
//!
//! Trees serialize as their node structure. Loading re-validates every node,
//! so a document with a negative radius or an unnormalizable rotation is
//! rejected rather than producing an invalid tree.

use crate::io::IoError;
use crate::types::CsgTree;
use std::io::{BufReader, BufWriter, Read, Write};

/// Write a tree as pretty-printed JSON
pub fn write_json(tree: &CsgTree, writer: impl Write) -> Result<(), IoError> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, tree)
        .map_err(|e| IoError::Serialization(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

/// Read a tree from JSON
pub fn read_json(reader: impl Read) -> Result<CsgTree, IoError> {
    serde_json::from_reader(BufReader::new(reader))
        .map_err(|e| IoError::Serialization(e.to_string()))
}

/// Serialize a tree to a JSON string
pub fn to_json_string(tree: &CsgTree) -> Result<String, IoError> {
    serde_json::to_string_pretty(tree).map_err(|e| IoError::Serialization(e.to_string()))
}

/// Parse a tree from a JSON string
pub fn from_json_string(json: &str) -> Result<CsgTree, IoError> {
    serde_json::from_str(json).map_err(|e| IoError::Serialization(e.to_string()))
}
