//! JSON serialization of canonical models.
//!
//! This is the hand-off format for solver adapters running out of process.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::model::CanonicalModel;
use crate::error::ReserveError;
use crate::validation;

/// Writes a model to a pretty-printed JSON file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_model_json(path: &Path, model: &CanonicalModel) -> Result<(), ReserveError> {
    let file = File::create(path).map_err(ReserveError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, model).map_err(|source| {
        ReserveError::ModelJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(ReserveError::Io)
}

/// Writes a model to a pretty-printed JSON string.
pub fn to_model_json_string(model: &CanonicalModel) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(model)
}

/// Reads a model back from a JSON string.
///
/// The decoded model is re-checked the way the builders check their output:
/// costs finite, matrix offsets in range with finite non-negative amounts,
/// lock sets in range and disjoint, and the budget or targets feasible.
pub fn from_model_json_str(json: &str) -> Result<CanonicalModel, ReserveError> {
    let model = serde_json::from_str(json).map_err(ReserveError::ModelJsonParse)?;
    validation::check_model(&model)?;
    Ok(model)
}
