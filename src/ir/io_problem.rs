//! Problem files in JSON or YAML.
//!
//! A problem file holds the planning units, optional feature grids, an
//! optional explicit representation matrix, lock sets, and the objective:
//!
//! ```json
//! {
//!   "planning_units": {"type": "grid", "nrow": 1, "ncol": 2,
//!                      "layers": [{"name": "cost", "values": [1.0, null]}]},
//!   "features": {"nrow": 1, "ncol": 2, "layers": [{"name": "sp1", "values": [1.0, 0.0]}]},
//!   "locked_in": [1],
//!   "objective": {"variant": "max_coverage", "budget": 5.0}
//! }
//! ```
//!
//! The format is chosen from the file extension: `.yaml`/`.yml` are YAML,
//! everything else is JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::builder::Problem;
use crate::error::ReserveError;

/// Reads a problem file, choosing JSON or YAML by extension.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_problem(path: &Path) -> Result<Problem, ReserveError> {
    let file = File::open(path).map_err(ReserveError::Io)?;
    let reader = BufReader::new(file);

    if is_yaml(path) {
        serde_yaml::from_reader(reader).map_err(|source| ReserveError::ProblemYamlParse {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_reader(reader).map_err(|source| ReserveError::ProblemJsonParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Reads a problem from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_problem_json_str(json: &str) -> Result<Problem, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a problem from JSON bytes.
pub fn from_problem_json_slice(bytes: &[u8]) -> Result<Problem, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Reads a problem from a YAML string.
pub fn from_problem_yaml_str(yaml: &str) -> Result<Problem, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

/// Writes a problem to a pretty-printed JSON string.
pub fn to_problem_json_string(problem: &Problem) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(problem)
}
