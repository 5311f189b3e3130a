//! Long-format representation tables in CSV.
//!
//! The CSV has a header row naming its columns. Three are required:
//! - `feature`: 1-based feature index
//! - `pu`: 1-based planning-unit index
//! - `amount`: representation level
//!
//! Other columns are kept but ignored by the matrix builder. Empty cells,
//! `NA`, and anything that does not parse as a number are read as missing;
//! a missing amount later fails validation as a non-finite value, while a
//! missing index makes the table malformed.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::matrix::SparseMatrix;
use super::table::{Table, AMOUNT_COLUMN, FEATURE_COLUMN, PLANNING_UNIT_COLUMN};
use crate::error::ReserveError;

/// Reads a long-format table from a CSV file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid CSV.
pub fn read_rij_csv(path: &Path) -> Result<Table, ReserveError> {
    let file = File::open(path).map_err(ReserveError::Io)?;
    read_table(BufReader::new(file)).map_err(|source| ReserveError::CsvParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a long-format table from a CSV string.
///
/// Useful for testing without file I/O.
pub fn from_rij_csv_str(csv: &str) -> Result<Table, csv::Error> {
    read_table(csv.as_bytes())
}

/// Reads a long-format table from CSV bytes.
pub fn from_rij_csv_slice(bytes: &[u8]) -> Result<Table, csv::Error> {
    read_table(bytes)
}

fn read_table<R: Read>(reader: R) -> Result<Table, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];

    for result in csv_reader.records() {
        let record = result?;
        for (column, field) in columns.iter_mut().zip(record.iter()) {
            column.push(parse_cell(field));
        }
    }

    let mut table = Table::new();
    for (name, values) in headers.into_iter().zip(columns) {
        table = table.with_column(name, values);
    }
    Ok(table)
}

fn parse_cell(field: &str) -> Option<f64> {
    if field.is_empty() || field.eq_ignore_ascii_case("na") {
        return None;
    }
    field.parse().ok()
}

/// Writes a representation matrix as a long-format CSV string, one row per
/// stored value, with 1-based indices.
pub fn to_rij_csv_string(rij: &SparseMatrix) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([FEATURE_COLUMN, PLANNING_UNIT_COLUMN, AMOUNT_COLUMN])?;
    for (row, col, value) in rij.iter() {
        writer.write_record([
            (row + 1).to_string(),
            (col + 1).to_string(),
            value.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
