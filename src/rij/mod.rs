//! Representation-matrix construction.
//!
//! Every accepted input shape (dense array, sparse triplets, long-format
//! table, or a stack of feature grids) is normalised into one canonical
//! [`SparseMatrix`] with declared row (feature) and column (planning unit)
//! extents. Missing and NaN amounts are carried through as NaN; rejecting
//! them is the validator's job.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReserveError;
use crate::ir::{
    DenseMatrix, Grid, SparseMatrix, Table, AMOUNT_COLUMN, FEATURE_COLUMN, PLANNING_UNIT_COLUMN,
};

/// Largest feature count an explicit matrix may declare or imply.
///
/// Per-feature totals and targets are allocated densely, so the row extent
/// has to stay within a size that can actually be held in memory.
pub const MAX_FEATURES: usize = 1 << 20;

/// An explicitly supplied representation matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RijInput {
    /// Features by planning units, row-major.
    Dense(DenseMatrix),
    /// Triplets with 0-based offsets.
    Triplet(SparseMatrix),
    /// Long-format `(feature, pu, amount)` table with 1-based indices.
    Table(Table),
}

impl RijInput {
    /// Short name of the input shape, for logs and messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RijInput::Dense(_) => "dense",
            RijInput::Triplet(_) => "triplet",
            RijInput::Table(_) => "table",
        }
    }
}

/// Normalises an explicit representation matrix.
///
/// `ncol` is the planning-unit count the matrix must span. `nrow` is the
/// expected feature count when known; a table without it takes its row
/// count from the largest feature index. Either way the row count may not
/// exceed [`MAX_FEATURES`].
pub fn build_rij(
    input: &RijInput,
    ncol: usize,
    nrow: Option<usize>,
) -> Result<SparseMatrix, ReserveError> {
    debug!(kind = input.kind(), ncol, "building representation matrix");
    let matrix = match input {
        RijInput::Dense(dense) => from_dense(dense, ncol, nrow)?,
        RijInput::Triplet(triplet) => from_triplet(triplet, ncol, nrow)?,
        RijInput::Table(table) => from_table(table, ncol, nrow)?,
    };
    if matrix.nrow > MAX_FEATURES {
        return Err(ReserveError::dimension(
            "representation matrix rows",
            MAX_FEATURES,
            matrix.nrow,
        ));
    }
    Ok(matrix.canonicalize())
}

/// Extracts a representation matrix from a stack of feature grids, one row
/// per layer and one column per cell. Missing cells become NaN.
///
/// The full layer-by-cell array is materialised before sparsifying.
pub fn rij_from_grid(features: &Grid) -> Result<SparseMatrix, ReserveError> {
    let n_cells = features.n_cells();
    if let Some(layer) = features.layers.iter().find(|l| l.values.len() != n_cells) {
        return Err(ReserveError::dimension(
            format!("feature layer '{}' cells", layer.name),
            n_cells,
            layer.values.len(),
        ));
    }
    let mut values = Vec::with_capacity(features.n_layers() * n_cells);
    for layer in &features.layers {
        values.extend(layer.values.iter().map(|v| v.unwrap_or(f64::NAN)));
    }
    let dense = DenseMatrix::new(features.n_layers(), n_cells, values)?;
    Ok(from_dense(&dense, n_cells, None)?.canonicalize())
}

fn check_extents(
    nrow: usize,
    ncol: usize,
    expected_ncol: usize,
    expected_nrow: Option<usize>,
) -> Result<(), ReserveError> {
    if ncol != expected_ncol {
        return Err(ReserveError::dimension(
            "representation matrix columns",
            expected_ncol,
            ncol,
        ));
    }
    if let Some(expected) = expected_nrow {
        if nrow != expected {
            return Err(ReserveError::dimension(
                "representation matrix rows",
                expected,
                nrow,
            ));
        }
    }
    Ok(())
}

fn from_dense(
    dense: &DenseMatrix,
    ncol: usize,
    nrow: Option<usize>,
) -> Result<SparseMatrix, ReserveError> {
    check_extents(dense.nrow, dense.ncol, ncol, nrow)?;
    if dense.values.len() != dense.nrow.saturating_mul(dense.ncol) {
        return Err(ReserveError::dimension(
            "dense matrix values",
            dense.nrow.saturating_mul(dense.ncol),
            dense.values.len(),
        ));
    }

    let mut matrix = SparseMatrix::new(dense.nrow, dense.ncol);
    for row in 0..dense.nrow {
        for col in 0..dense.ncol {
            let value = dense.get(row, col);
            if value != 0.0 {
                matrix.push(row, col, value);
            }
        }
    }
    Ok(matrix)
}

fn from_triplet(
    triplet: &SparseMatrix,
    ncol: usize,
    nrow: Option<usize>,
) -> Result<SparseMatrix, ReserveError> {
    check_extents(triplet.nrow, triplet.ncol, ncol, nrow)?;
    if triplet.rows.len() != triplet.values.len() || triplet.cols.len() != triplet.values.len() {
        return Err(ReserveError::dimension(
            "triplet offsets",
            triplet.values.len(),
            triplet.rows.len().min(triplet.cols.len()),
        ));
    }
    check_offsets(triplet)?;
    Ok(triplet.clone())
}

/// Rejects a triplet whose row or column offset falls outside the matrix.
pub(crate) fn check_offsets(matrix: &SparseMatrix) -> Result<(), ReserveError> {
    match matrix.out_of_bounds() {
        Some((row, _)) if row >= matrix.nrow => Err(ReserveError::dimension(
            "triplet row offset bound",
            matrix.nrow,
            row.saturating_add(1),
        )),
        Some((_, col)) => Err(ReserveError::dimension(
            "triplet column offset bound",
            matrix.ncol,
            col.saturating_add(1),
        )),
        None => Ok(()),
    }
}

fn from_table(
    table: &Table,
    ncol: usize,
    nrow: Option<usize>,
) -> Result<SparseMatrix, ReserveError> {
    let (Some(features), Some(units), Some(amounts)) = (
        table.column(FEATURE_COLUMN),
        table.column(PLANNING_UNIT_COLUMN),
        table.column(AMOUNT_COLUMN),
    ) else {
        return Err(ReserveError::MalformedTable(format!(
            "missing required column(s): {}",
            table.missing_columns().join(", ")
        )));
    };
    if features.len() != units.len() || features.len() != amounts.len() {
        return Err(ReserveError::MalformedTable(format!(
            "columns have unequal lengths ({} {}, {} {}, {} {})",
            FEATURE_COLUMN,
            features.len(),
            PLANNING_UNIT_COLUMN,
            units.len(),
            AMOUNT_COLUMN,
            amounts.len()
        )));
    }

    let mut triples = Vec::with_capacity(features.len());
    for (row, ((feature, unit), amount)) in features.iter().zip(units).zip(amounts).enumerate() {
        let feature = positive_index(*feature, FEATURE_COLUMN, row)?;
        if feature > MAX_FEATURES {
            return Err(ReserveError::MalformedTable(format!(
                "row {}: '{}' value {} exceeds the limit of {} features",
                row + 1,
                FEATURE_COLUMN,
                feature,
                MAX_FEATURES
            )));
        }
        let unit = positive_index(*unit, PLANNING_UNIT_COLUMN, row)?;
        if unit > ncol {
            return Err(ReserveError::dimension(
                "planning-unit index bound",
                ncol,
                unit,
            ));
        }
        triples.push((feature - 1, unit - 1, amount.unwrap_or(f64::NAN)));
    }

    let max_feature = triples.iter().map(|&(f, _, _)| f + 1).max().unwrap_or(0);
    let nrow = match nrow {
        Some(n) if max_feature > n => {
            return Err(ReserveError::dimension("feature index bound", n, max_feature))
        }
        Some(n) => n,
        None => max_feature,
    };

    Ok(SparseMatrix::from_triplets(nrow, ncol, triples))
}

fn positive_index(value: Option<f64>, column: &str, row: usize) -> Result<usize, ReserveError> {
    match value {
        Some(v) if v.is_finite() && v >= 1.0 && v.fract() == 0.0 => Ok(v as usize),
        Some(v) => Err(ReserveError::MalformedTable(format!(
            "row {}: '{}' value {} is not a positive integer",
            row + 1,
            column,
            v
        ))),
        None => Err(ReserveError::MalformedTable(format!(
            "row {}: '{}' value is missing",
            row + 1,
            column
        ))),
    }
}
