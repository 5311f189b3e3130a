//! Summarising feature grids over polygon planning units.
//!
//! Spatial overlay is a geometry concern that lives behind the
//! [`FeatureSummarizer`] trait: the model builder hands over the polygons and
//! the feature stack and receives a representation matrix with one row per
//! feature and one column per polygon. Any closure with the right signature
//! is a summarizer, so a full geospatial library can be plugged in directly.
//! [`CellCentroidSummarizer`] is a simple built-in overlay.

use tracing::debug;

use crate::error::ReserveError;
use crate::ir::{Grid, PolygonLayer, SparseMatrix};

/// Computes the representation of each feature in each polygon.
pub trait FeatureSummarizer {
    fn summarize(
        &self,
        planning_units: &PolygonLayer,
        features: &Grid,
    ) -> Result<SparseMatrix, ReserveError>;
}

impl<F> FeatureSummarizer for F
where
    F: Fn(&PolygonLayer, &Grid) -> Result<SparseMatrix, ReserveError>,
{
    fn summarize(
        &self,
        planning_units: &PolygonLayer,
        features: &Grid,
    ) -> Result<SparseMatrix, ReserveError> {
        self(planning_units, features)
    }
}

/// Sums the values of every grid cell whose centre falls inside a polygon.
///
/// Missing cells contribute nothing. A cell centre inside several
/// overlapping polygons counts toward each of them.
#[derive(Clone, Copy, Debug, Default)]
pub struct CellCentroidSummarizer;

impl FeatureSummarizer for CellCentroidSummarizer {
    fn summarize(
        &self,
        planning_units: &PolygonLayer,
        features: &Grid,
    ) -> Result<SparseMatrix, ReserveError> {
        let n_cells = features.n_cells();
        for layer in &features.layers {
            if layer.values.len() != n_cells {
                return Err(ReserveError::dimension(
                    format!("feature layer '{}' cells", layer.name),
                    n_cells,
                    layer.values.len(),
                ));
            }
        }

        // layer lengths bound the cell count only when there is a layer
        if features.layers.is_empty() {
            return Ok(SparseMatrix::new(0, planning_units.len()));
        }

        let centers: Vec<(f64, f64)> = (0..n_cells).map(|c| features.cell_center(c)).collect();
        let mut matrix = SparseMatrix::new(features.n_layers(), planning_units.len());

        for (col, polygon) in planning_units.polygons.iter().enumerate() {
            let cells: Vec<usize> = centers
                .iter()
                .enumerate()
                .filter(|(_, &(x, y))| polygon.contains(x, y))
                .map(|(cell, _)| cell)
                .collect();

            for (row, layer) in features.layers.iter().enumerate() {
                let total: f64 = cells.iter().filter_map(|&cell| layer.values[cell]).sum();
                if total != 0.0 {
                    matrix.push(row, col, total);
                }
            }
        }

        debug!(
            polygons = planning_units.len(),
            features = features.n_layers(),
            nnz = matrix.nnz(),
            "summarised features over polygons"
        );
        Ok(matrix.canonicalize())
    }
}
