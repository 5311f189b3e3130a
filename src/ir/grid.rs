//! Gridded (raster-like) layers.
//!
//! A [`Grid`] is a stack of layers sharing one row-major cell layout and a
//! spatial extent. Planning-unit grids carry exactly one layer (the cost);
//! feature grids carry one layer per feature. A `None` cell is missing.

use serde::{Deserialize, Serialize};

/// The spatial extent covered by a grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Extent {
    /// Creates a new extent.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// The unit extent for a grid of `nrow` by `ncol` cells of size 1.
    pub fn unit(nrow: usize, ncol: usize) -> Self {
        Self::new(0.0, ncol as f64, 0.0, nrow as f64)
    }
}

/// A single named layer of cell values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLayer {
    /// Layer name (the feature name for feature stacks).
    #[serde(default)]
    pub name: String,

    /// Cell values in row-major order, `None` where the cell is missing.
    pub values: Vec<Option<f64>>,
}

impl GridLayer {
    /// Creates a new layer.
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Creates a layer in which every cell is present.
    pub fn from_values(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, values.into_iter().map(Some).collect())
    }

    /// Returns true if any cell is missing.
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(Option::is_none)
    }
}

/// A stack of layers on a common grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Number of cell rows.
    pub nrow: usize,

    /// Number of cell columns.
    pub ncol: usize,

    /// Spatial extent; defaults to unit-sized cells anchored at the origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,

    /// The layers, each holding `nrow * ncol` values.
    pub layers: Vec<GridLayer>,
}

impl Grid {
    /// Creates a grid with the unit extent.
    pub fn new(nrow: usize, ncol: usize, layers: Vec<GridLayer>) -> Self {
        Self {
            nrow,
            ncol,
            extent: None,
            layers,
        }
    }

    /// Sets the spatial extent.
    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Total number of cells (saturating).
    pub fn n_cells(&self) -> usize {
        self.nrow.saturating_mul(self.ncol)
    }

    /// Number of layers in the stack.
    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    /// The effective extent.
    pub fn extent(&self) -> Extent {
        self.extent
            .unwrap_or_else(|| Extent::unit(self.nrow, self.ncol))
    }

    /// Returns the `(x, y)` centre of the cell at a 0-based row-major offset.
    ///
    /// Row 0 is the top (`ymax`) edge of the extent.
    pub fn cell_center(&self, offset: usize) -> (f64, f64) {
        let extent = self.extent();
        let row = offset / self.ncol.max(1);
        let col = offset % self.ncol.max(1);
        let dx = (extent.xmax - extent.xmin) / self.ncol.max(1) as f64;
        let dy = (extent.ymax - extent.ymin) / self.nrow.max(1) as f64;
        (
            extent.xmin + (col as f64 + 0.5) * dx,
            extent.ymax - (row as f64 + 0.5) * dy,
        )
    }

    /// Returns true if `other` has the same cell layout.
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.nrow == other.nrow && self.ncol == other.ncol
    }
}
