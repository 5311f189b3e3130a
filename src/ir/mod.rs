//! Canonical data types for reserve-design models.
//!
//! This module holds both the raw inputs accepted by the model builders
//! (grids, polygon layers, dense/sparse/tabular representation data) and
//! the canonical [`CanonicalModel`] they produce.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: Planning-unit and feature indices are 1-based
//!    newtypes so they cannot be confused with each other or with the
//!    0-based offsets used inside matrices.
//!
//! 2. **Canonical Format**: Representation data always ends up as a sparse
//!    triplet matrix in column-major order with zeros dropped.
//!
//! 3. **Permissive Construction**: Input types can hold invalid data
//!    (missing costs, NaN amounts, out-of-range locks) so that validation
//!    can report issues rather than panic during parsing.
//!
//! # Example
//!
//! ```
//! use reservecraft::ir::{Grid, GridLayer, LockInput, PlanningUnitInput};
//!
//! let planning_units = PlanningUnitInput::Grid(Grid::new(
//!     2,
//!     2,
//!     vec![GridLayer::new("cost", vec![Some(1.0), None, Some(3.0), Some(4.0)])],
//! ));
//! let locked_in = LockInput::ids([1]);
//! assert_eq!(planning_units.n_units(), 4);
//! assert!(!locked_in.is_empty());
//! ```

mod grid;
mod ids;
mod input;
pub mod io_model_json;
pub mod io_problem;
pub mod io_rij_csv;
mod matrix;
mod model;
mod polygon;
mod table;

// Re-export core types for convenient access
pub use grid::{Extent, Grid, GridLayer};
pub use ids::{FeatureId, PlanningUnitId};
pub use input::{LockInput, PlanningUnitInput};
pub use matrix::{DenseMatrix, SparseMatrix};
pub use model::{CanonicalModel, MaxCoverageModel, Solution, SolverAdapter, TargetModel};
pub use polygon::{Polygon, PolygonLayer, COST_ATTRIBUTE};
pub use table::{
    Table, AMOUNT_COLUMN, FEATURE_COLUMN, PLANNING_UNIT_COLUMN, REQUIRED_COLUMNS,
};
