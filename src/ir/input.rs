//! Raw planning-unit and lock inputs, before any normalisation.

use serde::{Deserialize, Serialize};

use super::grid::Grid;
use super::ids::PlanningUnitId;
use super::polygon::PolygonLayer;

/// Planning units in one of the two accepted structural kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanningUnitInput {
    /// A single-layer grid; each cell is a planning unit and the layer holds costs.
    Grid(Grid),
    /// A polygon layer with a `cost` attribute.
    Polygon(PolygonLayer),
}

impl PlanningUnitInput {
    /// Number of planning units before any exclusion.
    pub fn n_units(&self) -> usize {
        match self {
            PlanningUnitInput::Grid(grid) => grid.n_cells(),
            PlanningUnitInput::Polygon(layer) => layer.len(),
        }
    }

    /// Short name of the input kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PlanningUnitInput::Grid(_) => "grid",
            PlanningUnitInput::Polygon(_) => "polygon",
        }
    }
}

/// A set of planning units to lock in or out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LockInput {
    /// Explicit 1-based planning-unit ids.
    Indices(Vec<PlanningUnitId>),
    /// One flag per original planning unit; true where locked.
    Mask(Vec<bool>),
}

impl Default for LockInput {
    fn default() -> Self {
        LockInput::Indices(Vec::new())
    }
}

impl LockInput {
    /// Convenience constructor from plain 1-based ids.
    pub fn ids(ids: impl IntoIterator<Item = usize>) -> Self {
        LockInput::Indices(ids.into_iter().map(PlanningUnitId).collect())
    }

    /// Returns true if nothing is locked.
    pub fn is_empty(&self) -> bool {
        match self {
            LockInput::Indices(ids) => ids.is_empty(),
            LockInput::Mask(flags) => !flags.iter().any(|&f| f),
        }
    }
}
