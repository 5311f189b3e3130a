//! The canonical, solver-ready model.
//!
//! A model is assembled once by one of the builders in [`crate::builder`]
//! and is immutable afterwards: fields are private and exposed through
//! accessors. Lock sets and targets are always expressed in the final
//! (post-exclusion) planning-unit space.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PlanningUnitId;
use super::matrix::SparseMatrix;
use crate::error::ReserveError;
use crate::inclusion::InclusionMask;

/// A budget-constrained maximum-coverage model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaxCoverageModel {
    cost: Vec<f64>,
    rij: SparseMatrix,
    budget: f64,
    locked_in: Vec<PlanningUnitId>,
    locked_out: Vec<PlanningUnitId>,
    included: InclusionMask,
}

impl MaxCoverageModel {
    pub(crate) fn new(
        cost: Vec<f64>,
        rij: SparseMatrix,
        budget: f64,
        locked_in: Vec<PlanningUnitId>,
        locked_out: Vec<PlanningUnitId>,
        included: InclusionMask,
    ) -> Self {
        Self {
            cost,
            rij,
            budget,
            locked_in,
            locked_out,
            included,
        }
    }

    pub fn cost(&self) -> &[f64] {
        &self.cost
    }

    pub fn rij(&self) -> &SparseMatrix {
        &self.rij
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn locked_in(&self) -> &[PlanningUnitId] {
        &self.locked_in
    }

    pub fn locked_out(&self) -> &[PlanningUnitId] {
        &self.locked_out
    }

    /// Which of the original planning units participate in the model.
    pub fn included(&self) -> &InclusionMask {
        &self.included
    }
}

/// A minimum-set model with one absolute target per feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetModel {
    cost: Vec<f64>,
    rij: SparseMatrix,
    targets: Vec<f64>,
    locked_in: Vec<PlanningUnitId>,
    locked_out: Vec<PlanningUnitId>,
}

impl TargetModel {
    pub(crate) fn new(
        cost: Vec<f64>,
        rij: SparseMatrix,
        targets: Vec<f64>,
        locked_in: Vec<PlanningUnitId>,
        locked_out: Vec<PlanningUnitId>,
    ) -> Self {
        Self {
            cost,
            rij,
            targets,
            locked_in,
            locked_out,
        }
    }

    pub fn cost(&self) -> &[f64] {
        &self.cost
    }

    pub fn rij(&self) -> &SparseMatrix {
        &self.rij
    }

    /// Absolute targets, one per feature.
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn locked_in(&self) -> &[PlanningUnitId] {
        &self.locked_in
    }

    pub fn locked_out(&self) -> &[PlanningUnitId] {
        &self.locked_out
    }
}

/// Either problem variant, as handed to a solver adapter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum CanonicalModel {
    MaxCoverage(MaxCoverageModel),
    Target(TargetModel),
}

impl CanonicalModel {
    pub fn cost(&self) -> &[f64] {
        match self {
            CanonicalModel::MaxCoverage(m) => m.cost(),
            CanonicalModel::Target(m) => m.cost(),
        }
    }

    pub fn rij(&self) -> &SparseMatrix {
        match self {
            CanonicalModel::MaxCoverage(m) => m.rij(),
            CanonicalModel::Target(m) => m.rij(),
        }
    }

    pub fn locked_in(&self) -> &[PlanningUnitId] {
        match self {
            CanonicalModel::MaxCoverage(m) => m.locked_in(),
            CanonicalModel::Target(m) => m.locked_in(),
        }
    }

    pub fn locked_out(&self) -> &[PlanningUnitId] {
        match self {
            CanonicalModel::MaxCoverage(m) => m.locked_out(),
            CanonicalModel::Target(m) => m.locked_out(),
        }
    }

    /// Number of planning units in the final (post-exclusion) space.
    pub fn n_planning_units(&self) -> usize {
        self.cost().len()
    }

    /// Number of features (rows of the representation matrix).
    pub fn n_features(&self) -> usize {
        self.rij().nrow
    }
}

impl From<MaxCoverageModel> for CanonicalModel {
    fn from(model: MaxCoverageModel) -> Self {
        CanonicalModel::MaxCoverage(model)
    }
}

impl From<TargetModel> for CanonicalModel {
    fn from(model: TargetModel) -> Self {
        CanonicalModel::Target(model)
    }
}

impl fmt::Display for CanonicalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalModel::MaxCoverage(m) => {
                writeln!(f, "Maximum coverage model")?;
                writeln!(f, "  planning units: {}", m.cost.len())?;
                if let InclusionMask::Mask(mask) = &m.included {
                    writeln!(f, "  excluded units: {}", mask.len().saturating_sub(m.cost.len()))?;
                }
                writeln!(f, "  features:       {}", m.rij.nrow)?;
                writeln!(f, "  budget:         {}", m.budget)?;
            }
            CanonicalModel::Target(m) => {
                writeln!(f, "Target-based model")?;
                writeln!(f, "  planning units: {}", m.cost.len())?;
                writeln!(f, "  features:       {}", m.rij.nrow)?;
                writeln!(f, "  total target:   {}", m.targets.iter().sum::<f64>())?;
            }
        }
        writeln!(f, "  locked in:      {}", self.locked_in().len())?;
        write!(f, "  locked out:     {}", self.locked_out().len())
    }
}

/// The outcome of solving a canonical model.
#[derive(Clone, Debug, PartialEq)]
pub enum Solution {
    /// One flag per final planning unit; true where the unit is selected.
    Selected(Vec<bool>),
    /// The solver proved that no selection satisfies the model.
    Infeasible,
}

/// Contract for an external optimization back end.
///
/// Adapters read the model and never mutate it.
pub trait SolverAdapter {
    fn solve(&self, model: &CanonicalModel) -> Result<Solution, ReserveError>;
}
