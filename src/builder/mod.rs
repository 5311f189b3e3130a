//! Model construction.
//!
//! The two problem variants each get their own builder,
//! [`build_maxcoverage_model`] and [`build_target_model`]. Both dispatch on
//! the planning-unit kind:
//!
//! | kind    | max coverage                            | target based        |
//! |---------|-----------------------------------------|---------------------|
//! | grid    | units with missing cost are excluded    | missing cost errors |
//! | polygon | all units included                      | all units included  |
//!
//! The pipeline is: precondition checks, cost extraction (and exclusion),
//! representation matrix (explicit `rij`, feature grid extraction, or
//! polygon summarising), lock remapping, then targets or the budget check.
//! Every step returns new values; the inputs are never modified.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ReserveError;
use crate::inclusion::{self, InclusionMask};
use crate::ir::{
    CanonicalModel, FeatureId, Grid, LockInput, MaxCoverageModel, PlanningUnitId,
    PlanningUnitInput, SparseMatrix, TargetModel,
};
use crate::rij::{self, RijInput};
use crate::summarize::FeatureSummarizer;
use crate::targets::{self, TargetType, Targets};
use crate::validation;

/// Inputs shared by both problem variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelInputs {
    /// Grid or polygon planning units carrying the costs.
    pub planning_units: PlanningUnitInput,

    /// Feature distributions, one layer per feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Grid>,

    /// An explicit representation matrix; takes precedence over `features`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rij: Option<RijInput>,

    /// Planning units forced into the solution (original numbering).
    #[serde(default)]
    pub locked_in: LockInput,

    /// Planning units forced out of the solution (original numbering).
    #[serde(default)]
    pub locked_out: LockInput,
}

impl ModelInputs {
    /// Creates inputs with no features, no matrix, and no locks.
    pub fn new(planning_units: PlanningUnitInput) -> Self {
        Self {
            planning_units,
            features: None,
            rij: None,
            locked_in: LockInput::default(),
            locked_out: LockInput::default(),
        }
    }

    pub fn with_features(mut self, features: Grid) -> Self {
        self.features = Some(features);
        self
    }

    pub fn with_rij(mut self, rij: RijInput) -> Self {
        self.rij = Some(rij);
        self
    }

    pub fn with_locked_in(mut self, locked_in: LockInput) -> Self {
        self.locked_in = locked_in;
        self
    }

    pub fn with_locked_out(mut self, locked_out: LockInput) -> Self {
        self.locked_out = locked_out;
        self
    }
}

/// The variant-specific part of a problem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum Objective {
    /// Maximise representation subject to a cost ceiling.
    MaxCoverage { budget: f64 },
    /// Meet per-feature targets.
    Target {
        targets: Targets,
        #[serde(default)]
        target_type: TargetType,
    },
}

/// A complete problem description, as read from a problem file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(flatten)]
    pub inputs: ModelInputs,
    pub objective: Objective,
}

impl Problem {
    /// Builds the model for whichever variant the objective names.
    pub fn build(&self, summarizer: &dyn FeatureSummarizer) -> Result<CanonicalModel, ReserveError> {
        match &self.objective {
            Objective::MaxCoverage { budget } => {
                build_maxcoverage_model(&self.inputs, *budget, summarizer).map(Into::into)
            }
            Objective::Target {
                targets,
                target_type,
            } => build_target_model(&self.inputs, targets, *target_type, summarizer).map(Into::into),
        }
    }
}

/// Builds a maximum-coverage model.
///
/// For grid planning units, cells whose cost is missing are excluded and
/// the lock sets are renumbered into the remaining units. The locked-in
/// cost is checked against the budget after exclusion.
pub fn build_maxcoverage_model(
    inputs: &ModelInputs,
    budget: f64,
    summarizer: &dyn FeatureSummarizer,
) -> Result<MaxCoverageModel, ReserveError> {
    validation::check_budget(budget)?;
    let (locked_in, locked_out) = checked_locks(inputs)?;

    let (cost, rij, included) = match &inputs.planning_units {
        PlanningUnitInput::Grid(grid) => {
            let layer = validation::cost_layer(grid)?;
            let included = InclusionMask::from_costs(&layer.values);
            let cost = inclusion::subset_cost(&layer.values, &included)?;
            let rij = inclusion::subset_rij(&representation(inputs, summarizer)?, &included)?;
            (cost, rij, included)
        }
        PlanningUnitInput::Polygon(layer) => {
            let costs = validation::polygon_costs(layer)?;
            let cost = inclusion::subset_cost(costs, &InclusionMask::All)?;
            (cost, representation(inputs, summarizer)?, InclusionMask::All)
        }
    };
    validation::check_costs(&cost)?;
    validation::check_rij(&rij, cost.len())?;

    let (locked_in, locked_out) = if included.is_all() {
        (locked_in, locked_out)
    } else {
        warn_excluded_locks(&locked_in, &included, "locked_in");
        warn_excluded_locks(&locked_out, &included, "locked_out");
        inclusion::remap_locked(&locked_in, &locked_out, &included)
    };
    validation::check_locked_cost(&cost, &locked_in, budget)?;
    warn_zero_totals(&rij.row_sums());

    info!(
        kind = inputs.planning_units.kind(),
        planning_units = cost.len(),
        features = rij.nrow,
        budget,
        "built maximum coverage model"
    );
    Ok(MaxCoverageModel::new(
        cost, rij, budget, locked_in, locked_out, included,
    ))
}

/// Builds a target-based model.
///
/// No planning units are excluded in this variant: a missing cost is an
/// error for both planning-unit kinds.
pub fn build_target_model(
    inputs: &ModelInputs,
    targets: &Targets,
    target_type: TargetType,
    summarizer: &dyn FeatureSummarizer,
) -> Result<TargetModel, ReserveError> {
    let (locked_in, locked_out) = checked_locks(inputs)?;

    let costs = validation::planning_unit_costs(&inputs.planning_units)?;
    let cost = inclusion::subset_cost(costs, &InclusionMask::All)?;
    validation::check_costs(&cost)?;

    let rij = representation(inputs, summarizer)?;
    validation::check_rij(&rij, cost.len())?;

    let totals = rij.row_sums();
    warn_zero_totals(&totals);
    let targets = targets::compute_targets(&totals, targets, target_type)?;

    info!(
        kind = inputs.planning_units.kind(),
        planning_units = cost.len(),
        features = rij.nrow,
        ?target_type,
        "built target-based model"
    );
    Ok(TargetModel::new(cost, rij, targets, locked_in, locked_out))
}

/// Range-checks and normalises both lock sets and rejects any overlap.
fn checked_locks(
    inputs: &ModelInputs,
) -> Result<(Vec<PlanningUnitId>, Vec<PlanningUnitId>), ReserveError> {
    let n_units = inputs.planning_units.n_units();
    let locked_in = validation::lock_ids(&inputs.locked_in, n_units, "locked_in")?;
    let locked_out = validation::lock_ids(&inputs.locked_out, n_units, "locked_out")?;
    validation::check_disjoint(&locked_in, &locked_out)?;
    Ok((locked_in, locked_out))
}

/// Produces the representation matrix over all original planning units.
///
/// An explicit `rij` always wins and is never passed to the summarizer.
/// Otherwise feature grids are extracted cell by cell for grid planning
/// units, or summarised over the polygons for polygon planning units.
pub(crate) fn representation(
    inputs: &ModelInputs,
    summarizer: &dyn FeatureSummarizer,
) -> Result<SparseMatrix, ReserveError> {
    let n_units = inputs.planning_units.n_units();
    match (&inputs.rij, &inputs.features, &inputs.planning_units) {
        (Some(rij), features, _) => {
            rij::build_rij(rij, n_units, features.as_ref().map(Grid::n_layers))
        }
        (None, Some(features), PlanningUnitInput::Grid(grid)) => {
            validation::check_feature_grid(grid, features)?;
            rij::rij_from_grid(features)
        }
        (None, Some(features), PlanningUnitInput::Polygon(layer)) => {
            // summarizer output gets the same extent and offset checks as a user triplet
            let summarised = RijInput::Triplet(summarizer.summarize(layer, features)?);
            rij::build_rij(&summarised, n_units, Some(features.n_layers()))
        }
        (None, None, _) => Err(ReserveError::MissingRepresentation),
    }
}

fn warn_excluded_locks(ids: &[PlanningUnitId], mask: &InclusionMask, which: &str) {
    for id in ids {
        if id.offset().is_some_and(|o| !mask.is_included(o)) {
            warn!(planning_unit = id.get(), which, "locked planning unit has missing cost and is dropped");
        }
    }
}

fn warn_zero_totals(totals: &[f64]) {
    for (offset, total) in totals.iter().enumerate() {
        if *total == 0.0 {
            warn!(
                feature = FeatureId::from_offset(offset).get(),
                "feature has zero total representation"
            );
        } else {
            debug!(feature = FeatureId::from_offset(offset).get(), total, "feature total");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DenseMatrix, GridLayer, Polygon, PolygonLayer, Table};
    use crate::summarize::CellCentroidSummarizer;

    fn ids(values: &[usize]) -> Vec<PlanningUnitId> {
        values.iter().copied().map(PlanningUnitId).collect()
    }

    /// A 1x4 grid with two features.
    fn grid_inputs(costs: Vec<Option<f64>>) -> ModelInputs {
        let planning_units = Grid::new(1, 4, vec![GridLayer::new("cost", costs)]);
        let features = Grid::new(
            1,
            4,
            vec![
                GridLayer::from_values("a", [1.0, 0.0, 1.0, 1.0]),
                GridLayer::from_values("b", [0.5, 0.5, 0.0, 2.0]),
            ],
        );
        ModelInputs::new(PlanningUnitInput::Grid(planning_units)).with_features(features)
    }

    fn polygon_inputs() -> ModelInputs {
        let layer = PolygonLayer::with_costs(
            vec![
                Polygon::rect(0.0, 0.0, 2.0, 1.0),
                Polygon::rect(2.0, 0.0, 4.0, 1.0),
            ],
            vec![Some(10.0), Some(20.0)],
        );
        let features = Grid::new(1, 4, vec![GridLayer::from_values("a", [1.0, 2.0, 3.0, 4.0])]);
        ModelInputs::new(PlanningUnitInput::Polygon(layer)).with_features(features)
    }

    #[test]
    fn test_maxcoverage_grid_all_included() {
        let inputs = grid_inputs(vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)])
            .with_locked_in(LockInput::ids([2]))
            .with_locked_out(LockInput::ids([4]));
        let model = build_maxcoverage_model(&inputs, 5.0, &CellCentroidSummarizer).unwrap();
        assert_eq!(model.included(), &InclusionMask::All);
        assert_eq!(model.cost(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!((model.rij().nrow, model.rij().ncol), (2, 4));
        assert_eq!(model.locked_in(), ids(&[2]).as_slice());
        assert_eq!(model.locked_out(), ids(&[4]).as_slice());
    }

    #[test]
    fn test_maxcoverage_grid_excludes_missing_and_remaps() {
        let inputs = grid_inputs(vec![Some(1.0), None, Some(3.0), Some(4.0)])
            .with_locked_in(LockInput::ids([3]))
            .with_locked_out(LockInput::ids([2, 4]));
        let model = build_maxcoverage_model(&inputs, 5.0, &CellCentroidSummarizer).unwrap();
        assert_eq!(
            model.included(),
            &InclusionMask::Mask(vec![true, false, true, true])
        );
        assert_eq!(model.cost(), &[1.0, 3.0, 4.0]);
        assert_eq!(model.rij().ncol, 3);
        assert_eq!(model.rij().get(1, 2), 2.0);
        assert_eq!(model.locked_in(), ids(&[2]).as_slice());
        assert_eq!(model.locked_out(), ids(&[3]).as_slice());
    }

    #[test]
    fn test_maxcoverage_excluded_feature_nan_is_dropped() {
        let mut inputs = grid_inputs(vec![Some(1.0), None, Some(3.0), Some(4.0)]);
        if let Some(features) = inputs.features.as_mut() {
            features.layers[0].values[1] = None;
        }
        assert!(build_maxcoverage_model(&inputs, 5.0, &CellCentroidSummarizer).is_ok());
    }

    #[test]
    fn test_maxcoverage_included_feature_nan_fails() {
        let mut inputs = grid_inputs(vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        if let Some(features) = inputs.features.as_mut() {
            features.layers[1].values[2] = None;
        }
        let err = build_maxcoverage_model(&inputs, 5.0, &CellCentroidSummarizer).unwrap_err();
        assert!(matches!(err, ReserveError::NonFiniteRepresentation { .. }));
    }

    #[test]
    fn test_maxcoverage_locked_cost_uses_computed_costs() {
        let inputs = grid_inputs(vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)])
            .with_locked_in(LockInput::ids([3, 4]));
        let err = build_maxcoverage_model(&inputs, 6.5, &CellCentroidSummarizer).unwrap_err();
        assert!(matches!(
            err,
            ReserveError::InfeasibleBudget { locked_cost, .. } if locked_cost == 7.0
        ));
    }

    #[test]
    fn test_maxcoverage_overlapping_locks() {
        let inputs = grid_inputs(vec![Some(1.0); 4])
            .with_locked_in(LockInput::ids([1, 2]))
            .with_locked_out(LockInput::ids([2]));
        let err = build_maxcoverage_model(&inputs, 5.0, &CellCentroidSummarizer).unwrap_err();
        assert!(matches!(err, ReserveError::InvalidLockSet(_)));
    }

    #[test]
    fn test_maxcoverage_rij_precedence_and_columns() {
        let dense = DenseMatrix::from_rows(&[vec![1.0, 2.0, 3.0, 4.0], vec![0.0; 4]]).unwrap();
        let inputs = grid_inputs(vec![Some(1.0), Some(1.0), None, Some(1.0)])
            .with_rij(RijInput::Dense(dense));
        let model = build_maxcoverage_model(&inputs, 5.0, &CellCentroidSummarizer).unwrap();
        assert_eq!(model.rij().ncol, 3);
        assert_eq!(model.rij().get(0, 2), 4.0);
    }

    #[test]
    fn test_rij_row_count_must_match_features() {
        let table = Table::from_triples(vec![(3, 1, 1.0)]);
        let inputs = grid_inputs(vec![Some(1.0); 4]).with_rij(RijInput::Table(table));
        let err = build_maxcoverage_model(&inputs, 5.0, &CellCentroidSummarizer).unwrap_err();
        assert!(matches!(err, ReserveError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_missing_representation() {
        let mut inputs = grid_inputs(vec![Some(1.0); 4]);
        inputs.features = None;
        let err = build_maxcoverage_model(&inputs, 5.0, &CellCentroidSummarizer).unwrap_err();
        assert!(matches!(err, ReserveError::MissingRepresentation));
    }

    #[test]
    fn test_feature_grid_shape_mismatch() {
        let mut inputs = grid_inputs(vec![Some(1.0); 4]);
        inputs.features = Some(Grid::new(2, 2, vec![GridLayer::from_values("a", [1.0; 4])]));
        let err = build_maxcoverage_model(&inputs, 5.0, &CellCentroidSummarizer).unwrap_err();
        assert!(matches!(err, ReserveError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_maxcoverage_polygon() {
        let inputs = polygon_inputs().with_locked_in(LockInput::ids([1]));
        let model = build_maxcoverage_model(&inputs, 15.0, &CellCentroidSummarizer).unwrap();
        assert_eq!(model.cost(), &[10.0, 20.0]);
        assert_eq!(model.rij().get(0, 0), 3.0);
        assert_eq!(model.rij().get(0, 1), 7.0);
        assert_eq!(model.included(), &InclusionMask::All);
    }

    #[test]
    fn test_polygon_missing_cost_is_error() {
        let mut inputs = polygon_inputs();
        if let PlanningUnitInput::Polygon(layer) = &mut inputs.planning_units {
            layer.attributes.insert("cost".into(), vec![Some(1.0), None]);
        }
        let err = build_maxcoverage_model(&inputs, 15.0, &CellCentroidSummarizer).unwrap_err();
        assert!(matches!(err, ReserveError::InvalidCost { .. }));
    }

    #[test]
    fn test_polygon_summarizer_column_mismatch() {
        let bad = |_: &PolygonLayer, f: &Grid| -> Result<SparseMatrix, ReserveError> {
            Ok(SparseMatrix::new(f.n_layers(), 5))
        };
        let err = build_maxcoverage_model(&polygon_inputs(), 15.0, &bad).unwrap_err();
        assert!(matches!(err, ReserveError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_polygon_summarizer_offsets_out_of_range() {
        let bad = |_: &PolygonLayer, _: &Grid| -> Result<SparseMatrix, ReserveError> {
            Ok(SparseMatrix::from_triplets(1, 2, vec![(0, 7, 1.0), (3, 0, 1.0)]))
        };
        let err = build_maxcoverage_model(&polygon_inputs(), 15.0, &bad).unwrap_err();
        assert!(matches!(err, ReserveError::DimensionMismatch { .. }));

        let err = build_target_model(
            &polygon_inputs(),
            &Targets::Scalar(0.5),
            TargetType::Relative,
            &bad,
        )
        .unwrap_err();
        assert!(matches!(err, ReserveError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_negative_rij_amount_is_rejected() {
        let mut inputs = grid_inputs(vec![Some(1.0); 4]);
        inputs.features = None;
        inputs.rij = Some(RijInput::Table(Table::from_triples(vec![(1, 1, -5.0)])));
        let err = build_maxcoverage_model(&inputs, 10.0, &CellCentroidSummarizer).unwrap_err();
        assert!(matches!(
            err,
            ReserveError::NegativeRepresentation { value, .. } if value == -5.0
        ));
    }

    #[test]
    fn test_huge_feature_index_is_rejected() {
        let mut inputs = grid_inputs(vec![Some(1.0); 4]);
        inputs.features = None;
        inputs.rij = Some(RijInput::Table(Table::from_triples(vec![(
            2_000_000_000_000_000,
            1,
            1.0,
        )])));
        let err = build_maxcoverage_model(&inputs, 10.0, &CellCentroidSummarizer).unwrap_err();
        assert!(matches!(err, ReserveError::MalformedTable(_)));
    }

    #[test]
    fn test_target_relative() {
        let inputs = grid_inputs(vec![Some(1.0); 4]);
        let model = build_target_model(
            &inputs,
            &Targets::Scalar(0.5),
            TargetType::Relative,
            &CellCentroidSummarizer,
        )
        .unwrap();
        assert_eq!(model.targets(), &[1.5, 1.5]);
        assert_eq!(model.cost().len(), 4);
    }

    #[test]
    fn test_target_grid_does_not_exclude() {
        let inputs = grid_inputs(vec![Some(1.0), None, Some(1.0), Some(1.0)]);
        let err = build_target_model(
            &inputs,
            &Targets::Scalar(0.5),
            TargetType::Relative,
            &CellCentroidSummarizer,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ReserveError::InvalidCost { planning_unit, .. } if planning_unit == PlanningUnitId(2)
        ));
    }

    #[test]
    fn test_target_absolute_infeasible() {
        let inputs = grid_inputs(vec![Some(1.0); 4]);
        let err = build_target_model(
            &inputs,
            &Targets::PerFeature(vec![3.0, 3.5]),
            TargetType::Absolute,
            &CellCentroidSummarizer,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ReserveError::InfeasibleTarget { feature, .. } if feature == FeatureId(2)
        ));
    }

    #[test]
    fn test_target_polygon_rejects_overlapping_locks() {
        let inputs = polygon_inputs()
            .with_locked_in(LockInput::ids([1]))
            .with_locked_out(LockInput::ids([1]));
        let err = build_target_model(
            &inputs,
            &Targets::Scalar(0.1),
            TargetType::Relative,
            &CellCentroidSummarizer,
        )
        .unwrap_err();
        assert!(matches!(err, ReserveError::InvalidLockSet(_)));
    }

    #[test]
    fn test_problem_build_dispatches_variant() {
        let problem = Problem {
            inputs: polygon_inputs(),
            objective: Objective::Target {
                targets: Targets::Scalar(1.0),
                target_type: TargetType::Relative,
            },
        };
        let model = problem.build(&CellCentroidSummarizer).unwrap();
        assert!(matches!(model, CanonicalModel::Target(_)));
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let inputs = grid_inputs(vec![Some(1.0), None, Some(3.0), Some(4.0)]);
        let before = inputs.clone();
        let _ = build_maxcoverage_model(&inputs, 5.0, &CellCentroidSummarizer).unwrap();
        assert_eq!(inputs, before);
    }
}
