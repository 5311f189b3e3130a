//! Precondition checks for model construction.
//!
//! Two entry styles share the same checks:
//! - the `check_*` functions and friends return `Result` and are chained
//!   with `?` by the model builders, so construction aborts at the first
//!   failing condition;
//! - [`validate_problem`] runs every check it can and collects all failures
//!   (plus a few warnings) into a [`ValidationReport`].

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::BTreeSet;

use crate::builder::{self, Objective, Problem};
use crate::error::ReserveError;
use crate::inclusion::{self, InclusionMask};
use crate::ir::{
    CanonicalModel, FeatureId, Grid, GridLayer, LockInput, PlanningUnitId, PlanningUnitInput,
    PolygonLayer, SparseMatrix, COST_ATTRIBUTE,
};
use crate::rij::{self, MAX_FEATURES};
use crate::summarize::FeatureSummarizer;
use crate::targets::{self, TargetType, Targets};

/// Checks that a budget is a positive finite number.
pub fn check_budget(budget: f64) -> Result<(), ReserveError> {
    if budget.is_finite() && budget > 0.0 {
        Ok(())
    } else {
        Err(ReserveError::InvalidBudget(budget))
    }
}

/// Returns the single cost layer of a planning-unit grid.
pub fn cost_layer(grid: &Grid) -> Result<&GridLayer, ReserveError> {
    let [layer] = grid.layers.as_slice() else {
        return Err(ReserveError::UnsupportedInputType(format!(
            "planning-unit grid must have exactly one cost layer, found {}",
            grid.n_layers()
        )));
    };
    if layer.values.len() != grid.n_cells() {
        return Err(ReserveError::dimension(
            "cost layer cells",
            grid.n_cells(),
            layer.values.len(),
        ));
    }
    Ok(layer)
}

/// Returns the cost attribute of a polygon layer.
pub fn polygon_costs(layer: &PolygonLayer) -> Result<&[Option<f64>], ReserveError> {
    let costs = layer.attribute(COST_ATTRIBUTE).ok_or_else(|| {
        ReserveError::UnsupportedInputType(format!(
            "polygon planning units have no '{}' attribute",
            COST_ATTRIBUTE
        ))
    })?;
    if costs.len() != layer.len() {
        return Err(ReserveError::dimension(
            "cost attribute values",
            layer.len(),
            costs.len(),
        ));
    }
    Ok(costs)
}

/// Returns the raw per-unit costs of either planning-unit kind.
pub fn planning_unit_costs(input: &PlanningUnitInput) -> Result<&[Option<f64>], ReserveError> {
    match input {
        PlanningUnitInput::Grid(grid) => Ok(&cost_layer(grid)?.values),
        PlanningUnitInput::Polygon(layer) => polygon_costs(layer),
    }
}

/// Checks that every final cost is finite.
pub fn check_costs(cost: &[f64]) -> Result<(), ReserveError> {
    match cost.iter().position(|c| !c.is_finite()) {
        Some(offset) => Err(ReserveError::InvalidCost {
            planning_unit: PlanningUnitId::from_offset(offset),
            reason: format!("cost {} is not finite", cost[offset]),
        }),
        None => Ok(()),
    }
}

/// Normalises a lock input into strictly ascending ids within `[1, n_units]`.
///
/// `which` names the lock set in error messages.
pub fn lock_ids(
    input: &LockInput,
    n_units: usize,
    which: &str,
) -> Result<Vec<PlanningUnitId>, ReserveError> {
    let mut ids = match input {
        LockInput::Indices(ids) => {
            if let Some(bad) = ids.iter().find(|id| id.get() == 0 || id.get() > n_units) {
                return Err(ReserveError::InvalidLockSet(format!(
                    "{} index {} is outside [1, {}]",
                    which, bad, n_units
                )));
            }
            ids.clone()
        }
        LockInput::Mask(flags) => {
            if flags.len() != n_units {
                return Err(ReserveError::dimension(
                    format!("{} mask", which),
                    n_units,
                    flags.len(),
                ));
            }
            flags
                .iter()
                .enumerate()
                .filter(|(_, &f)| f)
                .map(|(offset, _)| PlanningUnitId::from_offset(offset))
                .collect()
        }
    };
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Checks that no planning unit is locked both in and out.
pub fn check_disjoint(
    locked_in: &[PlanningUnitId],
    locked_out: &[PlanningUnitId],
) -> Result<(), ReserveError> {
    let locked_in: BTreeSet<_> = locked_in.iter().collect();
    let overlap: Vec<String> = locked_out
        .iter()
        .filter(|id| locked_in.contains(id))
        .map(ToString::to_string)
        .collect();
    if overlap.is_empty() {
        Ok(())
    } else {
        Err(ReserveError::InvalidLockSet(format!(
            "planning unit(s) {} are both locked in and locked out",
            overlap.join(", ")
        )))
    }
}

/// Checks that a feature grid has the planning-unit grid's cell layout.
pub fn check_feature_grid(planning_units: &Grid, features: &Grid) -> Result<(), ReserveError> {
    if planning_units.same_shape(features) {
        Ok(())
    } else {
        Err(ReserveError::dimension(
            "feature grid cells",
            planning_units.n_cells(),
            features.n_cells(),
        ))
    }
}

/// Iterates over the entries of a representation matrix that no model may
/// hold: non-finite values and negative amounts.
pub fn invalid_entries(rij: &SparseMatrix) -> impl Iterator<Item = ReserveError> + '_ {
    rij.iter().filter_map(|(row, col, value)| {
        let feature = FeatureId::from_offset(row);
        let planning_unit = PlanningUnitId::from_offset(col);
        if !value.is_finite() {
            Some(ReserveError::NonFiniteRepresentation {
                feature,
                planning_unit,
                value,
            })
        } else if value < 0.0 {
            Some(ReserveError::NegativeRepresentation {
                feature,
                planning_unit,
                value,
            })
        } else {
            None
        }
    })
}

/// Checks the representation matrix against the final planning-unit count
/// and rejects out-of-range offsets and any non-finite or negative value.
pub fn check_rij(rij: &SparseMatrix, n_units: usize) -> Result<(), ReserveError> {
    if rij.ncol != n_units {
        return Err(ReserveError::dimension(
            "representation matrix columns",
            n_units,
            rij.ncol,
        ));
    }
    rij::check_offsets(rij)?;
    match invalid_entries(rij).next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Checks that the locked-in units fit within the budget.
///
/// `cost` and `locked_in` must be in the same (final) index space.
pub fn check_locked_cost(
    cost: &[f64],
    locked_in: &[PlanningUnitId],
    budget: f64,
) -> Result<(), ReserveError> {
    let locked_cost: f64 = locked_in
        .iter()
        .filter_map(|id| id.offset().and_then(|o| cost.get(o)))
        .sum();
    if locked_cost > budget {
        Err(ReserveError::InfeasibleBudget {
            locked_cost,
            budget,
        })
    } else {
        Ok(())
    }
}

/// Re-checks a model that did not come out of a builder, such as one read
/// back from JSON, against everything the builders guarantee.
pub fn check_model(model: &CanonicalModel) -> Result<(), ReserveError> {
    let cost = model.cost();
    let rij = model.rij();
    let n_units = cost.len();

    check_costs(cost)?;
    if rij.nrow > MAX_FEATURES {
        return Err(ReserveError::dimension(
            "representation matrix rows",
            MAX_FEATURES,
            rij.nrow,
        ));
    }
    check_rij(rij, n_units)?;
    let locked_in = lock_ids(&LockInput::Indices(model.locked_in().to_vec()), n_units, "locked_in")?;
    let locked_out =
        lock_ids(&LockInput::Indices(model.locked_out().to_vec()), n_units, "locked_out")?;
    check_disjoint(&locked_in, &locked_out)?;

    match model {
        CanonicalModel::MaxCoverage(m) => {
            check_budget(m.budget())?;
            let n_included = m.included().n_included(n_units);
            if n_included != n_units {
                return Err(ReserveError::dimension(
                    "included planning units",
                    n_units,
                    n_included,
                ));
            }
            check_locked_cost(cost, &locked_in, m.budget())
        }
        CanonicalModel::Target(m) => targets::compute_targets(
            &rij.row_sums(),
            &Targets::PerFeature(m.targets().to_vec()),
            TargetType::Absolute,
        )
        .map(|_| ()),
    }
}

fn record<T>(report: &mut ValidationReport, result: Result<T, ReserveError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            report.add_error(&err);
            None
        }
    }
}

/// Validates a problem, collecting every failing condition.
///
/// Unlike the builders this does not stop at the first error. Checks that
/// depend on an earlier failed step are skipped.
pub fn validate_problem(problem: &Problem, summarizer: &dyn FeatureSummarizer) -> ValidationReport {
    let mut report = ValidationReport::new();
    let inputs = &problem.inputs;
    let n_units = inputs.planning_units.n_units();

    let costs = record(&mut report, planning_unit_costs(&inputs.planning_units));
    let locked_in = record(&mut report, lock_ids(&inputs.locked_in, n_units, "locked_in"));
    let locked_out = record(&mut report, lock_ids(&inputs.locked_out, n_units, "locked_out"));
    if let (Some(locked_in), Some(locked_out)) = (&locked_in, &locked_out) {
        record(&mut report, check_disjoint(locked_in, locked_out));
    }

    let budget = match &problem.objective {
        Objective::MaxCoverage { budget } => record(&mut report, check_budget(*budget)).map(|_| *budget),
        Objective::Target {
            targets,
            target_type,
        } => {
            let values = match targets {
                Targets::Scalar(v) => vec![*v],
                Targets::PerFeature(values) => values.clone(),
            };
            record(&mut report, targets::check_target_values(&values, *target_type));
            None
        }
    };

    // Only the max-coverage grid path excludes units with missing costs
    let mask = match (&problem.objective, &inputs.planning_units, costs) {
        (Objective::MaxCoverage { .. }, PlanningUnitInput::Grid(_), Some(costs)) => {
            InclusionMask::from_costs(costs)
        }
        _ => InclusionMask::All,
    };

    let cost = costs.and_then(|costs| {
        let cost = record(&mut report, inclusion::subset_cost(costs, &mask))?;
        record(&mut report, check_costs(&cost)).map(|_| cost)
    });

    let rij = record(&mut report, builder::representation(inputs, summarizer))
        .and_then(|rij| record(&mut report, inclusion::subset_rij(&rij, &mask)));

    if let Some(rij) = &rij {
        let n_final = mask.n_included(n_units);
        if rij.ncol != n_final {
            report.add_error(&ReserveError::dimension(
                "representation matrix columns",
                n_final,
                rij.ncol,
            ));
        }
        let invalid: Vec<ReserveError> = invalid_entries(rij).collect();
        for err in &invalid {
            report.add_error(err);
        }

        if invalid.is_empty() {
            let totals = rij.row_sums();
            for (offset, total) in totals.iter().enumerate() {
                if *total == 0.0 {
                    report.add(ValidationIssue::warning(
                        IssueCode::ZeroRepresentation,
                        "feature has zero total representation",
                        IssueContext::Feature {
                            id: FeatureId::from_offset(offset).get(),
                        },
                    ));
                }
            }
            if let Objective::Target {
                targets,
                target_type,
            } = &problem.objective
            {
                match targets.broadcast(totals.len()) {
                    Err(err) => report.add_error(&err),
                    Ok(values) if *target_type == TargetType::Absolute => {
                        record_infeasible_targets(&mut report, &totals, &values)
                    }
                    Ok(_) => {}
                }
            }
        }
    }

    if let Some(flags) = mask.as_slice() {
        for id in locked_in.iter().chain(locked_out.iter()).flatten() {
            if id.offset().and_then(|o| flags.get(o)) == Some(&false) {
                report.add(ValidationIssue::warning(
                    IssueCode::LockedUnitExcluded,
                    "locked planning unit has a missing cost and is excluded",
                    IssueContext::PlanningUnit { id: id.get() },
                ));
            }
        }
    }

    if let (Some(budget), Some(cost), Some(locked_in)) = (budget, &cost, &locked_in) {
        let locked_in = inclusion::remap_indices(locked_in, &mask);
        record(&mut report, check_locked_cost(cost, &locked_in, budget));
    }

    report
}

fn record_infeasible_targets(report: &mut ValidationReport, totals: &[f64], targets: &[f64]) {
    for (offset, (&target, &total)) in targets.iter().zip(totals).enumerate() {
        if target > total {
            report.add_error(&ReserveError::InfeasibleTarget {
                feature: FeatureId::from_offset(offset),
                target,
                total,
            });
        }
    }
}
