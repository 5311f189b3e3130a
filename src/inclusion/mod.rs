//! Planning-unit inclusion filtering.
//!
//! Grid planning units with a missing cost cell take no part in the model.
//! This module derives the [`InclusionMask`] from the cost layer and subsets
//! per-unit structures against it. Inputs are never modified; every
//! operation returns a new value.

pub mod remap;

pub use remap::{remap_indices, remap_locked};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReserveError;
use crate::ir::{PlanningUnitId, SparseMatrix};

/// Which of the original planning units participate in the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionMask {
    /// Every planning unit is included.
    All,
    /// One flag per original planning unit; true where included.
    Mask(Vec<bool>),
}

impl InclusionMask {
    /// Derives the mask from a cost layer. A cost is missing when it is
    /// `None` or NaN.
    ///
    /// Returns [`InclusionMask::All`] when nothing is missing, so callers
    /// can skip subsetting entirely.
    pub fn from_costs(costs: &[Option<f64>]) -> Self {
        let flags: Vec<bool> = costs.iter().map(|c| is_present(*c)).collect();
        if flags.iter().all(|&f| f) {
            InclusionMask::All
        } else {
            debug!(
                excluded = flags.iter().filter(|&&f| !f).count(),
                total = flags.len(),
                "excluding planning units with missing cost"
            );
            InclusionMask::Mask(flags)
        }
    }

    /// Returns true for the "all included" fast path.
    pub fn is_all(&self) -> bool {
        matches!(self, InclusionMask::All)
    }

    /// Returns the per-unit flags, or `None` when every unit is included.
    pub fn as_slice(&self) -> Option<&[bool]> {
        match self {
            InclusionMask::All => None,
            InclusionMask::Mask(flags) => Some(flags),
        }
    }

    /// Returns true if the unit at the given original 0-based offset is included.
    pub fn is_included(&self, offset: usize) -> bool {
        match self {
            InclusionMask::All => true,
            InclusionMask::Mask(flags) => flags.get(offset).copied().unwrap_or(false),
        }
    }

    /// Number of included units out of `n_original`.
    pub fn n_included(&self, n_original: usize) -> usize {
        match self {
            InclusionMask::All => n_original,
            InclusionMask::Mask(flags) => flags.iter().filter(|&&f| f).count(),
        }
    }

    /// Maps a selection over final planning units back onto the original
    /// planning units. Excluded units map to `None`.
    pub fn expand_selection(&self, selection: &[bool]) -> Result<Vec<Option<bool>>, ReserveError> {
        match self {
            InclusionMask::All => Ok(selection.iter().copied().map(Some).collect()),
            InclusionMask::Mask(flags) => {
                let included = flags.iter().filter(|&&f| f).count();
                if selection.len() != included {
                    return Err(ReserveError::dimension(
                        "solution selection",
                        included,
                        selection.len(),
                    ));
                }
                let mut picks = selection.iter().copied();
                Ok(flags
                    .iter()
                    .map(|&f| if f { picks.next() } else { None })
                    .collect())
            }
        }
    }
}

fn is_present(cost: Option<f64>) -> bool {
    cost.is_some_and(|v| !v.is_nan())
}

/// Keeps the costs of included units, preserving their relative order.
///
/// Any included unit whose cost is missing is an [`ReserveError::InvalidCost`].
pub fn subset_cost(costs: &[Option<f64>], mask: &InclusionMask) -> Result<Vec<f64>, ReserveError> {
    if let Some(flags) = mask.as_slice() {
        if flags.len() != costs.len() {
            return Err(ReserveError::dimension(
                "inclusion mask",
                costs.len(),
                flags.len(),
            ));
        }
    }

    let mut kept = Vec::with_capacity(mask.n_included(costs.len()));
    for (offset, cost) in costs.iter().enumerate() {
        if !mask.is_included(offset) {
            continue;
        }
        match cost {
            Some(value) if !value.is_nan() => kept.push(*value),
            _ => {
                return Err(ReserveError::InvalidCost {
                    planning_unit: PlanningUnitId::from_offset(offset),
                    reason: "cost is missing".to_string(),
                })
            }
        }
    }
    Ok(kept)
}

/// Drops the representation-matrix columns of excluded units.
pub fn subset_rij(rij: &SparseMatrix, mask: &InclusionMask) -> Result<SparseMatrix, ReserveError> {
    match mask {
        InclusionMask::All => Ok(rij.clone()),
        InclusionMask::Mask(flags) => {
            if flags.len() != rij.ncol {
                return Err(ReserveError::dimension(
                    "representation matrix columns",
                    flags.len(),
                    rij.ncol,
                ));
            }
            Ok(rij.select_columns(flags))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_missing_is_all() {
        let mask = InclusionMask::from_costs(&[Some(1.0), Some(2.0)]);
        assert!(mask.is_all());
        assert_eq!(mask.n_included(2), 2);
    }

    #[test]
    fn test_missing_and_nan_are_excluded() {
        let mask = InclusionMask::from_costs(&[Some(1.0), None, Some(f64::NAN), Some(4.0)]);
        assert_eq!(mask.as_slice(), Some(&[true, false, false, true][..]));
        assert_eq!(mask.n_included(4), 2);
    }

    #[test]
    fn test_subset_cost_preserves_order() {
        let costs = [Some(5.0), None, Some(3.0), Some(1.0)];
        let mask = InclusionMask::from_costs(&costs);
        assert_eq!(subset_cost(&costs, &mask).unwrap(), vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn test_subset_cost_rejects_missing_when_all_included() {
        let err = subset_cost(&[Some(1.0), None], &InclusionMask::All).unwrap_err();
        assert!(matches!(
            err,
            ReserveError::InvalidCost { planning_unit, .. } if planning_unit == PlanningUnitId(2)
        ));
    }

    #[test]
    fn test_subset_rij_drops_columns() {
        let rij = SparseMatrix::from_triplets(2, 3, vec![(0, 0, 1.0), (1, 1, 2.0), (1, 2, 3.0)]);
        let mask = InclusionMask::Mask(vec![true, false, true]);
        let subset = subset_rij(&rij, &mask).unwrap();
        assert_eq!(subset.nrow, 2);
        assert_eq!(subset.ncol, 2);
        assert_eq!(subset.iter().collect::<Vec<_>>(), vec![(0, 0, 1.0), (1, 1, 3.0)]);
    }

    #[test]
    fn test_subset_rij_mask_length_mismatch() {
        let rij = SparseMatrix::new(1, 3);
        let err = subset_rij(&rij, &InclusionMask::Mask(vec![true])).unwrap_err();
        assert!(matches!(err, ReserveError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_subset_does_not_touch_input() {
        let rij = SparseMatrix::from_triplets(1, 2, vec![(0, 1, 1.0)]);
        let before = rij.clone();
        let _ = subset_rij(&rij, &InclusionMask::Mask(vec![false, true])).unwrap();
        assert_eq!(rij, before);
    }

    #[test]
    fn test_expand_selection() {
        let mask = InclusionMask::Mask(vec![true, false, true]);
        assert_eq!(
            mask.expand_selection(&[false, true]).unwrap(),
            vec![Some(false), None, Some(true)]
        );
        assert!(mask.expand_selection(&[true]).is_err());
        assert_eq!(
            InclusionMask::All.expand_selection(&[true]).unwrap(),
            vec![Some(true)]
        );
    }
}
