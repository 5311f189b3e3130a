//! Representation targets.
//!
//! Callers state targets either as proportions of each feature's total
//! representation (relative) or in the feature's own units (absolute). The
//! model always stores absolute targets.

use serde::{Deserialize, Serialize};

use crate::error::ReserveError;
use crate::ir::FeatureId;

/// How targets are interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Proportion of each feature's total representation, in `[0, 1]`.
    #[default]
    Relative,
    /// Amount in the feature's own units.
    Absolute,
}

/// A target specification: one value for every feature, or one per feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Targets {
    Scalar(f64),
    PerFeature(Vec<f64>),
}

impl Targets {
    /// Expands to one value per feature.
    pub fn broadcast(&self, n_features: usize) -> Result<Vec<f64>, ReserveError> {
        match self {
            Targets::Scalar(value) => Ok(vec![*value; n_features]),
            Targets::PerFeature(values) => {
                if values.len() != n_features {
                    return Err(ReserveError::dimension(
                        "targets",
                        n_features,
                        values.len(),
                    ));
                }
                Ok(values.clone())
            }
        }
    }
}

/// Checks each target value for its mode: relative proportions must lie in
/// `[0, 1]`, absolute amounts must be non-negative. All must be finite.
pub fn check_target_values(values: &[f64], target_type: TargetType) -> Result<(), ReserveError> {
    for (offset, &value) in values.iter().enumerate() {
        let reason = if !value.is_finite() {
            Some(format!("target {value} is not finite"))
        } else {
            match target_type {
                TargetType::Relative if !(0.0..=1.0).contains(&value) => {
                    Some(format!("relative target {value} is outside [0, 1]"))
                }
                TargetType::Absolute if value < 0.0 => {
                    Some(format!("absolute target {value} is negative"))
                }
                _ => None,
            }
        };
        if let Some(reason) = reason {
            return Err(ReserveError::InvalidTarget {
                feature: FeatureId::from_offset(offset),
                reason,
            });
        }
    }
    Ok(())
}

/// Converts a target specification into absolute targets.
///
/// `totals` holds each feature's total representation across the model's
/// planning units (the row sums of the representation matrix).
pub fn compute_targets(
    totals: &[f64],
    targets: &Targets,
    target_type: TargetType,
) -> Result<Vec<f64>, ReserveError> {
    let values = targets.broadcast(totals.len())?;
    check_target_values(&values, target_type)?;

    match target_type {
        TargetType::Relative => Ok(values
            .iter()
            .zip(totals)
            .map(|(proportion, total)| proportion * total)
            .collect()),
        TargetType::Absolute => {
            for (offset, (&target, &total)) in values.iter().zip(totals).enumerate() {
                if target > total {
                    return Err(ReserveError::InfeasibleTarget {
                        feature: FeatureId::from_offset(offset),
                        target,
                        total,
                    });
                }
            }
            Ok(values)
        }
    }
}
