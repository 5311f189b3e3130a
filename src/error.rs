use std::path::PathBuf;
use thiserror::Error;

use crate::ir::{FeatureId, PlanningUnitId};
use crate::validation::{IssueCode, ValidationReport};

/// The main error type for reservecraft operations.
#[derive(Debug, Error)]
pub enum ReserveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse problem JSON from {path}: {source}")]
    ProblemJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse problem YAML from {path}: {source}")]
    ProblemYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse representation matrix JSON from {path}: {source}")]
    RijJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse model JSON: {0}")]
    ModelJsonParse(#[source] serde_json::Error),

    #[error("Failed to write validation report JSON: {0}")]
    ReportJsonWrite(#[source] serde_json::Error),

    #[error("Failed to write model JSON to {path}: {source}")]
    ModelJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse representation table CSV from {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Unsupported input type: {0}")]
    UnsupportedInputType(String),

    #[error("Malformed representation table: {0}")]
    MalformedTable(String),

    #[error("Dimension mismatch in {what}: expected {expected}, found {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid lock set: {0}")]
    InvalidLockSet(String),

    #[error("Infeasible budget: locked-in planning units cost {locked_cost} which exceeds the budget of {budget}")]
    InfeasibleBudget { locked_cost: f64, budget: f64 },

    #[error("Infeasible target for feature {feature}: target {target} exceeds the total representation {total}")]
    InfeasibleTarget {
        feature: FeatureId,
        target: f64,
        total: f64,
    },

    #[error("Non-finite representation value {value} for feature {feature} in planning unit {planning_unit}")]
    NonFiniteRepresentation {
        feature: FeatureId,
        planning_unit: PlanningUnitId,
        value: f64,
    },

    #[error("Negative representation value {value} for feature {feature} in planning unit {planning_unit}")]
    NegativeRepresentation {
        feature: FeatureId,
        planning_unit: PlanningUnitId,
        value: f64,
    },

    #[error("Invalid cost for planning unit {planning_unit}: {reason}")]
    InvalidCost {
        planning_unit: PlanningUnitId,
        reason: String,
    },

    #[error("Invalid budget {0}: must be a positive finite number")]
    InvalidBudget(f64),

    #[error("Invalid target for feature {feature}: {reason}")]
    InvalidTarget { feature: FeatureId, reason: String },

    #[error("Either feature layers or a representation matrix must be supplied")]
    MissingRepresentation,

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },
}

impl ReserveError {
    /// Returns the stable issue code for model-construction failures.
    ///
    /// IO and parse failures have no issue code; they never reach a
    /// validation report.
    pub fn code(&self) -> Option<IssueCode> {
        let code = match self {
            ReserveError::UnsupportedInputType(_) => IssueCode::UnsupportedInputType,
            ReserveError::MalformedTable(_) => IssueCode::MalformedTable,
            ReserveError::DimensionMismatch { .. } => IssueCode::DimensionMismatch,
            ReserveError::InvalidLockSet(_) => IssueCode::InvalidLockSet,
            ReserveError::InfeasibleBudget { .. } => IssueCode::InfeasibleBudget,
            ReserveError::InfeasibleTarget { .. } => IssueCode::InfeasibleTarget,
            ReserveError::NonFiniteRepresentation { .. } => IssueCode::NonFiniteRepresentation,
            ReserveError::NegativeRepresentation { .. } => IssueCode::NegativeRepresentation,
            ReserveError::InvalidCost { .. } => IssueCode::InvalidCost,
            ReserveError::InvalidBudget(_) => IssueCode::InvalidBudget,
            ReserveError::InvalidTarget { .. } => IssueCode::InvalidTarget,
            ReserveError::MissingRepresentation => IssueCode::MissingRepresentation,
            _ => return None,
        };
        Some(code)
    }

    pub(crate) fn dimension(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        ReserveError::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}
