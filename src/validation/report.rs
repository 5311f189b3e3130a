//! Collected validation results.
//!
//! The builders stop at the first failing check; [`super::validate_problem`]
//! keeps going and records every failure here, so a problem file can be
//! fixed in one pass. The report serialises to JSON for `validate --output json`.

use serde::Serialize;
use std::fmt;

use crate::error::ReserveError;

/// Every issue found while validating one problem, in discovery order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Records a construction error. Errors that carry no issue code (IO,
    /// parsing) are filed under [`IssueCode::UnsupportedInputType`].
    pub fn add_error(&mut self, error: &ReserveError) {
        self.issues.push(ValidationIssue::from_error(error));
    }

    /// Issues of the given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn error_count(&self) -> usize {
        self.with_severity(Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.with_severity(Severity::Warning).count()
    }

    /// True when nothing would stop the model from being built.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// True when there are neither errors nor warnings.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    /// Pretty JSON with the error and warning counts ahead of the issues.
    pub fn to_json_string(&self) -> Result<String, ReserveError> {
        let value = serde_json::json!({
            "error_count": self.error_count(),
            "warning_count": self.warning_count(),
            "issues": &self.issues,
        });
        serde_json::to_string_pretty(&value).map_err(ReserveError::ReportJsonWrite)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Found {} error(s) and {} warning(s)",
            self.error_count(),
            self.warning_count()
        )?;
        // errors first, each group in discovery order
        for severity in [Severity::Error, Severity::Warning] {
            for issue in self.with_severity(severity) {
                writeln!(f, "  {}", issue)?;
            }
        }
        Ok(())
    }
}

/// One failing (or suspicious) condition.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Stable machine-readable kind.
    pub code: IssueCode,
    pub message: String,
    /// Which planning unit, feature, or matrix cell is affected.
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message, context)
        }
    }

    /// Lifts a construction error into an error-level issue, keeping the
    /// planning unit or feature it names as context.
    pub fn from_error(error: &ReserveError) -> Self {
        let context = match error {
            ReserveError::InvalidCost { planning_unit, .. } => IssueContext::PlanningUnit {
                id: planning_unit.get(),
            },
            ReserveError::InfeasibleTarget { feature, .. }
            | ReserveError::InvalidTarget { feature, .. } => {
                IssueContext::Feature { id: feature.get() }
            }
            ReserveError::NonFiniteRepresentation {
                feature,
                planning_unit,
                ..
            }
            | ReserveError::NegativeRepresentation {
                feature,
                planning_unit,
                ..
            } => IssueContext::Cell {
                feature: feature.get(),
                planning_unit: planning_unit.get(),
            },
            _ => IssueContext::Model,
        };
        Self::error(
            error.code().unwrap_or(IssueCode::UnsupportedInputType),
            error.to_string(),
            context,
        )
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{:?}] {}: {}",
            self.severity, self.code, self.context, self.message
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The model can still be built, but the input looks wrong.
    Warning,
    /// The model cannot be built.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Stable issue kinds, for filtering and programmatic handling.
///
/// Construction errors map onto these through [`ReserveError::code`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    // input shape
    UnsupportedInputType,
    MalformedTable,
    DimensionMismatch,
    MissingRepresentation,

    // values
    InvalidCost,
    InvalidBudget,
    InvalidTarget,
    NonFiniteRepresentation,
    NegativeRepresentation,

    // locks
    InvalidLockSet,
    /// Warning: a locked unit was dropped because its cost is missing.
    LockedUnitExcluded,

    // feasibility
    InfeasibleBudget,
    InfeasibleTarget,
    /// Warning: a feature has zero total representation.
    ZeroRepresentation,
}

/// Where an issue was found. Ids are 1-based, planning units in the
/// original (pre-exclusion) numbering.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueContext {
    Model,
    PlanningUnit { id: usize },
    Feature { id: usize },
    Cell { feature: usize, planning_unit: usize },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Model => f.write_str("model"),
            IssueContext::PlanningUnit { id } => write!(f, "planning unit {id}"),
            IssueContext::Feature { id } => write!(f, "feature {id}"),
            IssueContext::Cell {
                feature,
                planning_unit,
            } => write!(f, "feature {feature} / planning unit {planning_unit}"),
        }
    }
}
