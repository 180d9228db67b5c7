use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub type ScoringResult<T> = Result<T, ScoringError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("invalid month `{value}` (expected YYYY-MM)")]
    InvalidMonth { value: String },

    #[error("no KPI assignment found for employee {employee_id} in {month}")]
    AssignmentNotFound { employee_id: String, month: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentSide {
    #[serde(rename = "self")]
    SelfReview,
    Supervisor,
}

impl fmt::Display for AssessmentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfReview => write!(f, "self-assessment"),
            Self::Supervisor => write!(f, "supervisor assessment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "limit", rename_all = "lowercase")]
pub enum Bound {
    Min(f64),
    Max(f64),
    /// The criterion id is not part of the rubric.
    Unknown,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min(limit) => write!(f, "must be at least {limit}"),
            Self::Max(limit) => write!(f, "must be at most {limit}"),
            Self::Unknown => write!(f, "is not a rubric criterion"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{}{label} ({criterion_id}) = {value} {bound}", side_prefix(.side))]
pub struct ValidationError {
    pub criterion_id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<AssessmentSide>,
    pub value: f64,
    pub bound: Bound,
}

fn side_prefix(side: &Option<AssessmentSide>) -> String {
    side.map(|side| format!("{side}: ")).unwrap_or_default()
}

impl ValidationError {
    pub fn with_side(mut self, side: AssessmentSide) -> Self {
        self.side = Some(side);
        self
    }
}
