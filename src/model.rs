use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KpiUnit {
    Currency,
    #[default]
    Percent,
    Count,
    Lead,
    Hour,
}

impl fmt::Display for KpiUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Currency => write!(f, "currency"),
            Self::Percent => write!(f, "percent"),
            Self::Count => write!(f, "count"),
            Self::Lead => write!(f, "lead"),
            Self::Hour => write!(f, "hour"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiTemplate {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: KpiUnit,
    #[serde(default)]
    pub weight_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_month: Option<String>,
    #[serde(default)]
    pub status: TemplateStatus,
}

impl KpiTemplate {
    pub fn placeholder(key: &str) -> Self {
        Self {
            id: key.to_string(),
            code: key.to_string(),
            name: format!("KPI: {key}"),
            unit: KpiUnit::default(),
            weight_percent: 0.0,
            effective_month: None,
            status: TemplateStatus::Inactive,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TemplateStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_code: Option<String>,
    pub from_percent: f64,
    /// `None` leaves the tier open-ended upwards.
    #[serde(default)]
    pub to_percent: Option<f64>,
    pub conversion_percent: f64,
}

impl ConversionTier {
    pub fn new(from_percent: f64, to_percent: Option<f64>, conversion_percent: f64) -> Self {
        Self {
            kpi_id: None,
            kpi_code: None,
            from_percent,
            to_percent,
            conversion_percent,
        }
    }

    pub fn for_kpi(mut self, kpi_id: impl Into<String>) -> Self {
        self.kpi_id = Some(kpi_id.into());
        self
    }

    pub fn for_code(mut self, kpi_code: impl Into<String>) -> Self {
        self.kpi_code = Some(kpi_code.into());
        self
    }

    pub fn upper_bound(&self) -> f64 {
        self.to_percent.unwrap_or(f64::INFINITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Draft,
    Finalized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssignedKpi {
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeKpiAssignment {
    pub employee_id: String,
    pub month: String,
    #[serde(default)]
    pub status: AssignmentStatus,
    #[serde(default)]
    pub kpi_values: BTreeMap<String, AssignedKpi>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Manual,
    Import,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualValue {
    pub actual: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ResultSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiActuals {
    pub employee_id: String,
    pub month: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, ActualValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiResultEntry {
    pub target: f64,
    pub actual: f64,
    pub completion_percent: f64,
    pub conversion_percent: f64,
    pub weight: f64,
    pub weighted_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ResultSource>,
}

/// Scored results for one employee-month. `target` and `weight` are the linked
/// assignment values in force when the result was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiResult {
    pub employee_id: String,
    pub month: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub kpi_results: BTreeMap<String, KpiResultEntry>,
    pub total_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Dataset {
    pub templates: Vec<KpiTemplate>,
    pub tiers: Vec<ConversionTier>,
    pub assignments: Vec<EmployeeKpiAssignment>,
    pub actuals: Vec<KpiActuals>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
}

impl AssessmentStatus {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::Submitted),
            Self::Submitted => Some(Self::Approved),
            Self::Approved => None,
        }
    }

    pub fn can_edit_self_assessment(self) -> bool {
        self == Self::Draft
    }

    pub fn can_edit_supervisor_assessment(self, reviewer_code: &str, owner_code: &str) -> bool {
        self == Self::Submitted && reviewer_code != owner_code
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceAssessment {
    pub employee_code: String,
    pub month: String,
    pub status: AssessmentStatus,
    pub self_assessment: BTreeMap<String, f64>,
    pub supervisor_assessment: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor_comment: Option<String>,
}
