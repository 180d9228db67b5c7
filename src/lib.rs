pub mod config;
pub mod core;
pub mod error;
pub mod model;
pub mod utils;

pub use crate::core::conversion::{OverRangePolicy, lookup_conversion};
pub use crate::core::grading::{compute_grading, validate_criterion_value};
pub use crate::core::kpi::{aggregate_total_score, compute_kpi_result};
pub use crate::core::score::Grade;
pub use crate::core::template::resolve_applicable_templates;
pub use crate::error::{ScoringError, ValidationError};
