pub mod conversion;
pub mod grading;
pub mod kpi;
pub mod report;
pub mod score;
pub mod template;

use crate::config::Config;
use crate::core::conversion::Lookup;
use crate::core::kpi::{KpiComputation, aggregate_total_score, compute_kpi_result_with_policy};
use crate::core::report::{Category, KpiLine, Notice, Scorecard, Severity};
use crate::error::{ScoringError, ScoringResult};
use crate::model::{
    ConversionTier, Dataset, EmployeeKpiAssignment, KpiActuals, KpiResult, KpiResultEntry,
    KpiTemplate,
};
use crate::utils::month::Month;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub struct MonthContext<'a> {
    pub month: Month,
    pub templates: &'a [KpiTemplate],
    pub tiers: &'a [ConversionTier],
    pub assignment: &'a EmployeeKpiAssignment,
    pub actuals: Option<&'a KpiActuals>,
    pub notices: Vec<Notice>,
}

impl<'a> MonthContext<'a> {
    pub fn build(dataset: &'a Dataset, employee_id: &str, month: &str) -> ScoringResult<Self> {
        let month = Month::parse(month)?;
        let mut notices = Vec::new();

        let assignments: Vec<&EmployeeKpiAssignment> = dataset
            .assignments
            .iter()
            .filter(|assignment| {
                assignment.employee_id == employee_id && same_month(&assignment.month, month)
            })
            .collect();
        let Some(assignment) = assignments.last().copied() else {
            return Err(ScoringError::AssignmentNotFound {
                employee_id: employee_id.to_string(),
                month: month.to_string(),
            });
        };
        if assignments.len() > 1 {
            warn!(employee_id, %month, count = assignments.len(), "duplicate KPI assignments");
            notices.push(
                Notice::new(
                    Severity::Warning,
                    Category::Assignment,
                    "duplicate KPI assignments for employee-month",
                    "remove the stale assignments so only one record exists per employee and month",
                )
                .with_detail(format!(
                    "{} assignments found; the last one was used",
                    assignments.len()
                )),
            );
        }

        let actual_records: Vec<&KpiActuals> = dataset
            .actuals
            .iter()
            .filter(|record| record.employee_id == employee_id && same_month(&record.month, month))
            .collect();
        if actual_records.len() > 1 {
            notices.push(
                Notice::new(
                    Severity::Warning,
                    Category::Actual,
                    "duplicate actual-value records for employee-month",
                    "merge the records so only one set of actuals exists per employee and month",
                )
                .with_detail(format!(
                    "{} records found; the last one was used",
                    actual_records.len()
                )),
            );
        }

        Ok(Self {
            month,
            templates: &dataset.templates,
            tiers: &dataset.tiers,
            assignment,
            actuals: actual_records.last().copied(),
            notices,
        })
    }

    pub fn tiers_for(&self, template: &KpiTemplate) -> Vec<ConversionTier> {
        let by_id: Vec<ConversionTier> = self
            .tiers
            .iter()
            .filter(|tier| tier.kpi_id.as_deref() == Some(template.id.as_str()))
            .cloned()
            .collect();
        if !by_id.is_empty() {
            return by_id;
        }

        self.tiers
            .iter()
            .filter(|tier| tier.kpi_code.as_deref() == Some(template.code.as_str()))
            .cloned()
            .collect()
    }
}

fn same_month(raw: &str, month: Month) -> bool {
    Month::parse(raw).is_ok_and(|parsed| parsed == month)
}

pub fn score_employee_month(
    dataset: &Dataset,
    employee_id: &str,
    month: &str,
    cfg: &Config,
) -> ScoringResult<Scorecard> {
    let mut ctx = MonthContext::build(dataset, employee_id, month)?;
    let mut notices = std::mem::take(&mut ctx.notices);
    let mut lines = Vec::new();
    let mut computations: Vec<KpiComputation> = Vec::new();

    for (kpi_id, assigned) in &ctx.assignment.kpi_values {
        let (template, placeholder) =
            match template::find_template(ctx.templates, kpi_id, ctx.month) {
                Some(template) => (template.clone(), false),
                None => {
                    warn!(kpi = %kpi_id, "KPI template not found; using zero-weight placeholder");
                    notices.push(
                        Notice::new(
                            Severity::Warning,
                            Category::Template,
                            "KPI template not found",
                            "restore the template or remove the KPI from the assignment",
                        )
                        .with_kpi(kpi_id.clone())
                        .with_detail("scored with a zero-weight placeholder"),
                    );
                    (KpiTemplate::placeholder(kpi_id), true)
                }
            };

        let target = match assigned.target {
            Some(target) => target,
            None => {
                notices.push(
                    Notice::new(
                        Severity::Info,
                        Category::Assignment,
                        "assigned KPI has no target",
                        "set a target on the assignment; completion is reported as 0%",
                    )
                    .with_kpi(kpi_id.clone()),
                );
                0.0
            }
        };
        let weight = if placeholder {
            0.0
        } else {
            assigned.weight.unwrap_or(template.weight_percent)
        };

        let recorded = ctx.actuals.and_then(|record| record.values.get(kpi_id));
        if recorded.is_none() {
            notices.push(
                Notice::new(
                    Severity::Info,
                    Category::Actual,
                    "no actual value recorded",
                    "enter or import the actual value for this KPI",
                )
                .with_kpi(kpi_id.clone()),
            );
        }
        let actual = recorded.map(|value| value.actual).unwrap_or(0.0);
        let source = recorded.and_then(|value| value.source);

        let tiers = ctx.tiers_for(&template);
        let computation =
            compute_kpi_result_with_policy(actual, target, weight, &tiers, cfg.kpi.over_range);
        match computation.lookup {
            Lookup::ClampedToTop => notices.push(
                Notice::new(
                    Severity::Info,
                    Category::Conversion,
                    "completion above every conversion tier",
                    "extend the tier table if over-achievement should pay more",
                )
                .with_kpi(kpi_id.clone())
                .with_detail(format!(
                    "{:.2}% clamped to the top tier",
                    computation.completion_percent
                )),
            ),
            Lookup::OutOfRange => notices.push(
                Notice::new(
                    Severity::Warning,
                    Category::Conversion,
                    "completion not covered by any conversion tier",
                    "close gaps in the tier table so every completion level converts",
                )
                .with_kpi(kpi_id.clone())
                .with_detail(format!(
                    "{:.2}% converted to 0",
                    computation.completion_percent
                )),
            ),
            Lookup::PassThrough | Lookup::Matched => {}
        }

        debug!(
            kpi = %kpi_id,
            target,
            actual,
            weight,
            completion = computation.completion_percent,
            conversion = computation.conversion_percent,
            weighted = computation.weighted_score,
            "scored KPI"
        );

        lines.push(KpiLine {
            kpi_id: kpi_id.clone(),
            code: template.code.clone(),
            name: template.name.clone(),
            unit: template.unit,
            target,
            actual,
            weight,
            completion_percent: computation.completion_percent,
            conversion_percent: computation.conversion_percent,
            weighted_score: computation.weighted_score,
            lookup: computation.lookup,
            source,
            placeholder,
        });
        computations.push(computation);
    }

    let weight_sum: f64 = lines.iter().map(|line| line.weight).sum();
    if cfg.kpi.warn_weight_mismatch && !lines.is_empty() && (weight_sum - 100.0).abs() > 1e-6 {
        notices.push(
            Notice::new(
                Severity::Warning,
                Category::Weight,
                "assigned weights do not sum to 100",
                "adjust the assignment weights; totals are not normalized",
            )
            .with_detail(format!("weights sum to {}", weight_sum)),
        );
    }

    sort_notices(&mut notices);

    let kpi_results: BTreeMap<String, KpiResultEntry> = lines
        .iter()
        .map(|line| {
            (
                line.kpi_id.clone(),
                KpiResultEntry {
                    target: line.target,
                    actual: line.actual,
                    completion_percent: line.completion_percent,
                    conversion_percent: line.conversion_percent,
                    weight: line.weight,
                    weighted_score: line.weighted_score,
                    source: line.source,
                },
            )
        })
        .collect();

    Ok(Scorecard {
        result: KpiResult {
            employee_id: employee_id.to_string(),
            month: ctx.month.to_string(),
            department: ctx.actuals.and_then(|record| record.department.clone()),
            kpi_results,
            total_score: aggregate_total_score(&computations),
        },
        lines,
        weight_sum,
        notices,
    })
}

fn sort_notices(notices: &mut [Notice]) {
    notices.sort_by(|a, b| {
        severity_rank(a.severity)
            .cmp(&severity_rank(b.severity))
            .then(a.category.to_string().cmp(&b.category.to_string()))
            .then(a.kpi.cmp(&b.kpi))
            .then(a.title.cmp(&b.title))
    });
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Warning => 0,
        Severity::Info => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ActualValue, AssignedKpi, AssignmentStatus, KpiUnit, ResultSource, TemplateStatus,
    };

    fn template(id: &str, code: &str, weight: f64, month: &str) -> KpiTemplate {
        KpiTemplate {
            id: id.to_string(),
            code: code.to_string(),
            name: format!("{code} name"),
            unit: KpiUnit::Currency,
            weight_percent: weight,
            effective_month: Some(month.to_string()),
            status: TemplateStatus::Active,
        }
    }

    fn assignment(
        employee: &str,
        month: &str,
        values: &[(&str, Option<f64>, Option<f64>)],
    ) -> EmployeeKpiAssignment {
        EmployeeKpiAssignment {
            employee_id: employee.to_string(),
            month: month.to_string(),
            status: AssignmentStatus::Draft,
            kpi_values: values
                .iter()
                .map(|(id, target, weight)| {
                    (
                        id.to_string(),
                        AssignedKpi {
                            target: *target,
                            weight: *weight,
                        },
                    )
                })
                .collect(),
        }
    }

    fn actuals(employee: &str, month: &str, values: &[(&str, f64)]) -> KpiActuals {
        KpiActuals {
            employee_id: employee.to_string(),
            month: month.to_string(),
            department: Some("Sales".to_string()),
            values: values
                .iter()
                .map(|(id, actual)| {
                    (
                        id.to_string(),
                        ActualValue {
                            actual: *actual,
                            source: Some(ResultSource::Manual),
                        },
                    )
                })
                .collect(),
        }
    }

    fn revenue_dataset() -> Dataset {
        Dataset {
            templates: vec![
                template("m1", "KPI-M1", 50.0, "2024-01"),
                template("m2", "KPI-M2", 50.0, "2024-01"),
            ],
            tiers: vec![
                ConversionTier::new(0.0, Some(50.0), 30.0).for_kpi("m1"),
                ConversionTier::new(50.0, Some(100.0), 90.0).for_kpi("m1"),
                ConversionTier::new(100.0, None, 110.0).for_kpi("m1"),
            ],
            assignments: vec![assignment(
                "E1",
                "2024-08",
                &[
                    ("m1", Some(500_000_000.0), Some(50.0)),
                    ("m2", Some(100.0), Some(50.0)),
                ],
            )],
            actuals: vec![actuals(
                "E1",
                "2024-08",
                &[("m1", 520_000_000.0), ("m2", 60.0)],
            )],
        }
    }

    #[test]
    fn scores_employee_month_end_to_end() {
        let scorecard =
            score_employee_month(&revenue_dataset(), "E1", "2024-08", &Config::default()).unwrap();

        let revenue = &scorecard.result.kpi_results["m1"];
        assert_eq!(revenue.completion_percent, 104.0);
        assert_eq!(revenue.conversion_percent, 110.0);
        assert_eq!(revenue.weighted_score, 55.0);

        let second = &scorecard.result.kpi_results["m2"];
        assert_eq!(second.conversion_percent, 60.0);
        assert_eq!(second.weighted_score, 30.0);

        assert_eq!(scorecard.result.total_score, 85.0);
        assert_eq!(scorecard.weight_sum, 100.0);
        assert_eq!(scorecard.result.department.as_deref(), Some("Sales"));
        assert!(scorecard.notices.is_empty());
    }

    #[test]
    fn linked_assignment_values_win_over_template() {
        let mut dataset = revenue_dataset();
        dataset.assignments[0].kpi_values.insert(
            "m2".to_string(),
            AssignedKpi {
                target: Some(200.0),
                weight: None,
            },
        );
        dataset.templates[1].weight_percent = 40.0;

        let scorecard =
            score_employee_month(&dataset, "E1", "2024-08", &Config::default()).unwrap();
        let second = &scorecard.result.kpi_results["m2"];
        assert_eq!(second.target, 200.0);
        assert_eq!(second.weight, 40.0);
        assert_eq!(second.completion_percent, 30.0);
        assert!(
            scorecard
                .notices
                .iter()
                .any(|notice| notice.category == Category::Weight)
        );
    }

    #[test]
    fn missing_template_uses_placeholder_and_continues() {
        let mut dataset = revenue_dataset();
        dataset.assignments[0].kpi_values.insert(
            "ghost".to_string(),
            AssignedKpi {
                target: Some(10.0),
                weight: None,
            },
        );

        let scorecard =
            score_employee_month(&dataset, "E1", "2024-08", &Config::default()).unwrap();
        let ghost = scorecard
            .lines
            .iter()
            .find(|line| line.kpi_id == "ghost")
            .unwrap();

        assert!(ghost.placeholder);
        assert_eq!(ghost.name, "KPI: ghost");
        assert_eq!(ghost.weighted_score, 0.0);
        assert_eq!(scorecard.result.total_score, 85.0);
        assert!(scorecard.has_placeholders());
        assert!(
            scorecard
                .notices
                .iter()
                .any(|notice| notice.category == Category::Template)
        );
    }

    #[test]
    fn placeholder_ignores_linked_weight() {
        let mut dataset = revenue_dataset();
        dataset.assignments[0].kpi_values.insert(
            "ghost".to_string(),
            AssignedKpi {
                target: Some(100.0),
                weight: Some(50.0),
            },
        );
        dataset.actuals[0].values.insert(
            "ghost".to_string(),
            ActualValue {
                actual: 300.0,
                source: Some(ResultSource::Manual),
            },
        );

        let scorecard =
            score_employee_month(&dataset, "E1", "2024-08", &Config::default()).unwrap();
        let ghost = &scorecard.result.kpi_results["ghost"];

        assert_eq!(ghost.completion_percent, 300.0);
        assert_eq!(ghost.weight, 0.0);
        assert_eq!(ghost.weighted_score, 0.0);
        assert_eq!(scorecard.result.total_score, 85.0);
        assert_eq!(scorecard.weight_sum, 100.0);
        assert!(
            !scorecard
                .notices
                .iter()
                .any(|notice| notice.category == Category::Weight)
        );
    }

    #[test]
    fn missing_assignment_is_an_error() {
        let err = score_employee_month(&revenue_dataset(), "E2", "2024-08", &Config::default())
            .unwrap_err();
        assert_eq!(
            err,
            ScoringError::AssignmentNotFound {
                employee_id: "E2".to_string(),
                month: "2024-08".to_string(),
            }
        );

        assert!(matches!(
            score_employee_month(&revenue_dataset(), "E1", "August", &Config::default()),
            Err(ScoringError::InvalidMonth { .. })
        ));
    }

    #[test]
    fn duplicate_assignments_use_the_last_one() {
        let mut dataset = revenue_dataset();
        dataset.assignments.push(assignment(
            "E1",
            "2024-8",
            &[("m1", Some(1_000_000_000.0), Some(100.0))],
        ));

        let scorecard =
            score_employee_month(&dataset, "E1", "2024-08", &Config::default()).unwrap();
        assert_eq!(scorecard.lines.len(), 1);
        assert_eq!(scorecard.result.kpi_results["m1"].completion_percent, 52.0);
        assert_eq!(scorecard.result.kpi_results["m1"].conversion_percent, 90.0);
        assert_eq!(scorecard.notices[0].category, Category::Assignment);
    }

    #[test]
    fn missing_target_and_actual_score_zero() {
        let mut dataset = revenue_dataset();
        dataset.assignments[0].kpi_values.insert(
            "m2".to_string(),
            AssignedKpi {
                target: None,
                weight: Some(50.0),
            },
        );
        dataset.actuals.clear();

        let scorecard =
            score_employee_month(&dataset, "E1", "2024-08", &Config::default()).unwrap();
        assert_eq!(scorecard.result.kpi_results["m2"].completion_percent, 0.0);
        assert_eq!(scorecard.result.department, None);
        assert!(
            scorecard
                .notices
                .iter()
                .any(|notice| notice.category == Category::Actual)
        );
    }

    #[test]
    fn tiers_fall_back_to_code_and_follow_policy() {
        let mut dataset = revenue_dataset();
        dataset.tiers = vec![
            ConversionTier::new(0.0, Some(50.0), 30.0).for_code("KPI-M1"),
            ConversionTier::new(50.0, Some(100.0), 90.0).for_code("KPI-M1"),
        ];

        let clamped =
            score_employee_month(&dataset, "E1", "2024-08", &Config::default()).unwrap();
        assert_eq!(clamped.result.kpi_results["m1"].conversion_percent, 90.0);
        assert_eq!(clamped.lines[0].lookup, Lookup::ClampedToTop);

        let mut cfg = Config::default();
        cfg.kpi.over_range = conversion::OverRangePolicy::Zero;
        let zeroed = score_employee_month(&dataset, "E1", "2024-08", &cfg).unwrap();
        assert_eq!(zeroed.result.kpi_results["m1"].conversion_percent, 0.0);
        assert_eq!(zeroed.notices[0].category, Category::Conversion);
        assert_eq!(zeroed.notices[0].severity, Severity::Warning);
    }
}
