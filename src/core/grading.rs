//! Monthly performance grading.
//!
//! The rubric has three fixed sections: A deducts labor-discipline violations
//! from 20, B adds work-effectiveness points up to 80, and C adds bonus points
//! up to 15. Self and supervisor assessments are graded independently.

use crate::core::score::{Grade, grade_for_total, round2};
use crate::error::{AssessmentSide, Bound, ValidationError};
use crate::model::PerformanceAssessment;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

pub const SECTION_A_CAP: f64 = 20.0;
pub const SECTION_B_CAP: f64 = 80.0;
pub const SECTION_C_CAP: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Section {
    A,
    B,
    C,
}

impl Section {
    pub fn cap(self) -> f64 {
        match self {
            Self::A => SECTION_A_CAP,
            Self::B => SECTION_B_CAP,
            Self::C => SECTION_C_CAP,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::A => "Labor discipline (deductions)",
            Self::B => "Work effectiveness",
            Self::C => "Bonus and commendations",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CriterionRange {
    Range { min: f64, max: f64 },
    /// Header or rollup row; accepts `0..=max_score` but never feeds a subtotal.
    MaxScore(f64),
}

impl CriterionRange {
    pub fn min(self) -> f64 {
        match self {
            Self::Range { min, .. } => min,
            Self::MaxScore(_) => 0.0,
        }
    }

    pub fn max(self) -> f64 {
        match self {
            Self::Range { max, .. } => max,
            Self::MaxScore(max) => max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    pub id: &'static str,
    pub label: &'static str,
    pub section: Section,
    pub range: CriterionRange,
}

impl Criterion {
    const fn leaf(id: &'static str, label: &'static str, section: Section, max: f64) -> Self {
        Self {
            id,
            label,
            section,
            range: CriterionRange::Range { min: 0.0, max },
        }
    }

    const fn header(id: &'static str, label: &'static str, section: Section, max: f64) -> Self {
        Self {
            id,
            label,
            section,
            range: CriterionRange::MaxScore(max),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.range, CriterionRange::Range { .. })
    }
}

const STANDARD_CRITERIA: &[Criterion] = &[
    Criterion::header("A", "Labor discipline", Section::A, SECTION_A_CAP),
    Criterion::leaf("A1", "Late arrival or early departure", Section::A, 5.0),
    Criterion::leaf("A2", "Unexcused absence", Section::A, 10.0),
    Criterion::leaf("A3", "Dress code and workplace conduct", Section::A, 5.0),
    Criterion::leaf("A4", "Breach of internal regulations", Section::A, 10.0),
    Criterion::leaf("A5", "Occupational safety violations", Section::A, 20.0),
    Criterion::header("B", "Work effectiveness", Section::B, SECTION_B_CAP),
    Criterion::leaf("B1", "Volume of assigned work completed", Section::B, 30.0),
    Criterion::leaf("B2", "Quality of work", Section::B, 25.0),
    Criterion::leaf("B3", "Timeliness", Section::B, 15.0),
    Criterion::leaf("B4", "Teamwork and coordination", Section::B, 10.0),
    Criterion::header("C", "Bonus points", Section::C, SECTION_C_CAP),
    Criterion::leaf("C1", "Initiatives and process improvements", Section::C, 10.0),
    Criterion::leaf("C2", "Commendations received", Section::C, 5.0),
    Criterion::leaf("C3", "Additional assignments", Section::C, 5.0),
];

#[derive(Debug, Clone)]
pub struct Rubric {
    criteria: Vec<Criterion>,
}

impl Default for Rubric {
    fn default() -> Self {
        Self::standard()
    }
}

impl Rubric {
    pub fn standard() -> Self {
        Self::new(STANDARD_CRITERIA.to_vec())
    }

    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn get(&self, id: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|criterion| criterion.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingOutcome {
    pub score_a: f64,
    pub score_b: f64,
    pub score_c: f64,
    pub total: f64,
    pub grade: Grade,
}

pub fn compute_grading(
    section_a_items: &[f64],
    section_b_items: &[f64],
    section_c_items: &[f64],
) -> GradingOutcome {
    let deductions = round2(section_a_items.iter().sum());
    let score_a = (SECTION_A_CAP - deductions).clamp(0.0, SECTION_A_CAP);
    let score_b = round2(section_b_items.iter().sum()).clamp(0.0, SECTION_B_CAP);
    let score_c = round2(section_c_items.iter().sum()).clamp(0.0, SECTION_C_CAP);
    let total = round2(score_a + score_b + score_c);

    GradingOutcome {
        score_a,
        score_b,
        score_c,
        total,
        grade: grade_for_total(total),
    }
}

pub fn grade_scores(values: &BTreeMap<String, f64>, rubric: &Rubric) -> GradingOutcome {
    let mut items: BTreeMap<Section, Vec<f64>> = BTreeMap::new();
    for (id, value) in values {
        match rubric.get(id) {
            Some(criterion) if criterion.is_leaf() => {
                items.entry(criterion.section).or_default().push(*value);
            }
            Some(_) => debug!(criterion = %id, "header row ignored in subtotal"),
            None => debug!(criterion = %id, "unknown criterion ignored in subtotal"),
        }
    }

    let section = |section: Section| items.get(&section).cloned().unwrap_or_default();
    compute_grading(&section(Section::A), &section(Section::B), &section(Section::C))
}

pub fn validate_criterion_value(value: f64, criterion: &Criterion) -> Result<(), ValidationError> {
    let bound = if value < criterion.range.min() {
        Bound::Min(criterion.range.min())
    } else if value > criterion.range.max() {
        Bound::Max(criterion.range.max())
    } else {
        return Ok(());
    };

    Err(ValidationError {
        criterion_id: criterion.id.to_string(),
        label: criterion.label.to_string(),
        side: None,
        value,
        bound,
    })
}

pub fn validate_assessment(
    assessment: &PerformanceAssessment,
    rubric: &Rubric,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (side, values) in [
        (AssessmentSide::SelfReview, &assessment.self_assessment),
        (AssessmentSide::Supervisor, &assessment.supervisor_assessment),
    ] {
        for (id, value) in values {
            let checked = match rubric.get(id) {
                Some(criterion) => validate_criterion_value(*value, criterion),
                None => Err(ValidationError {
                    criterion_id: id.clone(),
                    label: id.clone(),
                    side: None,
                    value: *value,
                    bound: Bound::Unknown,
                }),
            };
            if let Err(err) = checked {
                errors.push(err.with_side(side));
            }
        }
    }
    errors
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentGrades {
    #[serde(rename = "self")]
    pub self_review: GradingOutcome,
    pub supervisor: GradingOutcome,
}

pub fn grade_assessment(assessment: &PerformanceAssessment, rubric: &Rubric) -> AssessmentGrades {
    AssessmentGrades {
        self_review: grade_scores(&assessment.self_assessment, rubric),
        supervisor: grade_scores(&assessment.supervisor_assessment, rubric),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssessmentStatus;

    fn values(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(id, value)| (id.to_string(), *value))
            .collect()
    }

    #[test]
    fn deductions_floor_at_zero() {
        let outcome = compute_grading(&[10.0, 10.0, 5.0], &[], &[]);
        assert_eq!(outcome.score_a, 0.0);
        assert_eq!(outcome.total, 0.0);
        assert_eq!(outcome.grade, Grade::D);
    }

    #[test]
    fn sections_clamp_to_caps() {
        let outcome = compute_grading(&[], &[30.0, 25.0, 15.0, 10.0, 5.0], &[10.0, 5.0, 5.0]);
        assert_eq!(outcome.score_a, 20.0);
        assert_eq!(outcome.score_b, 80.0);
        assert_eq!(outcome.score_c, 15.0);
        assert_eq!(outcome.total, 115.0);
        assert_eq!(outcome.grade, Grade::A1);
    }

    #[test]
    fn full_marks_without_bonus_is_grade_a() {
        let outcome = compute_grading(&[], &[30.0, 25.0, 15.0, 10.0], &[]);
        assert_eq!(outcome.total, 100.0);
        assert_eq!(outcome.grade, Grade::A);
    }

    #[test]
    fn grade_scores_partitions_by_section() {
        let rubric = Rubric::standard();
        let outcome = grade_scores(
            &values(&[
                ("A1", 2.0),
                ("A2", 3.0),
                ("B1", 25.0),
                ("B2", 20.0),
                ("B3", 10.0),
                ("C1", 4.0),
                ("B", 80.0),
                ("Z9", 50.0),
            ]),
            &rubric,
        );

        assert_eq!(outcome.score_a, 15.0);
        assert_eq!(outcome.score_b, 55.0);
        assert_eq!(outcome.score_c, 4.0);
        assert_eq!(outcome.total, 74.0);
        assert_eq!(outcome.grade, Grade::C);
    }

    #[test]
    fn validation_reports_each_violation() {
        let rubric = Rubric::new(vec![
            Criterion::leaf("X1", "Ten point item", Section::B, 10.0),
            Criterion::leaf("X2", "Another item", Section::B, 20.0),
        ]);
        let assessment = PerformanceAssessment {
            employee_code: "NV01".to_string(),
            month: "2024-08".to_string(),
            self_assessment: values(&[("X1", 25.0)]),
            supervisor_assessment: values(&[("X2", -3.0)]),
            ..PerformanceAssessment::default()
        };

        let errors = validate_assessment(&assessment, &rubric);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].criterion_id, "X1");
        assert_eq!(errors[0].side, Some(AssessmentSide::SelfReview));
        assert_eq!(errors[0].bound, Bound::Max(10.0));
        assert_eq!(errors[1].criterion_id, "X2");
        assert_eq!(errors[1].side, Some(AssessmentSide::Supervisor));
        assert_eq!(errors[1].bound, Bound::Min(0.0));
        assert!(errors[0].to_string().contains("Ten point item"));
    }

    #[test]
    fn unknown_criteria_fail_validation() {
        let assessment = PerformanceAssessment {
            self_assessment: values(&[("Q7", 1.0)]),
            ..PerformanceAssessment::default()
        };
        let errors = validate_assessment(&assessment, &Rubric::standard());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].bound, Bound::Unknown);
    }

    #[test]
    fn header_rows_validate_against_max_score() {
        let rubric = Rubric::standard();
        let header = rubric.get("C").unwrap();
        assert!(validate_criterion_value(15.0, header).is_ok());
        assert!(validate_criterion_value(16.0, header).is_err());
    }

    #[test]
    fn grading_ignores_status_and_keeps_sides_apart() {
        let assessment = PerformanceAssessment {
            employee_code: "NV01".to_string(),
            month: "2024-08".to_string(),
            status: AssessmentStatus::Approved,
            self_assessment: values(&[("B1", 30.0), ("B2", 25.0), ("B3", 15.0), ("C1", 6.0)]),
            supervisor_assessment: values(&[("A2", 10.0), ("B1", 20.0), ("B2", 20.0)]),
            ..PerformanceAssessment::default()
        };

        let grades = grade_assessment(&assessment, &Rubric::standard());
        assert_eq!(grades.self_review.total, 96.0);
        assert_eq!(grades.self_review.grade, Grade::A);
        assert_eq!(grades.supervisor.total, 50.0);
        assert_eq!(grades.supervisor.grade, Grade::D);
    }
}
