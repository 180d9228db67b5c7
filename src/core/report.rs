use crate::config::Config;
use crate::core::conversion::Lookup;
use crate::core::grading::{AssessmentGrades, GradingOutcome, Section};
use crate::error::ValidationError;
use crate::model::{KpiResult, KpiTemplate, KpiUnit, ResultSource};
use colored::Colorize;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }

    fn colored(self) -> String {
        match self {
            Self::Warning => self.as_str().yellow().bold().to_string(),
            Self::Info => self.as_str().blue().bold().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Category {
    Assignment,
    Template,
    Conversion,
    Actual,
    Weight,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assignment => write!(f, "Assignment"),
            Self::Template => write!(f, "Template"),
            Self::Conversion => write!(f, "Conversion"),
            Self::Actual => write!(f, "Actual"),
            Self::Weight => write!(f, "Weight"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub category: Category,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpi: Option<String>,
    pub hint: String,
}

impl Notice {
    pub fn new(
        severity: Severity,
        category: Category,
        title: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            title: title.into(),
            detail: None,
            kpi: None,
            hint: hint.into(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_kpi(mut self, kpi: impl Into<String>) -> Self {
        self.kpi = Some(kpi.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KpiLine {
    pub kpi_id: String,
    pub code: String,
    pub name: String,
    pub unit: KpiUnit,
    pub target: f64,
    pub actual: f64,
    pub weight: f64,
    pub completion_percent: f64,
    pub conversion_percent: f64,
    pub weighted_score: f64,
    pub lookup: Lookup,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ResultSource>,
    pub placeholder: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExitStatus {
    pub ok: bool,
    pub reasons: Vec<String>,
}

impl ExitStatus {
    pub fn reason_line(&self) -> String {
        self.reasons.join("; ")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub result: KpiResult,
    pub lines: Vec<KpiLine>,
    pub weight_sum: f64,
    pub notices: Vec<Notice>,
}

impl Scorecard {
    pub fn has_placeholders(&self) -> bool {
        self.lines.iter().any(|line| line.placeholder)
    }
}

pub fn evaluate_exit(scorecard: &Scorecard, cfg: &Config) -> ExitStatus {
    let mut reasons = Vec::new();

    if cfg.kpi.fail_on_missing_reference && scorecard.has_placeholders() {
        reasons.push("scorecard references KPI templates that do not exist".to_string());
    }

    ExitStatus {
        ok: reasons.is_empty(),
        reasons,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingReport {
    pub employee_code: String,
    pub month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grades: Option<AssessmentGrades>,
    pub errors: Vec<ValidationError>,
}

impl GradingReport {
    pub fn exit(&self) -> ExitStatus {
        let reasons = if self.errors.is_empty() {
            Vec::new()
        } else {
            vec![format!("{} value(s) failed validation", self.errors.len())]
        };
        ExitStatus {
            ok: reasons.is_empty(),
            reasons,
        }
    }
}

pub fn print_scorecard(scorecard: &Scorecard, exit: &ExitStatus) {
    let result = &scorecard.result;
    println!(
        "KPI scorecard: {} ({}){}",
        result.employee_id,
        result.month,
        result
            .department
            .as_ref()
            .map(|department| format!(" - {}", department))
            .unwrap_or_default()
    );
    println!();

    for line in &scorecard.lines {
        let name = if line.placeholder {
            line.name.dimmed().to_string()
        } else {
            line.name.bold().to_string()
        };
        println!("[{}] {} ({})", line.code, name, line.unit);
        println!(
            "  target {} | actual {} | completion {:.2}% | conversion {:.2}% | weight {}% | score {:.2}",
            line.target,
            line.actual,
            line.completion_percent,
            line.conversion_percent,
            line.weight,
            line.weighted_score
        );
    }

    println!();
    println!(
        "Total score: {} (weights sum to {})",
        format!("{:.2}", result.total_score).bold(),
        scorecard.weight_sum
    );
    print_notices(&scorecard.notices);
    print_exit(exit);
}

fn print_notices(notices: &[Notice]) {
    for severity in [Severity::Warning, Severity::Info] {
        let grouped: Vec<&Notice> = notices
            .iter()
            .filter(|notice| notice.severity == severity)
            .collect();

        if grouped.is_empty() {
            continue;
        }

        println!();
        println!("{} ({})", severity.colored(), grouped.len());

        for notice in grouped {
            let kpi = notice
                .kpi
                .as_ref()
                .map(|kpi| format!(" - {}", kpi))
                .unwrap_or_default();
            println!(
                "[{}] ({}) {}{}",
                notice.severity.as_str(),
                notice.category,
                notice.title,
                kpi
            );
            println!("-> hint: {}", notice.hint);
            if let Some(detail) = &notice.detail {
                println!("details: {}", detail);
            }
        }
    }
}

pub fn print_grading(report: &GradingReport) {
    println!(
        "Performance grading: {} ({})",
        report.employee_code, report.month
    );

    if !report.errors.is_empty() {
        println!();
        println!("{} ({})", "INVALID".red().bold(), report.errors.len());
        for error in &report.errors {
            println!("- {}", error);
        }
    }

    if let Some(grades) = &report.grades {
        print_outcome("Self-assessment", &grades.self_review);
        print_outcome("Supervisor assessment", &grades.supervisor);
    }

    print_exit(&report.exit());
}

fn print_outcome(heading: &str, outcome: &GradingOutcome) {
    println!();
    println!("{}", heading.bold());
    for (section, score) in [
        (Section::A, outcome.score_a),
        (Section::B, outcome.score_b),
        (Section::C, outcome.score_c),
    ] {
        println!(
            "  {}. {}: {:.2}/{}",
            section,
            section.title(),
            score,
            section.cap()
        );
    }
    println!("  total {:.2} -> grade {}", outcome.total, outcome.grade.to_string().bold());
}

pub fn print_templates(templates: &[KpiTemplate]) {
    if templates.is_empty() {
        println!("no applicable templates");
        return;
    }

    for template in templates {
        println!(
            "[{}] {} ({}) weight {}% effective {} id={}",
            template.code,
            template.name,
            template.unit,
            template.weight_percent,
            template.effective_month.as_deref().unwrap_or("-"),
            template.id
        );
    }
}

fn print_exit(exit: &ExitStatus) {
    println!();
    if exit.ok {
        println!("exit: OK");
    } else {
        println!("exit: FAILED ({})", exit.reason_line());
    }
}
