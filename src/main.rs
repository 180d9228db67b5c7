mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, CommonArgs, GradeArgs, KpiArgs, TemplatesArgs};
use hrscore::config::{self, Config};
use hrscore::core::grading::{self, Rubric};
use hrscore::core::report::{self, GradingReport};
use hrscore::core::template;
use hrscore::model::{Dataset, PerformanceAssessment};
use hrscore::utils::fs::read_json;
use hrscore::utils::month::Month;
use tracing_subscriber::EnvFilter;

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let path = std::env::current_dir()?.join(config::CONFIG_FILE_NAME);
            config::write_default_config(&path)?;
            println!("created {}", path.display());
            Ok(0)
        }
        Commands::Templates(args) => run_templates(args),
        Commands::Kpi(args) => run_kpi(args),
        Commands::Grade(args) => run_grade(args),
    }
}

fn prepare(common: &CommonArgs) -> Result<Config> {
    let cwd = std::env::current_dir()?;
    let config = config::load_config(common.config.as_deref(), &cwd)?;
    init_logging(&config.general.log_level);
    Ok(config)
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_templates(args: TemplatesArgs) -> Result<i32> {
    let config = prepare(&args.common)?;
    let dataset: Dataset = read_json(&args.data)?;
    let month = Month::parse(&args.month)?;
    let templates =
        template::resolve_applicable_templates(&dataset.templates, month, args.id.as_deref());

    if args.common.json || config.general.json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
    } else {
        report::print_templates(&templates);
    }
    Ok(0)
}

fn run_kpi(args: KpiArgs) -> Result<i32> {
    let config = prepare(&args.common)?;
    let dataset: Dataset = read_json(&args.data)?;
    let scorecard =
        hrscore::core::score_employee_month(&dataset, &args.employee, &args.month, &config)?;
    let exit = report::evaluate_exit(&scorecard, &config);

    if args.common.json || config.general.json {
        println!("{}", serde_json::to_string_pretty(&scorecard)?);
    } else {
        report::print_scorecard(&scorecard, &exit);
    }

    if exit.ok { Ok(0) } else { Ok(1) }
}

fn run_grade(args: GradeArgs) -> Result<i32> {
    let config = prepare(&args.common)?;
    let assessment: PerformanceAssessment = read_json(&args.assessment)?;
    let rubric = Rubric::standard();

    let errors = grading::validate_assessment(&assessment, &rubric);
    let grades = errors
        .is_empty()
        .then(|| grading::grade_assessment(&assessment, &rubric));
    let graded = GradingReport {
        employee_code: assessment.employee_code.clone(),
        month: assessment.month.clone(),
        grades,
        errors,
    };

    if args.common.json || config.general.json {
        println!("{}", serde_json::to_string_pretty(&graded)?);
    } else {
        report::print_grading(&graded);
    }

    if graded.exit().ok { Ok(0) } else { Ok(1) }
}
