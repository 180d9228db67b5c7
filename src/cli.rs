use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "hrscore",
    version,
    about = "KPI conversion scoring and performance grading"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a default hrscore.toml in the current directory
    Init,
    /// List the KPI template versions in force for a month
    Templates(TemplatesArgs),
    /// Score an employee's KPIs for a month
    Kpi(KpiArgs),
    /// Validate and grade a performance assessment
    Grade(GradeArgs),
}

#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct TemplatesArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    #[arg(long)]
    pub data: PathBuf,
    #[arg(long)]
    pub month: String,
    /// Return every version with this id or code, ignoring status and month
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct KpiArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    #[arg(long)]
    pub data: PathBuf,
    #[arg(long)]
    pub employee: String,
    #[arg(long)]
    pub month: String,
}

#[derive(Debug, Args, Clone)]
pub struct GradeArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    #[arg(long)]
    pub assessment: PathBuf,
}
