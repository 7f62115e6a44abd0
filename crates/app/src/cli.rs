use clap::{Args, Parser, Subcommand, ValueEnum};
use valley_core::model::{SubjectId, Theme};

use crate::config::DEFAULT_DB_URL;

/// Top-level CLI parser for the `study-valley` binary.
#[derive(Debug, Parser)]
#[command(
    name = "study-valley",
    version,
    about = "Study Valley - log study hours toward your learning goals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database URL or file path
    #[arg(long, global = true, env = "VALLEY_DB_URL", default_value = DEFAULT_DB_URL)]
    pub db: String,

    /// Keep everything in memory for this run
    #[arg(long, global = true)]
    pub memory: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Theme used until one has been saved
    #[arg(long, global = true, env = "VALLEY_THEME_DEFAULT", default_value = "light")]
    pub theme_default: Theme,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List subjects with their progress.
    List,
    /// Show one subject in detail.
    Show { id: SubjectId },
    /// Create a subject.
    Create(CreateArgs),
    /// Edit a subject; omitted fields keep their current values.
    Edit(EditArgs),
    /// Log study time on a subject.
    AddTime(AddTimeArgs),
    /// Delete a subject.
    Remove { id: SubjectId },
    /// Show or change the theme preference.
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
    /// List the available colors and icons.
    Catalog,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,
    /// Goal in hours
    #[arg(long)]
    pub target: f64,
    /// Hex color, e.g. #A7E9AF
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub icon: Option<String>,
    /// Level marker as LABEL=HOURS; repeatable
    #[arg(long = "marker", value_parser = parse_marker)]
    pub markers: Vec<MarkerArg>,
    /// Start without the default level marker
    #[arg(long, conflicts_with = "markers")]
    pub no_markers: bool,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: SubjectId,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub target: Option<f64>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub icon: Option<String>,
    /// Replace the level markers; repeatable LABEL=HOURS
    #[arg(long = "marker", value_parser = parse_marker)]
    pub markers: Vec<MarkerArg>,
    /// Remove all level markers
    #[arg(long, conflicts_with = "markers")]
    pub clear_markers: bool,
}

#[derive(Debug, Args)]
pub struct AddTimeArgs {
    pub id: SubjectId,
    /// Custom amount in hours
    #[arg(
        allow_negative_numbers = true,
        required_unless_present_any = ["half_hour", "hour"],
        conflicts_with_all = ["half_hour", "hour"]
    )]
    pub hours: Option<String>,
    /// Log 30 minutes
    #[arg(long, conflicts_with = "hour")]
    pub half_hour: bool,
    /// Log one hour
    #[arg(long)]
    pub hour: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Subcommand)]
pub enum ThemeAction {
    Show,
    Dark,
    Light,
    Toggle,
}

/// A `--marker LABEL=HOURS` value. Hours are validated by the editor, not here.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerArg {
    pub label: String,
    pub hours: f64,
}

fn parse_marker(raw: &str) -> Result<MarkerArg, String> {
    let (label, hours) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected LABEL=HOURS, got `{raw}`"))?;
    let hours = hours
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("`{}` is not a number of hours", hours.trim()))?;
    Ok(MarkerArg {
        label: label.to_string(),
        hours,
    })
}
