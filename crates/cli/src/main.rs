// whr - World Happiness Report reconciliation CLI

mod exit_codes;
mod pipeline;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;
use wellbeing_config::DisplaySettings;
use wellbeing_recon::model::{Metric, SurveyYear};

use exit_codes::{EXIT_CONFIG_INVALID, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "whr")]
#[command(about = "Reconcile yearly World Happiness Report tables into one canonical dataset")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Display settings file (default: <config dir>/wellbeing/display.toml)
    #[arg(long, global = true)]
    display: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once and emit the canonical table
    #[command(after_help = "\
Examples:
  whr run pipeline.toml
  whr run pipeline.toml --json
  whr run pipeline.toml --output happiness.json --csv happiness.csv")]
    Run {
        /// Path to the pipeline TOML
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the canonical table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Check config, sources and per-year reconciliation without aggregating
    #[command(after_help = "\
Examples:
  whr validate pipeline.toml")]
    Validate {
        /// Path to the pipeline TOML
        config: PathBuf,
    },

    /// Print the pooled correlation matrix
    #[command(after_help = "\
Examples:
  whr corr pipeline.toml
  whr corr pipeline.toml --json
  whr corr pipeline.toml --csv correlation.csv")]
    Corr {
        config: PathBuf,

        #[arg(long)]
        json: bool,

        /// Also write the matrix as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show the best-ranked countries of one year
    #[command(after_help = "\
Examples:
  whr top pipeline.toml --year 2019
  whr top pipeline.toml --year 2020 -n 5 --json")]
    Top {
        config: PathBuf,

        /// Report year (2015-2020)
        #[arg(long, value_parser = parse_year)]
        year: SurveyYear,

        /// Number of countries (default: display settings top_n)
        #[arg(short)]
        n: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Emit choropleth frames, one per year, as JSON
    #[command(after_help = "\
Examples:
  whr map pipeline.toml --metric happiness_rank
  whr map pipeline.toml --metric gdp-per-capita --output gdp.json

Metrics: happiness_rank, happiness_score, gdp_per_capita, family,
health_life_expectancy, freedom, trust_government_corruption, generosity")]
    Map {
        config: PathBuf,

        #[arg(long, value_parser = parse_metric)]
        metric: Metric,

        /// Write to file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Emit the happiness score of each year's top countries as JSON
    #[command(after_help = "\
Examples:
  whr trend pipeline.toml
  whr trend pipeline.toml -n 5")]
    Trend {
        config: PathBuf,

        #[arg(short)]
        n: Option<usize>,
    },
}

fn parse_year(s: &str) -> Result<SurveyYear, String> {
    s.parse().map_err(|e: wellbeing_recon::ReconError| e.to_string())
}

fn parse_metric(s: &str) -> Result<Metric, String> {
    s.parse().map_err(|e: wellbeing_recon::ReconError| e.to_string())
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  wellbeing-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  wellbeing-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

/// Logs go to stderr so `--json` stdout stays a single JSON value.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 2)
        .init();
}

fn load_display(path: Option<PathBuf>) -> Result<DisplaySettings, CliError> {
    match path {
        Some(path) => DisplaySettings::load_from(&path).map_err(|e| CliError {
            code: EXIT_CONFIG_INVALID,
            message: e.to_string(),
            hint: None,
        }),
        None => Ok(DisplaySettings::load()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    debug!("whr started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = load_display(cli.display).and_then(|display| match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: whr <command> [options]");
            eprintln!("       whr --help for more information");
            Ok(())
        }
        Some(Commands::Run { config, json, output, csv }) => {
            pipeline::cmd_run(config, json, output, csv, &display)
        }
        Some(Commands::Validate { config }) => pipeline::cmd_validate(config),
        Some(Commands::Corr { config, json, csv }) => report::cmd_corr(config, json, csv),
        Some(Commands::Top { config, year, n, json }) => report::cmd_top(config, year, n, json, &display),
        Some(Commands::Map { config, metric, output }) => report::cmd_map(config, metric, output, &display),
        Some(Commands::Trend { config, n }) => report::cmd_trend(config, n, &display),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
