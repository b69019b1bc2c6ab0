//! `whr run` / `whr validate`: load the six sources and reconcile them.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use wellbeing_config::DisplaySettings;
use wellbeing_io::IoError;
use wellbeing_recon::engine::reconcile_all;
use wellbeing_recon::model::{PipelineOutput, RunSummary};
use wellbeing_recon::{PipelineConfig, ReconError, SourceSet};

use crate::exit_codes::{io_exit_code, recon_exit_code, EXIT_CONFIG_INVALID, EXIT_OUTPUT_WRITE, EXIT_SOURCE_READ};
use crate::CliError;

pub fn recon_err(err: ReconError) -> CliError {
    let hint = match &err {
        ReconError::IncompleteDataset { .. } => {
            Some("run `whr validate` on the same config for per-year details".to_string())
        }
        ReconError::JoinMismatch { .. } => {
            Some("check that country names use the same spelling as the 2016 source".to_string())
        }
        ReconError::SchemaMismatch { .. } => {
            Some("the file may belong to a different report year than its [sources] key".to_string())
        }
        _ => None,
    };
    CliError {
        code: recon_exit_code(&err),
        message: err.to_string(),
        hint,
    }
}

pub fn io_err(err: IoError) -> CliError {
    CliError {
        code: io_exit_code(&err),
        message: err.to_string(),
        hint: None,
    }
}

/// A parsed config plus the directory its source paths are relative to.
pub struct LoadedConfig {
    pub config: PipelineConfig,
    pub base_dir: PathBuf,
}

pub fn load_config(config_path: &Path) -> Result<LoadedConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| CliError {
        code: EXIT_CONFIG_INVALID,
        message: format!("cannot read config {}: {e}", config_path.display()),
        hint: None,
    })?;
    let config = PipelineConfig::from_toml(&config_str).map_err(recon_err)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    debug!(name = %config.name, base_dir = %base_dir.display(), "loaded pipeline config");

    Ok(LoadedConfig { config, base_dir })
}

pub fn load_sources(loaded: &LoadedConfig) -> Result<SourceSet, CliError> {
    wellbeing_io::csv::load_sources(&loaded.config, &loaded.base_dir).map_err(|e| {
        let err = io_err(e);
        if err.code == EXIT_SOURCE_READ {
            err.with_hint("source paths are resolved relative to the config file")
        } else {
            err
        }
    })
}

/// Load config and sources, then run the whole pipeline.
pub fn run_pipeline(config_path: &Path) -> Result<PipelineOutput, CliError> {
    let loaded = load_config(config_path)?;
    let sources = load_sources(&loaded)?;
    wellbeing_recon::run(&loaded.config, &sources).map_err(recon_err)
}

pub fn write_stdout(text: &str) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{text}").map_err(|e| CliError {
        code: EXIT_OUTPUT_WRITE,
        message: format!("cannot write to stdout: {e}"),
        hint: None,
    })
}

pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError {
        code: EXIT_OUTPUT_WRITE,
        message: format!("JSON serialization error: {e}"),
        hint: None,
    })
}

fn print_summary(summary: &RunSummary) {
    for y in &summary.years {
        eprintln!(
            "{}: {} records, {} dropped by region join",
            y.year, y.records, y.dropped
        );
    }
    for w in &summary.warnings {
        eprintln!("warning: {w}");
    }
    eprintln!(
        "canonical table: {} records across {} years",
        summary.total_records,
        summary.years.len()
    );
}

// ============================================================================
// run
// ============================================================================

/// Table renderer settings carried alongside the run output.
#[derive(Debug, Serialize)]
pub struct TableOptions<'a> {
    pub length_menu: &'a [usize],
    pub max_bytes: usize,
}

/// The `run` document: the pipeline output plus how to page it.
#[derive(Debug, Serialize)]
pub struct RunDocument<'a> {
    pub table_options: TableOptions<'a>,
    #[serde(flatten)]
    pub output: &'a PipelineOutput,
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    csv_file: Option<PathBuf>,
    settings: &DisplaySettings,
) -> Result<(), CliError> {
    let output = run_pipeline(&config_path)?;
    let doc = RunDocument {
        table_options: TableOptions {
            length_menu: &settings.length_menu,
            max_bytes: settings.max_bytes,
        },
        output: &output,
    };

    if let Some(ref path) = output_file {
        let written = wellbeing_io::json::export(&doc, path).map_err(io_err)?;
        let cap = settings.max_bytes;
        if written > cap {
            warn!(
                bytes = written,
                max_bytes = cap,
                "output exceeds the display byte cap; renderers will downsample"
            );
        }
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = csv_file {
        wellbeing_io::csv::export_table(&output.table, path).map_err(io_err)?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        write_stdout(&to_json(&doc)?)?;
    }

    print_summary(&output.summary);
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let loaded = load_config(&config_path)?;
    let sources = load_sources(&loaded)?;
    let outcomes = reconcile_all(&sources, &loaded.config.reconcile_options());

    let mut first_failure: Option<ReconError> = None;
    for (year, outcome) in outcomes {
        match outcome {
            Ok(table) => eprintln!(
                "ok    {year}: {} records, {} dropped, {} warnings",
                table.records.len(),
                table.dropped.len(),
                table.warnings.len()
            ),
            Err(e) => {
                eprintln!("FAIL  {year}: {e}");
                first_failure.get_or_insert(e);
            }
        }
    }

    match first_failure {
        None => {
            eprintln!("{}: all years reconcile", loaded.config.name);
            Ok(())
        }
        Some(e) => Err(recon_err(e)),
    }
}
