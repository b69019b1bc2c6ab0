//! `whr corr` / `whr top` / `whr map` / `whr trend`: products derived from
//! the canonical table.

use std::path::PathBuf;

use serde::Serialize;
use wellbeing_config::DisplaySettings;
use wellbeing_recon::model::{CanonicalRecord, CorrelationMatrix, Metric, SurveyYear};
use wellbeing_recon::views::{choropleth, score_trend, top_n, ChoroplethSeries};

use crate::pipeline::{io_err, run_pipeline, to_json, write_stdout};
use crate::CliError;

// ============================================================================
// corr
// ============================================================================

/// Fixed-width text rendering; undefined coefficients print as `n/a`.
pub fn format_matrix(matrix: &CorrelationMatrix) -> String {
    let width = matrix.labels.iter().map(|l| l.len()).max().unwrap_or(0);
    let mut out = String::new();

    out.push_str(&format!("{:width$}", ""));
    for i in 0..matrix.labels.len() {
        out.push_str(&format!(" {:>7}", format!("[{}]", i + 1)));
    }
    out.push('\n');

    for (i, (label, row)) in matrix.labels.iter().zip(&matrix.values).enumerate() {
        out.push_str(&format!("{label:width$}"));
        for v in row {
            if v.is_nan() {
                out.push_str(&format!(" {:>7}", "n/a"));
            } else {
                out.push_str(&format!(" {v:>7.3}"));
            }
        }
        out.push_str(&format!("  [{}]", i + 1));
        out.push('\n');
    }
    out
}

pub fn cmd_corr(config_path: PathBuf, json_output: bool, csv_file: Option<PathBuf>) -> Result<(), CliError> {
    let output = run_pipeline(&config_path)?;

    if let Some(ref path) = csv_file {
        wellbeing_io::csv::export_correlation(&output.correlation, path).map_err(io_err)?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        write_stdout(&to_json(&output.correlation)?)
    } else {
        write_stdout(format_matrix(&output.correlation).trim_end())
    }
}

// ============================================================================
// top
// ============================================================================

fn format_top(records: &[CanonicalRecord]) -> String {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!(
            "{:>4}  {:<28} {:<34} {:.2}\n",
            r.happiness_rank,
            r.country,
            r.region.as_deref().unwrap_or("-"),
            r.happiness_score
        ));
    }
    out
}

pub fn cmd_top(
    config_path: PathBuf,
    year: SurveyYear,
    n: Option<usize>,
    json_output: bool,
    display: &DisplaySettings,
) -> Result<(), CliError> {
    let n = n.unwrap_or(display.top_n);
    if n == 0 {
        return Err(CliError::args("-n must be at least 1"));
    }

    let output = run_pipeline(&config_path)?;
    let top = top_n(&output.unrounded, year, n);

    if json_output {
        write_stdout(&to_json(&top)?)
    } else {
        write_stdout(format_top(&top).trim_end())
    }
}

// ============================================================================
// map
// ============================================================================

/// Everything a choropleth renderer needs for one metric.
#[derive(Debug, Serialize)]
pub struct MapDocument<'a> {
    pub colorscale: &'a str,
    pub projection: &'a str,
    #[serde(flatten)]
    pub series: ChoroplethSeries,
}

pub fn cmd_map(
    config_path: PathBuf,
    metric: Metric,
    output_file: Option<PathBuf>,
    display: &DisplaySettings,
) -> Result<(), CliError> {
    let output = run_pipeline(&config_path)?;
    let doc = MapDocument {
        colorscale: &display.colorscale,
        projection: &display.projection,
        series: choropleth(&output.table, metric),
    };

    match output_file {
        Some(path) => {
            wellbeing_io::json::export(&doc, &path).map_err(io_err)?;
            eprintln!("wrote {} ({} frames)", path.display(), doc.series.frames.len());
            Ok(())
        }
        None => write_stdout(&to_json(&doc)?),
    }
}

// ============================================================================
// trend
// ============================================================================

pub fn cmd_trend(config_path: PathBuf, n: Option<usize>, display: &DisplaySettings) -> Result<(), CliError> {
    let n = n.unwrap_or(display.top_n);
    let output = run_pipeline(&config_path)?;
    write_stdout(&to_json(&score_trend(&output.unrounded, n))?)
}
