// CSV import/export

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};
use wellbeing_recon::model::{CanonicalTable, CorrelationMatrix, SurveyYear};
use wellbeing_recon::{load_csv_table, PipelineConfig, SourceSet};

use crate::error::IoError;

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            debug!(path = %path.display(), "not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Load one year's source file.
pub fn import(year: SurveyYear, path: &Path) -> Result<wellbeing_recon::RawTable, IoError> {
    let content = read_file_as_utf8(path)?;
    let table = load_csv_table(year, &content)?;
    info!(%year, path = %path.display(), rows = table.rows.len(), "loaded source");
    Ok(table)
}

/// Load all six sources named by `config`, resolving relative paths
/// against `base_dir` (the config file's directory).
pub fn load_sources(config: &PipelineConfig, base_dir: &Path) -> Result<SourceSet, IoError> {
    let mut sources = SourceSet::new();
    for year in SurveyYear::ALL {
        let path = base_dir.join(config.source_path(year));
        sources.insert(import(year, &path)?);
    }
    Ok(sources)
}

fn create(path: &Path) -> Result<BufWriter<File>, IoError> {
    File::create(path).map(BufWriter::new).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn encode_err(path: &Path, e: csv::Error) -> IoError {
    IoError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Write the canonical table, one record per line, snake_case header.
pub fn export_table(table: &CanonicalTable, path: &Path) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_writer(create(path)?);
    for record in &table.records {
        writer.serialize(record).map_err(|e| encode_err(path, e))?;
    }
    finish(writer, path)
}

/// Write the correlation matrix with a leading label column.
/// Undefined coefficients are left empty.
pub fn export_correlation(matrix: &CorrelationMatrix, path: &Path) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_writer(create(path)?);

    let mut header = vec![String::new()];
    header.extend(matrix.labels.iter().cloned());
    writer.write_record(&header).map_err(|e| encode_err(path, e))?;

    for (label, row) in matrix.labels.iter().zip(&matrix.values) {
        let mut record = vec![label.clone()];
        record.extend(row.iter().map(|v| if v.is_nan() { String::new() } else { v.to_string() }));
        writer.write_record(&record).map_err(|e| encode_err(path, e))?;
    }
    finish(writer, path)
}

fn finish<W: Write>(writer: csv::Writer<W>, path: &Path) -> Result<(), IoError> {
    let mut inner = writer.into_inner().map_err(|e| IoError::Write {
        path: path.to_path_buf(),
        source: std::io::Error::new(e.error().kind(), e.error().to_string()),
    })?;
    inner.flush().map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}
