// JSON export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::IoError;

/// Serialize `value` as pretty JSON into `path`. Returns the bytes written.
///
/// Non-finite floats (undefined correlations) come out as `null`.
pub fn export<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<usize, IoError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| IoError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let write_err = |source| IoError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(write_err)?;
    writer.write_all(b"\n").map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    Ok(bytes.len() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use wellbeing_recon::model::CorrelationMatrix;

    #[test]
    fn test_json_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corr.json");
        let matrix = CorrelationMatrix {
            labels: vec!["a".into(), "b".into()],
            values: vec![vec![1.0, f64::NAN], vec![f64::NAN, 1.0]],
        };

        let written = export(&matrix, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(written, content.len());
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["labels"][1], "b");
        assert_eq!(parsed["values"][0][0], 1.0);
        assert!(parsed["values"][0][1].is_null());
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.json");
        let err = export(&vec![1, 2, 3], &path).unwrap_err();
        assert!(matches!(err, IoError::Write { .. }));
    }
}
