use std::path::PathBuf;

use thiserror::Error;
use wellbeing_recon::ReconError;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },

    /// The file was read, but its contents are not a usable table.
    #[error(transparent)]
    Recon(#[from] ReconError),
}
