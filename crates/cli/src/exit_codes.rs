//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | Success                                                    |
//! | 2    | CLI usage error (bad args, unknown metric or year)         |
//! | 3    | Pipeline or display config invalid                         |
//! | 4    | Source file missing, unreadable, or not CSV                |
//! | 5    | Source lacks a column its year requires                    |
//! | 6    | Region join against the reference year failed              |
//! | 7    | Bad record (empty country, malformed number, duplicate)    |
//! | 8    | One or more years failed; no canonical table produced      |
//! | 9    | Output file could not be written                           |
//!
//! `run`, `corr`, `top`, `map` and `trend` assemble the whole table, so any
//! per-year failure surfaces as 8. `validate` reports the first failing
//! year's own code (5, 6 or 7).
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into [`recon_exit_code`] or the relevant command

use wellbeing_io::IoError;
use wellbeing_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Pipeline TOML or display settings failed to parse or validate.
pub const EXIT_CONFIG_INVALID: u8 = 3;

/// A source file could not be read or parsed as CSV.
pub const EXIT_SOURCE_READ: u8 = 4;

/// A source is missing a required column.
pub const EXIT_SCHEMA_MISMATCH: u8 = 5;

/// Region join matched nothing, too little, or had no reference table.
pub const EXIT_JOIN_MISMATCH: u8 = 6;

/// A record was rejected (empty country, unparseable number or rank,
/// duplicate country, or a source with no rows).
pub const EXIT_RECORD_ERROR: u8 = 7;

/// The aggregator refused to build a partial table.
pub const EXIT_INCOMPLETE_DATASET: u8 = 8;

/// Writing an output file failed.
pub const EXIT_OUTPUT_WRITE: u8 = 9;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) | ReconError::UnknownYear(_) => {
            EXIT_CONFIG_INVALID
        }
        ReconError::Csv(_) | ReconError::MissingSource { .. } => EXIT_SOURCE_READ,
        ReconError::SchemaMismatch { .. } => EXIT_SCHEMA_MISMATCH,
        ReconError::JoinMismatch { .. } | ReconError::MissingReference { .. } => EXIT_JOIN_MISMATCH,
        ReconError::EmptySource { .. }
        | ReconError::MissingCountry { .. }
        | ReconError::InvalidNumber { .. }
        | ReconError::InvalidRank { .. }
        | ReconError::DuplicateCountry { .. } => EXIT_RECORD_ERROR,
        ReconError::IncompleteDataset { .. } => EXIT_INCOMPLETE_DATASET,
    }
}

/// Map an I/O-layer error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Read { .. } => EXIT_SOURCE_READ,
        IoError::Write { .. } | IoError::Encode { .. } => EXIT_OUTPUT_WRITE,
        IoError::Recon(e) => recon_exit_code(e),
    }
}
