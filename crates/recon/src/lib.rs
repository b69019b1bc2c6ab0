//! `wellbeing-recon`: schema reconciliation for yearly well-being report tables.
//!
//! Pure engine crate: receives raw tables as text, returns the canonical
//! dataset and its correlation matrix. No filesystem or CLI dependencies.

pub mod adapter;
pub mod aggregate;
pub mod config;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod model;
pub mod normalize;
pub mod rank;
pub mod reconcile;
pub mod region;
pub mod views;

pub use config::PipelineConfig;
pub use engine::{load_csv_table, run, SourceSet};
pub use error::ReconError;
pub use model::{
    CanonicalRecord, CanonicalTable, CorrelationMatrix, Indicator, Metric, PipelineOutput, RawTable,
    SurveyYear, YearTable,
};
