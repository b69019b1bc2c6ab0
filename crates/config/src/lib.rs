// Configuration loading

pub mod display;

pub use display::{DisplayError, DisplaySettings};
