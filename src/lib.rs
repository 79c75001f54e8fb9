//! TV Guide Fetcher Library
//!
//! Downloads per-channel, per-day XMLTV guide files, keeps them in a gzip
//! disk cache and reports fetch progress to listeners. Fetches run one at a
//! time and duplicate requests are merged.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
