//! Command-line interface components
//!
//! This module contains CLI-specific code for the TV Guide Fetcher
//! application: argument parsing, command handlers and progress display.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, Commands, ExpireArgs, FetchArgs, GlobalArgs, ShowArgs};
pub use commands::{handle_clear, handle_expire, handle_fetch, handle_show, handle_status};
pub use progress::{FetchProgress, FetchSummary};
