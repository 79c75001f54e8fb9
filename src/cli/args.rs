//! Command-line argument parsing for TV Guide Fetcher
//!
//! This module defines the CLI structure using clap derive macros: fetching
//! guide days into the cache, printing cached data, and cache maintenance.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Longest window a single fetch command may request
pub const MAX_WINDOW_DAYS: u32 = 14;

/// TV Guide Fetcher - download and cache XMLTV guide data
#[derive(Parser, Debug)]
#[command(
    name = "tvguide_fetcher",
    version,
    about = "Download and cache per-channel XMLTV guide data",
    long_about = "Fetches one XMLTV file per channel and day from a guide service, keeps them
in a gzip disk cache, and expires days that have passed."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cache root directory
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Guide service name the cache is namespaced under
    #[arg(long, global = true, value_name = "NAME")]
    pub service: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch guide data for a channel into the cache
    Fetch(FetchArgs),

    /// Print cached guide data for a channel and day
    Show(ShowArgs),

    /// Show cache location and contents
    Status,

    /// Delete cached days before today (or a given date)
    Expire(ExpireArgs),

    /// Delete every cached guide file
    Clear,
}

/// Arguments for the fetch command
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Channel identifier, e.g. "ABC-NSW"
    pub channel: String,

    /// Base URL of a guide mirror; repeat for several mirrors
    #[arg(short = 'u', long = "base-url", value_name = "URL", required = true)]
    pub base_urls: Vec<String>,

    /// First day to fetch (YYYY-MM-DD, default today)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Number of consecutive days; only the first is primary
    #[arg(long, default_value = "2")]
    pub days: u32,

    /// Ask the server again even if the day is already cached
    #[arg(short, long)]
    pub refresh: bool,
}

/// Arguments for the show command
#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Channel identifier
    pub channel: String,

    /// Day to print (YYYY-MM-DD, default today)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,
}

/// Arguments for the expire command
#[derive(Args, Debug, Clone)]
pub struct ExpireArgs {
    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub before: Option<NaiveDate>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl FetchArgs {
    /// Check argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.days == 0 || self.days > MAX_WINDOW_DAYS {
            return Err(format!(
                "Number of days must be between 1 and {}",
                MAX_WINDOW_DAYS
            ));
        }
        if self.base_urls.iter().any(|url| url.trim().is_empty()) {
            return Err("Base URLs must not be empty".to_string());
        }
        Ok(())
    }

    /// The days to request, starting with the primary one
    pub fn window(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let first = self.date.unwrap_or(today);
        std::iter::successors(Some(first), |day| day.succ_opt())
            .take(self.days as usize)
            .collect()
    }
}
