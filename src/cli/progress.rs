//! Progress display for fetch commands
//!
//! Scheduler events are folded into a [`FetchSummary`] and mirrored on an
//! indicatif bar, one step per requested day.

use std::fmt;

use indicatif::{ProgressBar, ProgressStyle};

use crate::app::NetworkEvent;
use crate::errors::{AppError, Result};

/// Outcome counts for one fetch command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Days now available in the cache
    pub available: usize,
    /// Failed days the user asked for directly
    pub failed_primary: Vec<String>,
    /// Failed days that only extend a window
    pub failed_secondary: Vec<String>,
}

impl FetchSummary {
    /// Whether any primary day failed
    pub fn has_primary_failures(&self) -> bool {
        !self.failed_primary.is_empty()
    }

    /// Fold one scheduler event into the summary
    pub fn record(&mut self, event: &NetworkEvent) {
        match event {
            NetworkEvent::DataAvailable(_) => self.available += 1,
            NetworkEvent::RequestFailed { request, .. } if request.is_primary() => {
                self.failed_primary.push(request.key().to_string());
            }
            NetworkEvent::RequestFailed { request, .. } => {
                self.failed_secondary.push(request.key().to_string());
            }
            NetworkEvent::RequestStarted(_) | NetworkEvent::RequestsFinished => {}
        }
    }

    /// Days that reached a final state
    pub fn settled(&self) -> usize {
        self.available + self.failed_primary.len() + self.failed_secondary.len()
    }
}

impl fmt::Display for FetchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} day(s) available", self.available)?;
        if !self.failed_primary.is_empty() {
            write!(f, ", failed: {}", self.failed_primary.join(", "))?;
        }
        if !self.failed_secondary.is_empty() {
            write!(f, ", unavailable: {}", self.failed_secondary.join(", "))?;
        }
        Ok(())
    }
}

/// Progress bar over the days of one fetch command
pub struct FetchProgress {
    bar: ProgressBar,
    summary: FetchSummary,
    expected: usize,
}

impl FetchProgress {
    /// Create a visible progress bar for `expected` days
    pub fn new(expected: usize) -> Result<Self> {
        let bar = ProgressBar::new(expected as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| AppError::generic(format!("Progress bar template error: {}", e)))?
                .progress_chars("##-"),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Ok(Self::with_bar(bar, expected))
    }

    /// Track progress without drawing anything
    pub fn hidden(expected: usize) -> Self {
        Self::with_bar(ProgressBar::hidden(), expected)
    }

    fn with_bar(bar: ProgressBar, expected: usize) -> Self {
        Self {
            bar,
            summary: FetchSummary::default(),
            expected,
        }
    }

    /// Apply an event; returns true once every expected day has settled
    pub fn handle(&mut self, event: &NetworkEvent) -> bool {
        match event {
            NetworkEvent::RequestStarted(request) => {
                self.bar.set_message(format!("fetching {}", request.key()));
            }
            NetworkEvent::DataAvailable(_) | NetworkEvent::RequestFailed { .. } => {
                self.summary.record(event);
                self.bar.set_position(self.summary.settled() as u64);
            }
            NetworkEvent::RequestsFinished => {}
        }
        self.summary.settled() >= self.expected
    }

    /// Clear the bar and return the summary
    pub fn finish(self) -> FetchSummary {
        self.bar.finish_and_clear();
        self.summary
    }
}
