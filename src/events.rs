//! Events emitted by a running batch, and the observer seam front-ends plug into

use std::path::PathBuf;
use tracing::{info, warn};

use crate::models::{Outcome, Summary};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
}

impl ProgressEvent {
    /// Fraction of rows processed, in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed as f64 / self.total as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub row_name: String,
    pub outcome: Outcome,
}

impl StatusEvent {
    /// One-line status text for display
    pub fn message(&self) -> String {
        match &self.outcome {
            Outcome::Success { .. } => format!("Downloaded: {}", self.row_name),
            Outcome::Failure(err) => format!("Failed: {} ({})", self.row_name, err),
        }
    }
}

#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { total: usize, output_dir: PathBuf },
    Progress(ProgressEvent),
    Status(StatusEvent),
    Finished(Summary),
}

/// Receives batch events in order. Implemented for any `FnMut(&BatchEvent)`.
pub trait BatchObserver: Send {
    fn on_event(&mut self, event: &BatchEvent);
}

impl<F> BatchObserver for F
where
    F: FnMut(&BatchEvent) + Send,
{
    fn on_event(&mut self, event: &BatchEvent) {
        self(event)
    }
}

/// Reports every event through `tracing`
#[derive(Debug, Default)]
pub struct LogObserver;

impl BatchObserver for LogObserver {
    fn on_event(&mut self, event: &BatchEvent) {
        match event {
            BatchEvent::Started { total, output_dir } => {
                info!("Starting download of {} rows into {}", total, output_dir.display());
            }
            BatchEvent::Progress(progress) => {
                info!(
                    "Progress {}/{} ({:.0}%)",
                    progress.completed,
                    progress.total,
                    progress.fraction() * 100.0
                );
            }
            BatchEvent::Status(status) => match &status.outcome {
                Outcome::Success { path, bytes } => {
                    info!("✓ {} -> {} ({} bytes)", status.row_name, path.display(), bytes);
                }
                Outcome::Failure(err) => {
                    warn!("✗ {}: {}", status.row_name, err);
                }
            },
            BatchEvent::Finished(summary) => {
                info!(
                    "Download finished: {} succeeded, {} failed. Files are in {}",
                    summary.successful,
                    summary.failed,
                    summary.output_dir.display()
                );
            }
        }
    }
}
