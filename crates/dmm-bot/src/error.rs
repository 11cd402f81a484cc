//! Application error types.

use dmm_gateway::{ErrorKind, VenueError};
use thiserror::Error;

/// Why a cycle was aborted.
#[derive(Debug, Clone, Error)]
pub enum CycleError {
    #[error("Snapshot fetch failed: {0}")]
    Snapshot(VenueError),

    #[error("Reconciliation failed: {0}")]
    Reconcile(VenueError),

    #[error("Stale order cleanup failed: {0}")]
    Cleanup(VenueError),
}

impl CycleError {
    pub fn venue_error(&self) -> &VenueError {
        match self {
            Self::Snapshot(e) | Self::Reconcile(e) | Self::Cleanup(e) => e,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.venue_error().kind
    }

    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid parameters: {0}")]
    Core(#[from] dmm_core::CoreError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] dmm_telemetry::TelemetryError),
}

pub type AppResult<T> = Result<T, AppError>;
