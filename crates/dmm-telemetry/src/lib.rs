//! Observability for the depth market maker.
//!
//! - Structured logging with tracing (JSON in production)
//! - Prometheus counters for cycles and order actions
//! - Cycle statistics summarized to the log

pub mod error;
pub mod logging;
pub mod metrics;
pub mod stats;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::CycleMetrics;
pub use stats::{CycleOutcome, CycleStats};
