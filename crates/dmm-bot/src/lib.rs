//! Depth market maker application.
//!
//! Wires the quoting core to a venue:
//! - Concurrent market snapshot per cycle
//! - Cycle orchestrator owning tracked orders and volume state
//! - Worker loop with backoff, fatal stop, and cooperative shutdown
//! - Paper venue for running without connectivity

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod paper;
pub mod snapshot;
pub mod worker;

pub use config::{AppConfig, GatewayConfig, PaperConfig, WorkerConfig};
pub use error::{AppError, AppResult, CycleError};
pub use orchestrator::{CycleReport, CycleStatus, Orchestrator};
pub use paper::paper_gateway;
pub use snapshot::fetch_snapshot;
pub use worker::Worker;
