//! Cycle loop with backoff and cooperative stop.

use dmm_gateway::ErrorKind;
use dmm_mm::ReconcileAction;
use dmm_telemetry::{CycleOutcome, CycleStats};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::WorkerConfig;
use crate::error::{AppResult, CycleError};
use crate::orchestrator::{CycleReport, CycleStatus, Orchestrator};

/// Drives [`Orchestrator::run_cycle`] until stopped or a fatal error.
///
/// The stop token is only observed between cycles, so a cycle that has
/// started always runs to completion.
pub struct Worker {
    orchestrator: Orchestrator,
    config: WorkerConfig,
    stats: CycleStats,
    stop: CancellationToken,
}

impl Worker {
    /// Fails only if the run's metric collectors cannot be registered.
    pub fn new(
        orchestrator: Orchestrator,
        config: WorkerConfig,
        stop: CancellationToken,
    ) -> AppResult<Self> {
        let stats = CycleStats::new(config.summary_every)?;
        Ok(Self {
            orchestrator,
            config,
            stats,
            stop,
        })
    }

    /// Run until the token fires (`Ok`) or a fatal venue error (`Err`).
    pub async fn run(mut self) -> Result<CycleStats, CycleError> {
        info!(
            interval_ms = self.config.interval_ms,
            backoff_multiplier = self.config.backoff_multiplier,
            "Worker started"
        );

        let mut fatal = None;
        while !self.stop.is_cancelled() {
            let delay = match self.orchestrator.run_cycle().await {
                Ok(report) => {
                    self.record(&report);
                    self.config.interval()
                }
                Err(e) => match e.kind() {
                    ErrorKind::Fatal => {
                        error!(error = %e, "Fatal venue error, stopping worker");
                        self.stats.record_cycle(CycleOutcome::Fatal);
                        fatal = Some(e);
                        break;
                    }
                    ErrorKind::Transient => {
                        warn!(error = %e, backoff_ms = self.config.backoff().as_millis() as u64, "Transient error, backing off");
                        self.stats.record_cycle(CycleOutcome::TransientError);
                        self.config.backoff()
                    }
                    _ => {
                        error!(error = %e, kind = %e.kind(), "Cycle aborted");
                        self.stats.record_cycle(CycleOutcome::UnclassifiedError);
                        self.config.interval()
                    }
                },
            };

            tokio::select! {
                _ = self.stop.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.shutdown().await;

        match fatal {
            Some(e) => Err(e),
            None => Ok(self.stats),
        }
    }

    async fn shutdown(&mut self) {
        info!("Worker stopping");
        if self.config.cancel_on_shutdown {
            match self.orchestrator.withdraw_all().await {
                Ok((bid, ask)) => {
                    self.record_action(&bid);
                    self.record_action(&ask);
                    info!(bid = ?bid, ask = ?ask, "Resting orders withdrawn");
                }
                Err(e) => warn!(error = %e, "Failed to withdraw orders on shutdown"),
            }
        }
        self.stats.log_summary("shutdown");
        match self.stats.metrics().encode() {
            Ok(text) => debug!(metrics = %text, "Final metrics"),
            Err(e) => warn!(error = %e, "Failed to encode metrics"),
        }
    }

    fn record(&mut self, report: &CycleReport) {
        for action in report.actions() {
            self.record_action(action);
        }
        let outcome = match report.status {
            CycleStatus::Quoted(_) => CycleOutcome::Quoted,
            CycleStatus::NoQuote(_) => CycleOutcome::NoQuote,
        };
        self.stats.record_cycle(outcome);
    }

    fn record_action(&mut self, action: &ReconcileAction) {
        match action {
            ReconcileAction::Placed(_) => self.stats.record_placement(),
            ReconcileAction::Edited(_) => self.stats.record_edit(),
            ReconcileAction::Cancelled(_) => self.stats.record_cancel(),
            ReconcileAction::Replaced { placed, .. } => {
                self.stats.record_cancel();
                if placed.is_some() {
                    self.stats.record_placement();
                }
            }
            ReconcileAction::Idle
            | ReconcileAction::Unchanged(_)
            | ReconcileAction::PlaceFailed(_) => {}
        }
    }
}
