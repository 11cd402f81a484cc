//! Prometheus collectors for the quoting loop.
//!
//! Each [`CycleMetrics`] owns its own [`Registry`], so several workers (or
//! tests) in one process never collide on metric names.

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder,
    IntCounter, IntCounterVec, Registry, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};
use crate::stats::CycleOutcome;

/// Cycle and order-action counters.
#[derive(Clone)]
pub struct CycleMetrics {
    registry: Registry,
    /// Finished cycles. Labels: outcome
    cycles_total: IntCounterVec,
    placements_total: IntCounter,
    edits_total: IntCounter,
    cancels_total: IntCounter,
}

impl CycleMetrics {
    pub fn new() -> TelemetryResult<Self> {
        let registry = Registry::new();
        let cycles_total = register_int_counter_vec_with_registry!(
            "dmm_cycles_total",
            "Finished quoting cycles by outcome",
            &["outcome"],
            registry
        )?;
        let placements_total = register_int_counter_with_registry!(
            "dmm_order_placements_total",
            "Orders placed, replacements included",
            registry
        )?;
        let edits_total = register_int_counter_with_registry!(
            "dmm_order_edits_total",
            "Resting orders edited in place",
            registry
        )?;
        let cancels_total = register_int_counter_with_registry!(
            "dmm_order_cancels_total",
            "Resting orders cancelled",
            registry
        )?;

        Ok(Self {
            registry,
            cycles_total,
            placements_total,
            edits_total,
            cancels_total,
        })
    }

    pub fn observe_cycle(&self, outcome: CycleOutcome) {
        self.cycles_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn observe_placement(&self) {
        self.placements_total.inc();
    }

    pub fn observe_edit(&self) {
        self.edits_total.inc();
    }

    pub fn observe_cancel(&self) {
        self.cancels_total.inc();
    }

    pub fn cycles(&self, outcome: CycleOutcome) -> u64 {
        self.cycles_total
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    pub fn total_cycles(&self) -> u64 {
        CycleOutcome::ALL.iter().map(|o| self.cycles(*o)).sum()
    }

    pub fn placements(&self) -> u64 {
        self.placements_total.get()
    }

    pub fn edits(&self) -> u64 {
        self.edits_total.get()
    }

    pub fn cancels(&self) -> u64 {
        self.cancels_total.get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition of every collector in this registry.
    pub fn encode(&self) -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
