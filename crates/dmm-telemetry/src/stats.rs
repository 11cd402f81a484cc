//! Per-run cycle statistics.
//!
//! Counts live in the run's [`CycleMetrics`] collectors. The worker loop
//! records into them and a summary line is read back from the same counters
//! every `summary_every` cycles and once more on shutdown.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::TelemetryResult;
use crate::metrics::CycleMetrics;

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A plan was produced and both sides reconciled.
    Quoted,
    /// Nothing to quote; stale orders cleaned up.
    NoQuote,
    /// Venue hiccup, retried after backoff.
    TransientError,
    /// Unrecognized failure, cycle aborted.
    UnclassifiedError,
    /// Quoting stopped.
    Fatal,
}

impl CycleOutcome {
    pub const ALL: [CycleOutcome; 5] = [
        Self::Quoted,
        Self::NoQuote,
        Self::TransientError,
        Self::UnclassifiedError,
        Self::Fatal,
    ];

    /// Metric label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quoted => "quoted",
            Self::NoQuote => "no_quote",
            Self::TransientError => "transient_error",
            Self::UnclassifiedError => "unclassified_error",
            Self::Fatal => "fatal",
        }
    }
}

/// Cumulative counters since start.
#[derive(Clone)]
pub struct CycleStats {
    started_at: DateTime<Utc>,
    metrics: CycleMetrics,
    summary_every: u64,
}

impl CycleStats {
    /// `summary_every == 0` disables periodic summaries.
    pub fn new(summary_every: u64) -> TelemetryResult<Self> {
        Ok(Self {
            started_at: Utc::now(),
            metrics: CycleMetrics::new()?,
            summary_every,
        })
    }

    /// Count a finished cycle. Emits the periodic summary when due.
    pub fn record_cycle(&mut self, outcome: CycleOutcome) {
        self.metrics.observe_cycle(outcome);
        if self.summary_due() {
            self.log_summary("periodic");
        }
    }

    pub fn record_placement(&mut self) {
        self.metrics.observe_placement();
    }

    pub fn record_edit(&mut self) {
        self.metrics.observe_edit();
    }

    pub fn record_cancel(&mut self) {
        self.metrics.observe_cancel();
    }

    pub fn metrics(&self) -> &CycleMetrics {
        &self.metrics
    }

    pub fn cycles(&self) -> u64 {
        self.metrics.total_cycles()
    }

    pub fn quoted(&self) -> u64 {
        self.metrics.cycles(CycleOutcome::Quoted)
    }

    pub fn no_quote(&self) -> u64 {
        self.metrics.cycles(CycleOutcome::NoQuote)
    }

    pub fn transient_errors(&self) -> u64 {
        self.metrics.cycles(CycleOutcome::TransientError)
    }

    pub fn unclassified_errors(&self) -> u64 {
        self.metrics.cycles(CycleOutcome::UnclassifiedError)
    }

    pub fn fatal_errors(&self) -> u64 {
        self.metrics.cycles(CycleOutcome::Fatal)
    }

    pub fn placements(&self) -> u64 {
        self.metrics.placements()
    }

    pub fn edits(&self) -> u64 {
        self.metrics.edits()
    }

    pub fn cancels(&self) -> u64 {
        self.metrics.cancels()
    }

    /// Share of cycles that produced quotes, in [0, 1].
    pub fn quote_rate(&self) -> f64 {
        let cycles = self.cycles();
        if cycles == 0 {
            return 0.0;
        }
        self.quoted() as f64 / cycles as f64
    }

    fn summary_due(&self) -> bool {
        self.summary_every > 0 && self.cycles() % self.summary_every == 0
    }

    pub fn log_summary(&self, reason: &str) {
        let uptime_secs = (Utc::now() - self.started_at).num_seconds();
        info!(
            reason,
            uptime_secs,
            cycles = self.cycles(),
            quoted = self.quoted(),
            no_quote = self.no_quote(),
            transient_errors = self.transient_errors(),
            unclassified_errors = self.unclassified_errors(),
            fatal_errors = self.fatal_errors(),
            placements = self.placements(),
            edits = self.edits(),
            cancels = self.cancels(),
            quote_rate = self.quote_rate(),
            "Cycle summary"
        );
    }
}

impl fmt::Debug for CycleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleStats")
            .field("started_at", &self.started_at)
            .field("cycles", &self.cycles())
            .field("quoted", &self.quoted())
            .field("placements", &self.placements())
            .field("edits", &self.edits())
            .field("cancels", &self.cancels())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_are_counted() {
        let mut stats = CycleStats::new(0).unwrap();
        stats.record_cycle(CycleOutcome::Quoted);
        stats.record_cycle(CycleOutcome::Quoted);
        stats.record_cycle(CycleOutcome::NoQuote);
        stats.record_cycle(CycleOutcome::TransientError);
        stats.record_cycle(CycleOutcome::UnclassifiedError);

        assert_eq!(stats.cycles(), 5);
        assert_eq!(stats.quoted(), 2);
        assert_eq!(stats.no_quote(), 1);
        assert_eq!(stats.transient_errors(), 1);
        assert_eq!(stats.unclassified_errors(), 1);
        assert_eq!(stats.fatal_errors(), 0);
        assert!((stats.quote_rate() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_order_actions_are_counted() {
        let mut stats = CycleStats::new(0).unwrap();
        stats.record_placement();
        stats.record_placement();
        stats.record_edit();
        stats.record_cancel();
        assert_eq!((stats.placements(), stats.edits(), stats.cancels()), (2, 1, 1));
    }

    #[test]
    fn test_summary_reads_the_registered_collectors() {
        let mut stats = CycleStats::new(0).unwrap();
        stats.record_cycle(CycleOutcome::Quoted);
        stats.record_edit();

        let families = stats.metrics().registry().gather();
        let names: Vec<&str> = families.iter().map(|f| f.get_name()).collect();
        assert!(names.contains(&"dmm_cycles_total"));
        assert!(names.contains(&"dmm_order_edits_total"));
        assert_eq!(stats.metrics().edits(), stats.edits());
    }

    #[test]
    fn test_summary_cadence() {
        let mut stats = CycleStats::new(3).unwrap();
        stats.record_cycle(CycleOutcome::Quoted);
        stats.record_cycle(CycleOutcome::NoQuote);
        assert!(!stats.summary_due());
        stats.record_cycle(CycleOutcome::Quoted);
        assert!(stats.summary_due());
        assert!(!CycleStats::new(0).unwrap().summary_due());
    }

    #[test]
    fn test_empty_quote_rate() {
        assert_eq!(CycleStats::new(10).unwrap().quote_rate(), 0.0);
    }
}
