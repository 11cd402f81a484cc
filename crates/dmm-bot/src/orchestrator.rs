//! One quoting cycle: snapshot, plan, reconcile both sides, count volume.

use dmm_core::OrderSide;
use dmm_gateway::{DynGateway, ErrorKind, VenueError};
use dmm_mm::{
    plan_quotes, NoQuote, OrderReconciler, PricingConfig, QuotePlan, ReconcileAction, Reconciled,
    TargetQuote, TrackedOrder, VolumeTracker, VolumeUpdate,
};
use tracing::{debug, info, warn};

use crate::error::CycleError;
use crate::snapshot::fetch_snapshot;

/// How the cycle resolved its quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleStatus {
    Quoted(QuotePlan),
    /// Planning skipped; tracked orders were withdrawn.
    NoQuote(NoQuote),
}

/// Everything a completed cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub status: CycleStatus,
    pub bid: ReconcileAction,
    pub ask: ReconcileAction,
    pub volume: VolumeUpdate,
}

impl CycleReport {
    pub fn actions(&self) -> [&ReconcileAction; 2] {
        [&self.bid, &self.ask]
    }
}

/// Owns the per-instrument mutable state: both tracked orders and the
/// volume watermark. Cycles are strictly serialized through `&mut self`.
pub struct Orchestrator {
    gateway: DynGateway,
    pricing: PricingConfig,
    reconciler: OrderReconciler,
    bid: TrackedOrder,
    ask: TrackedOrder,
    volume: VolumeTracker,
}

impl Orchestrator {
    pub fn new(gateway: DynGateway, pricing: PricingConfig) -> Self {
        Self::with_volume_tracker(gateway, pricing, VolumeTracker::new())
    }

    pub fn with_volume_tracker(
        gateway: DynGateway,
        pricing: PricingConfig,
        volume: VolumeTracker,
    ) -> Self {
        let reconciler = OrderReconciler::from_config(&pricing);
        Self {
            gateway,
            pricing,
            reconciler,
            bid: TrackedOrder::untracked(OrderSide::Buy),
            ask: TrackedOrder::untracked(OrderSide::Sell),
            volume,
        }
    }

    pub fn tracked(&self, side: OrderSide) -> &TrackedOrder {
        match side {
            OrderSide::Buy => &self.bid,
            OrderSide::Sell => &self.ask,
        }
    }

    pub fn volume(&self) -> &VolumeTracker {
        &self.volume
    }

    /// Run one full cycle.
    ///
    /// `Err` means the cycle was aborted; the caller decides on backoff or
    /// stop from [`CycleError::kind`].
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let snapshot = match fetch_snapshot(self.gateway.as_ref()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                if e.is(ErrorKind::Unclassified) {
                    warn!(error = %e, "Snapshot failed with unclassified error, withdrawing quotes");
                    self.withdraw_all().await.map_err(CycleError::Cleanup)?;
                }
                return Err(CycleError::Snapshot(e));
            }
        };

        let (status, bid, ask) = match plan_quotes(&snapshot, &self.pricing) {
            Ok(plan) => {
                let (bid, ask) = self
                    .reconcile_both(&plan.bid, &plan.ask)
                    .await
                    .map_err(CycleError::Reconcile)?;
                (CycleStatus::Quoted(plan), bid, ask)
            }
            Err(reason) => {
                info!(reason = %reason, "No quote this cycle, withdrawing resting orders");
                let (bid, ask) = self.withdraw_all().await.map_err(CycleError::Cleanup)?;
                (CycleStatus::NoQuote(reason), bid, ask)
            }
        };

        let volume = self.volume.update(self.gateway.as_ref()).await;

        debug!(
            bid = ?bid,
            ask = ?ask,
            total_volume = %self.volume.total_volume(),
            "Cycle complete"
        );

        Ok(CycleReport {
            status,
            bid,
            ask,
            volume,
        })
    }

    /// Cancel every tracked order. Used for stale cleanup and shutdown.
    pub async fn withdraw_all(&mut self) -> Result<(ReconcileAction, ReconcileAction), VenueError> {
        let idle_bid = TargetQuote::idle(OrderSide::Buy);
        let idle_ask = TargetQuote::idle(OrderSide::Sell);
        self.reconcile_both(&idle_bid, &idle_ask).await
    }

    /// Reconcile both sides concurrently. Each side's state is applied
    /// independently; a fatal error on one side leaves that side's
    /// tracked order as it was and is returned after both finish.
    async fn reconcile_both(
        &mut self,
        bid_target: &TargetQuote,
        ask_target: &TargetQuote,
    ) -> Result<(ReconcileAction, ReconcileAction), VenueError> {
        let gateway = self.gateway.as_ref();
        let (bid_out, ask_out) = tokio::join!(
            self.reconciler.reconcile(gateway, &self.bid, bid_target),
            self.reconciler.reconcile(gateway, &self.ask, ask_target),
        );

        let bid = apply(&mut self.bid, bid_out);
        let ask = apply(&mut self.ask, ask_out);
        Ok((bid?, ask?))
    }
}

fn apply(
    tracked: &mut TrackedOrder,
    outcome: Result<Reconciled, VenueError>,
) -> Result<ReconcileAction, VenueError> {
    match outcome {
        Ok(Reconciled { order, action }) => {
            *tracked = order;
            Ok(action)
        }
        Err(e) => {
            warn!(side = %tracked.side, error = %e, "Reconciliation aborted, keeping tracked order");
            Err(e)
        }
    }
}
