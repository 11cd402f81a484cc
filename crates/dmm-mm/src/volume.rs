//! Own-fill volume accounting.

use dmm_gateway::{ErrorKind, VenueGateway};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Cumulative traded base volume and the exclusive lower bound for new fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeState {
    pub total_base_volume: Decimal,
    /// Fills at or below this timestamp (ms) are already counted.
    pub last_trade_watermark: i64,
}

/// Result of one [`VolumeTracker::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeUpdate {
    NoNewTrades,
    Added {
        trades: usize,
        volume: Decimal,
        watermark: i64,
    },
    /// Fetch failed; state untouched, retried next cycle.
    Failed(ErrorKind),
}

#[derive(Debug, Clone)]
pub struct VolumeTracker {
    state: VolumeState,
}

impl Default for VolumeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeTracker {
    /// Zero watermark: the first update counts the whole fill history.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(watermark_ms: i64) -> Self {
        Self {
            state: VolumeState {
                total_base_volume: Decimal::ZERO,
                last_trade_watermark: watermark_ms,
            },
        }
    }

    pub fn state(&self) -> VolumeState {
        self.state
    }

    pub fn total_volume(&self) -> Decimal {
        self.state.total_base_volume
    }

    /// Pull fills newer than the watermark and add their amounts.
    ///
    /// The watermark moves to `max_timestamp + 1` so the next fetch excludes
    /// the last counted fill. Failures are logged and never fatal.
    pub async fn update(&mut self, gateway: &dyn VenueGateway) -> VolumeUpdate {
        let watermark = self.state.last_trade_watermark;
        let trades = match gateway.fetch_trades_since(watermark).await {
            Ok(trades) => trades,
            Err(e) => {
                warn!(watermark, error = %e, "Trade history fetch failed, will retry");
                return VolumeUpdate::Failed(e.kind);
            }
        };

        let (count, volume, max_ts) = trades
            .iter()
            .filter(|t| t.timestamp_ms > watermark)
            .fold((0usize, Decimal::ZERO, watermark), |(n, vol, max_ts), t| {
                (n + 1, vol + t.amount.inner(), max_ts.max(t.timestamp_ms))
            });

        if volume <= Decimal::ZERO {
            return VolumeUpdate::NoNewTrades;
        }

        self.state.total_base_volume += volume;
        self.state.last_trade_watermark = max_ts + 1;
        debug!(
            trades = count,
            volume = %volume,
            total = %self.state.total_base_volume,
            watermark = self.state.last_trade_watermark,
            "Volume updated"
        );
        VolumeUpdate::Added {
            trades: count,
            volume,
            watermark: self.state.last_trade_watermark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmm_core::{OrderSide, Price, Size, Trade};
    use dmm_gateway::{MockGateway, Operation};
    use rust_decimal_macros::dec;

    fn trade(ts: i64, amount: Decimal) -> Trade {
        Trade {
            timestamp_ms: ts,
            amount: Size::new(amount),
            price: Price::new(dec!(100)),
            side: OrderSide::Buy,
        }
    }

    #[tokio::test]
    async fn test_counts_new_trades_and_advances_watermark() {
        let gateway = MockGateway::new();
        gateway.push_trade(trade(1_001, dec!(0.5)));
        gateway.push_trade(trade(1_005, dec!(0.25)));
        let mut tracker = VolumeTracker::starting_at(1_000);

        let update = tracker.update(&gateway).await;

        assert_eq!(
            update,
            VolumeUpdate::Added {
                trades: 2,
                volume: dec!(0.75),
                watermark: 1_006,
            }
        );
        assert_eq!(tracker.total_volume(), dec!(0.75));
        assert_eq!(tracker.state().last_trade_watermark, 1_006);
    }

    #[tokio::test]
    async fn test_trade_at_watermark_is_excluded() {
        let gateway = MockGateway::new();
        gateway.push_trade(trade(1_000, dec!(3)));
        let mut tracker = VolumeTracker::starting_at(1_000);

        assert_eq!(tracker.update(&gateway).await, VolumeUpdate::NoNewTrades);
        assert_eq!(tracker.total_volume(), Decimal::ZERO);
        assert_eq!(tracker.state().last_trade_watermark, 1_000);
    }

    #[tokio::test]
    async fn test_repeated_updates_do_not_double_count() {
        let gateway = MockGateway::new();
        gateway.push_trade(trade(2_000, dec!(1)));
        let mut tracker = VolumeTracker::starting_at(1_000);

        tracker.update(&gateway).await;
        assert_eq!(tracker.update(&gateway).await, VolumeUpdate::NoNewTrades);
        assert_eq!(tracker.total_volume(), dec!(1));

        gateway.push_trade(trade(3_000, dec!(2)));
        tracker.update(&gateway).await;
        assert_eq!(tracker.total_volume(), dec!(3));
    }

    #[tokio::test]
    async fn test_failure_leaves_state_untouched() {
        let gateway = MockGateway::new();
        gateway.push_trade(trade(2_000, dec!(1)));
        gateway.fail_next_raw(Operation::Trades, "429 too many requests");
        let mut tracker = VolumeTracker::starting_at(1_000);
        let before = tracker.state();

        let update = tracker.update(&gateway).await;

        assert_eq!(update, VolumeUpdate::Failed(ErrorKind::Transient));
        assert_eq!(tracker.state(), before);

        // recovered on the next cycle
        tracker.update(&gateway).await;
        assert_eq!(tracker.total_volume(), dec!(1));
    }

    #[tokio::test]
    async fn test_zero_amount_trades_do_not_move_watermark() {
        let gateway = MockGateway::new();
        gateway.push_trade(trade(2_000, Decimal::ZERO));
        let mut tracker = VolumeTracker::starting_at(1_000);

        assert_eq!(tracker.update(&gateway).await, VolumeUpdate::NoNewTrades);
        assert_eq!(tracker.state().last_trade_watermark, 1_000);
    }
}
