//! Depth-based reference price and near-price liquidity.
//!
//! A single top-of-book order can move the simple mid by a full tick for
//! almost no cost. Averaging each side's VWAP over several levels makes the
//! reference price expensive to push around.

use dmm_core::{BookLevel, OrderBookSnapshot, Price};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DepthError {
    #[error("no usable price on either side of the book")]
    NoPrice,
}

/// Volume-weighted average price over the first `depth` valid levels.
///
/// Levels with a non-positive price or size are skipped, not counted
/// towards `depth`. Returns `None` when `depth` is zero or no volume remains.
pub fn vwap(levels: &[BookLevel], depth: usize) -> Option<Price> {
    if depth == 0 {
        return None;
    }

    let (notional, volume) = levels
        .iter()
        .filter(|level| level.is_valid())
        .take(depth)
        .fold((Decimal::ZERO, Decimal::ZERO), |(notional, volume), level| {
            (
                notional + level.price.inner() * level.size.inner(),
                volume + level.size.inner(),
            )
        });

    if volume.is_zero() {
        return None;
    }
    Some(Price::new(notional / volume))
}

/// Mid price from the average of both sides' depth VWAPs.
///
/// Falls back to the simple best bid/ask mid when either VWAP is missing.
/// The VWAP mid is clamped into `[best_bid, best_ask]` on an uncrossed book.
pub fn depth_mid_price(book: &OrderBookSnapshot, levels: usize) -> Result<Price, DepthError> {
    let best_bid = book.best_bid();
    let best_ask = book.best_ask();

    if let (Some(bid_vwap), Some(ask_vwap)) = (vwap(&book.bids, levels), vwap(&book.asks, levels))
    {
        let mid = (bid_vwap.inner() + ask_vwap.inner()) / dec!(2);
        let mid = match (best_bid, best_ask) {
            (Some(bid), Some(ask)) if bid <= ask => mid.max(bid.inner()).min(ask.inner()),
            _ => mid,
        };
        return Ok(Price::new(mid));
    }

    match (best_bid, best_ask) {
        (Some(bid), Some(ask)) => Ok(Price::new((bid.inner() + ask.inner()) / dec!(2))),
        _ => Err(DepthError::NoPrice),
    }
}

/// Total size resting within `abs_range` of `target` (inclusive).
pub fn volume_near_price(levels: &[BookLevel], target: Price, abs_range: Decimal) -> Decimal {
    if abs_range < Decimal::ZERO {
        return Decimal::ZERO;
    }
    let low = target.inner() - abs_range;
    let high = target.inner() + abs_range;

    levels
        .iter()
        .filter(|level| level.price.inner() >= low && level.price.inner() <= high)
        .map(|level| level.size.inner().max(Decimal::ZERO))
        .sum()
}

/// [`volume_near_price`] with the window expressed in ticks.
///
/// A missing or non-positive tick size yields zero liquidity.
pub fn volume_near_price_ticks(
    levels: &[BookLevel],
    target: Price,
    range_ticks: u32,
    tick_size: Option<Price>,
) -> Decimal {
    match tick_size {
        Some(tick) if tick.is_positive() => {
            volume_near_price(levels, target, Decimal::from(range_ticks) * tick.inner())
        }
        _ => Decimal::ZERO,
    }
}
