//! Shared venue and config fixtures.

#![allow(dead_code)]

use std::sync::Arc;

use dmm_bot::Orchestrator;
use dmm_core::OrderBookSnapshot;
use dmm_gateway::{DynGateway, MockGateway};
use dmm_mm::{PricingConfig, VolumeTracker};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Zero-skew pricing with a fixed 0.2 spread over the reference book.
pub fn pricing() -> PricingConfig {
    PricingConfig {
        target_spread_pct: Decimal::ZERO,
        min_spread: dec!(0.2),
        max_spread: dec!(1),
        inventory_skew_intensity: Decimal::ZERO,
        position_limit: dec!(10),
        base_amount: dec!(1),
        liquidity_volume_threshold: dec!(10),
        range_ticks_for_liquidity: 10,
        min_notional_value: dec!(10),
        tick_size: dec!(0.01),
        step_size: dec!(0.001),
        min_amount: dec!(0.001),
        price_decimals: 2,
        amount_decimals: 3,
        vwap_levels: 2,
    }
}

/// bids 100 / 99.9, asks 100.1 / 100.2, five each.
pub fn reference_book() -> OrderBookSnapshot {
    OrderBookSnapshot::from_pairs(
        &[(dec!(100), dec!(5)), (dec!(99.9), dec!(5))],
        &[(dec!(100.1), dec!(5)), (dec!(100.2), dec!(5))],
    )
}

/// Shifted copy of the reference book.
pub fn book_shifted(by: Decimal) -> OrderBookSnapshot {
    OrderBookSnapshot::from_pairs(
        &[(dec!(100) + by, dec!(5)), (dec!(99.9) + by, dec!(5))],
        &[(dec!(100.1) + by, dec!(5)), (dec!(100.2) + by, dec!(5))],
    )
}

pub fn venue() -> Arc<MockGateway> {
    let mock = Arc::new(MockGateway::new());
    mock.set_book(reference_book());
    mock.set_quote_balance(dec!(1000));
    mock.set_position(Some(dec!(2)));
    mock
}

pub fn orchestrator(mock: &Arc<MockGateway>) -> Orchestrator {
    let gateway: DynGateway = mock.clone();
    Orchestrator::with_volume_tracker(gateway, pricing(), VolumeTracker::starting_at(0))
}
