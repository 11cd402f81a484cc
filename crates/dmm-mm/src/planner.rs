//! Quote planning.
//!
//! Turns a market snapshot into one target quote per side:
//! - Depth mid price (manipulation-resistant reference)
//! - Spread clamped into `[min_spread, max_spread]`
//! - Inventory skew (both quotes shift against the held position)
//! - Tick alignment with crossed-quote correction
//! - Liquidity-scaled sizing, then position / notional / balance gates
//!
//! Every gate is a plain branch with a deterministic outcome. Only a missing
//! book, an unpriceable book, or quotes that stay crossed abort planning.

use dmm_core::{MarketSnapshot, OrderBookSnapshot, OrderSide, Price, Size};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;
use tracing::debug;

use crate::config::PricingConfig;
use crate::depth::{depth_mid_price, volume_near_price_ticks, DepthError};

/// Why nothing was planned this cycle.
///
/// Any resting orders should still be cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoQuote {
    #[error("order book missing")]
    MissingBook,

    #[error("order book has no {0} levels")]
    EmptySide(&'static str),

    #[error("order book yields no price")]
    NoPrice,

    #[error("quotes still crossed after tick widening: buy {buy} >= sell {sell}")]
    CrossedBook { buy: Price, sell: Price },
}

impl From<DepthError> for NoQuote {
    fn from(err: DepthError) -> Self {
        match err {
            DepthError::NoPrice => Self::NoPrice,
        }
    }
}

/// Target state for one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetQuote {
    pub side: OrderSide,
    /// Tick-aligned price.
    pub price: Price,
    /// Step-aligned amount; zero whenever `should_place` is false.
    pub amount: Size,
    pub should_place: bool,
}

impl TargetQuote {
    fn new(side: OrderSide, price: Price, amount: Size) -> Self {
        Self {
            side,
            price,
            amount,
            should_place: true,
        }
    }

    /// Target that asks for no resting order on `side`.
    pub fn idle(side: OrderSide) -> Self {
        Self {
            side,
            price: Price::ZERO,
            amount: Size::ZERO,
            should_place: false,
        }
    }

    fn forbid(&mut self, reason: &'static str) {
        if self.should_place {
            debug!(side = %self.side, price = %self.price, amount = %self.amount, reason, "Quote side gated out");
        }
        self.should_place = false;
        self.amount = Size::ZERO;
    }

    /// Order notional at the target price.
    pub fn notional(&self) -> Decimal {
        self.amount.notional(self.price)
    }
}

/// Planned quotes for both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotePlan {
    pub bid: TargetQuote,
    pub ask: TargetQuote,
    /// Depth mid used as reference.
    pub mid: Price,
    /// Spread after clamping, before skew and alignment.
    pub spread: Decimal,
    /// Clamped position / position_limit.
    pub inventory_ratio: Decimal,
}

impl QuotePlan {
    pub fn side(&self, side: OrderSide) -> &TargetQuote {
        match side {
            OrderSide::Buy => &self.bid,
            OrderSide::Sell => &self.ask,
        }
    }
}

/// Plan bid and ask targets for one cycle.
///
/// The position is read from the snapshot; an absent position counts as flat.
pub fn plan_quotes(snapshot: &MarketSnapshot, config: &PricingConfig) -> Result<QuotePlan, NoQuote> {
    let book = snapshot.book.as_ref().ok_or(NoQuote::MissingBook)?;
    if book.bids.is_empty() {
        return Err(NoQuote::EmptySide("bid"));
    }
    if book.asks.is_empty() {
        return Err(NoQuote::EmptySide("ask"));
    }

    let mid = depth_mid_price(book, config.vwap_levels)?;
    let spread = target_spread(mid, config);
    let position = snapshot.position_or_flat();
    let ratio = inventory_ratio(position, config.position_limit);

    let skew = if config.inventory_skew_intensity > Decimal::ZERO
        && config.position_limit > Decimal::ZERO
    {
        spread * ratio * config.inventory_skew_intensity
    } else {
        Decimal::ZERO
    };

    let half = spread / dec!(2);
    let raw_buy = Price::new(mid.inner() - half - skew);
    let raw_sell = Price::new(mid.inner() + half - skew);
    let (buy_price, sell_price) = align_quotes(raw_buy, raw_sell, config)?;

    let mut bid = TargetQuote::new(
        OrderSide::Buy,
        buy_price,
        liquidity_scaled_amount(book, OrderSide::Buy, buy_price, config),
    );
    let mut ask = TargetQuote::new(
        OrderSide::Sell,
        sell_price,
        liquidity_scaled_amount(book, OrderSide::Sell, sell_price, config),
    );

    apply_position_limit(&mut bid, &mut ask, position, config);

    bid.amount = align_amount(bid.amount, config);
    ask.amount = align_amount(ask.amount, config);

    apply_min_notional(&mut bid, config);
    apply_min_notional(&mut ask, config);
    apply_balance_gate(&mut bid, snapshot.quote_balance_free);
    apply_sell_inventory_gate(&mut ask, position, config);

    debug!(
        mid = %mid,
        spread = %spread,
        skew = %skew,
        ratio = %ratio,
        bid_px = %bid.price,
        bid_sz = %bid.amount,
        bid_on = bid.should_place,
        ask_px = %ask.price,
        ask_sz = %ask.amount,
        ask_on = ask.should_place,
        "Quote plan computed"
    );

    Ok(QuotePlan {
        bid,
        ask,
        mid,
        spread,
        inventory_ratio: ratio,
    })
}

/// `clamp(mid × target_spread_pct, [min_spread, max_spread])`.
pub fn target_spread(mid: Price, config: &PricingConfig) -> Decimal {
    (mid.inner() * config.target_spread_pct)
        .max(config.min_spread)
        .min(config.max_spread)
}

/// Position as a fraction of the limit, clamped to [-1, 1].
///
/// A non-positive limit disables skew and yields zero.
pub fn inventory_ratio(position: Decimal, position_limit: Decimal) -> Decimal {
    if position_limit <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (position / position_limit).max(dec!(-1)).min(dec!(1))
}

/// Tick-align both prices, widening by one tick per side if they cross.
///
/// Buys align down and sells align up, so alignment never tightens the spread.
fn align_quotes(
    raw_buy: Price,
    raw_sell: Price,
    config: &PricingConfig,
) -> Result<(Price, Price), NoQuote> {
    let tick = config.tick();
    let align_buy = |p: Price| p.floor_to_tick(tick).round_dp(config.price_decimals);
    let align_sell = |p: Price| p.ceil_to_tick(tick).round_dp(config.price_decimals);

    let mut buy = align_buy(raw_buy);
    let mut sell = align_sell(raw_sell);

    if buy >= sell {
        buy = align_buy(buy - tick);
    }
    if buy >= sell {
        sell = align_sell(sell + tick);
    }
    if buy >= sell {
        return Err(NoQuote::CrossedBook { buy, sell });
    }
    Ok((buy, sell))
}

/// Base amount scaled down when the book is thin around our price.
fn liquidity_scaled_amount(
    book: &OrderBookSnapshot,
    side: OrderSide,
    price: Price,
    config: &PricingConfig,
) -> Size {
    let liquidity = volume_near_price_ticks(
        book.side(side),
        price,
        config.range_ticks_for_liquidity,
        Some(config.tick()),
    );
    let scale = if config.liquidity_volume_threshold > Decimal::ZERO {
        (liquidity / config.liquidity_volume_threshold).min(Decimal::ONE)
    } else {
        Decimal::ONE
    };
    Size::new(config.base_amount * scale)
}

/// Stop the side that adds exposure once the limit is reached and size the
/// reducing side to at least flatten the position.
fn apply_position_limit(
    bid: &mut TargetQuote,
    ask: &mut TargetQuote,
    position: Decimal,
    config: &PricingConfig,
) {
    if config.position_limit <= Decimal::ZERO || position.abs() < config.position_limit {
        return;
    }
    let exposure = Size::new(position.abs());
    if position > Decimal::ZERO {
        bid.forbid("position limit (long)");
        ask.amount = ask.amount.max(exposure);
    } else if position < Decimal::ZERO {
        ask.forbid("position limit (short)");
        bid.amount = bid.amount.max(exposure);
    }
}

fn align_amount(amount: Size, config: &PricingConfig) -> Size {
    amount
        .floor_to_step(config.step())
        .trunc_dp(config.amount_decimals)
}

fn apply_min_notional(quote: &mut TargetQuote, config: &PricingConfig) {
    if !quote.should_place {
        return;
    }
    if !quote.amount.is_positive() || !quote.price.is_positive() {
        quote.forbid("non-positive amount or price");
    } else if quote.notional() < config.min_notional_value {
        quote.forbid("below min notional");
    }
}

fn apply_balance_gate(bid: &mut TargetQuote, quote_balance_free: Decimal) {
    if bid.should_place && bid.notional() > quote_balance_free {
        bid.forbid("insufficient quote balance");
    }
}

/// When flat or long, never offer more than is held (one step of tolerance).
fn apply_sell_inventory_gate(ask: &mut TargetQuote, position: Decimal, config: &PricingConfig) {
    if position < Decimal::ZERO || !ask.should_place {
        return;
    }
    if ask.amount.inner() <= position + config.step_size {
        return;
    }

    let held = align_amount(Size::new(position), config);
    ask.amount = held;
    if held < config.min_size() || !held.is_positive() {
        ask.forbid("held position below min amount");
    } else if ask.notional() < config.min_notional_value {
        ask.forbid("held position below min notional");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmm_core::OrderBookSnapshot;

    fn test_config() -> PricingConfig {
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

    fn book() -> OrderBookSnapshot {
        OrderBookSnapshot::from_pairs(
            &[(dec!(100), dec!(5)), (dec!(99.9), dec!(5))],
            &[(dec!(100.1), dec!(5)), (dec!(100.2), dec!(5))],
        )
    }

    fn snapshot(position: Option<Decimal>, balance: Decimal) -> MarketSnapshot {
        MarketSnapshot::new(None, Some(book()), balance, position)
    }

    #[test]
    fn test_baseline_two_sided_plan() {
        let plan = plan_quotes(&snapshot(Some(dec!(2)), dec!(1000)), &test_config()).unwrap();

        assert_eq!(plan.mid.inner(), dec!(100.05));
        assert_eq!(plan.spread, dec!(0.2));
        assert_eq!(plan.bid.price.inner(), dec!(99.95));
        assert_eq!(plan.ask.price.inner(), dec!(100.15));
        assert_eq!(plan.bid.amount.inner(), dec!(1));
        assert_eq!(plan.ask.amount.inner(), dec!(1));
        assert!(plan.bid.should_place);
        assert!(plan.ask.should_place);
    }

    #[test]
    fn test_coarse_tick_keeps_prices_on_grid() {
        let config = PricingConfig {
            tick_size: dec!(0.25),
            ..test_config()
        };
        assert!(config.validate().is_ok());

        let plan = plan_quotes(&snapshot(Some(dec!(2)), dec!(1000)), &config).unwrap();

        // raw 99.95 / 100.15 widen outward to the 0.25 grid
        assert_eq!(plan.bid.price.inner(), dec!(99.75));
        assert_eq!(plan.ask.price.inner(), dec!(100.25));
        assert!((plan.bid.price.inner() % config.tick_size).is_zero());
        assert!((plan.ask.price.inner() % config.tick_size).is_zero());
    }

    #[test]
    fn test_spread_is_clamped() {
        let config = PricingConfig {
            target_spread_pct: dec!(0.5),
            ..test_config()
        };
        assert_eq!(target_spread(Price::new(dec!(100)), &config), dec!(1));

        let config = PricingConfig {
            target_spread_pct: dec!(0.0001),
            ..test_config()
        };
        assert_eq!(target_spread(Price::new(dec!(100)), &config), dec!(0.2));
    }

    #[test]
    fn test_inventory_ratio_is_clamped() {
        assert_eq!(inventory_ratio(dec!(50), dec!(1)), dec!(1));
        assert_eq!(inventory_ratio(dec!(-50), dec!(1)), dec!(-1));
        assert_eq!(inventory_ratio(dec!(0.5), dec!(2)), dec!(0.25));
        assert_eq!(inventory_ratio(dec!(3), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_inventory_skew_shifts_both_quotes_down_when_long() {
        let config = PricingConfig {
            min_spread: dec!(10),
            max_spread: dec!(10),
            inventory_skew_intensity: dec!(0.5),
            position_limit: dec!(1),
            ..test_config()
        };

        let flat = plan_quotes(&snapshot(Some(Decimal::ZERO), dec!(1000)), &config).unwrap();
        let long = plan_quotes(&snapshot(Some(dec!(1)), dec!(1000)), &config).unwrap();

        assert_eq!(long.inventory_ratio, dec!(1));
        // skew = 10 × 1 × 0.5 = 5
        assert_eq!(flat.bid.price.inner() - long.bid.price.inner(), dec!(5));
        assert_eq!(flat.ask.price.inner() - long.ask.price.inner(), dec!(5));
        assert_eq!(long.bid.price.inner(), dec!(90.05));
        assert_eq!(long.ask.price.inner(), dec!(100.05));
    }

    #[test]
    fn test_inventory_skew_shifts_both_quotes_up_when_short() {
        let config = PricingConfig {
            min_spread: dec!(10),
            max_spread: dec!(10),
            inventory_skew_intensity: dec!(0.5),
            position_limit: dec!(4),
            ..test_config()
        };
        let plan = plan_quotes(&snapshot(Some(dec!(-2)), dec!(1000)), &config).unwrap();
        // ratio -0.5, skew -2.5
        assert_eq!(plan.bid.price.inner(), dec!(97.55));
        assert_eq!(plan.ask.price.inner(), dec!(107.55));
    }

    #[test]
    fn test_zero_spread_is_widened_by_one_tick() {
        let config = PricingConfig {
            min_spread: Decimal::ZERO,
            max_spread: Decimal::ZERO,
            ..test_config()
        };
        let plan = plan_quotes(&snapshot(Some(dec!(2)), dec!(1000)), &config).unwrap();
        assert_eq!(plan.bid.price.inner(), dec!(100.04));
        assert_eq!(plan.ask.price.inner(), dec!(100.05));
        assert!(plan.bid.price < plan.ask.price);
    }

    #[test]
    fn test_uncorrectable_cross_without_tick() {
        let config = PricingConfig {
            min_spread: Decimal::ZERO,
            max_spread: Decimal::ZERO,
            tick_size: Decimal::ZERO,
            ..test_config()
        };
        let err = plan_quotes(&snapshot(Some(dec!(2)), dec!(1000)), &config).unwrap_err();
        assert!(matches!(err, NoQuote::CrossedBook { .. }));
    }

    #[test]
    fn test_buy_below_sell_across_spreads() {
        let config = test_config();
        for spread in [dec!(0), dec!(0.001), dec!(0.01), dec!(0.013), dec!(0.5)] {
            let config = PricingConfig {
                min_spread: spread,
                max_spread: spread,
                ..config.clone()
            };
            let plan = plan_quotes(&snapshot(Some(dec!(2)), dec!(1000)), &config).unwrap();
            assert!(plan.bid.price < plan.ask.price, "spread {spread}");
        }
    }

    #[test]
    fn test_missing_or_empty_book_is_rejected() {
        let config = test_config();
        let missing = MarketSnapshot::new(None, None, dec!(1000), None);
        assert_eq!(plan_quotes(&missing, &config), Err(NoQuote::MissingBook));

        let one_sided = MarketSnapshot::new(
            None,
            Some(OrderBookSnapshot::from_pairs(&[(dec!(100), dec!(1))], &[])),
            dec!(1000),
            None,
        );
        assert_eq!(plan_quotes(&one_sided, &config), Err(NoQuote::EmptySide("ask")));

        let unpriceable = MarketSnapshot::new(
            None,
            Some(OrderBookSnapshot::from_pairs(
                &[(dec!(100), dec!(0))],
                &[(dec!(101), dec!(0))],
            )),
            dec!(1000),
            None,
        );
        assert_eq!(plan_quotes(&unpriceable, &config), Err(NoQuote::NoPrice));
    }

    #[test]
    fn test_thin_book_scales_amount() {
        let config = PricingConfig {
            liquidity_volume_threshold: dec!(20),
            ..test_config()
        };
        let plan = plan_quotes(&snapshot(Some(dec!(2)), dec!(1000)), &config).unwrap();
        // 10 resting near each quote against a threshold of 20
        assert_eq!(plan.bid.amount.inner(), dec!(0.5));
        assert_eq!(plan.ask.amount.inner(), dec!(0.5));
    }

    #[test]
    fn test_zero_threshold_quotes_full_size() {
        let config = PricingConfig {
            liquidity_volume_threshold: Decimal::ZERO,
            range_ticks_for_liquidity: 0,
            ..test_config()
        };
        let plan = plan_quotes(&snapshot(Some(dec!(2)), dec!(1000)), &config).unwrap();
        assert_eq!(plan.bid.amount.inner(), dec!(1));
    }

    #[test]
    fn test_long_at_limit_stops_bids_and_sizes_ask_to_flatten() {
        let plan = plan_quotes(&snapshot(Some(dec!(12)), dec!(1000)), &test_config()).unwrap();
        assert!(!plan.bid.should_place);
        assert_eq!(plan.bid.amount, Size::ZERO);
        assert!(plan.ask.should_place);
        assert_eq!(plan.ask.amount.inner(), dec!(12));
    }

    #[test]
    fn test_short_at_limit_stops_asks_and_sizes_bid_to_flatten() {
        let plan = plan_quotes(&snapshot(Some(dec!(-12)), dec!(10000)), &test_config()).unwrap();
        assert!(!plan.ask.should_place);
        assert!(plan.bid.should_place);
        assert_eq!(plan.bid.amount.inner(), dec!(12));
    }

    #[test]
    fn test_min_notional_gate() {
        let config = PricingConfig {
            min_notional_value: dec!(200),
            ..test_config()
        };
        let plan = plan_quotes(&snapshot(Some(dec!(2)), dec!(1000)), &config).unwrap();
        assert!(!plan.bid.should_place);
        assert!(!plan.ask.should_place);
        assert_eq!(plan.bid.amount, Size::ZERO);
        assert_eq!(plan.ask.amount, Size::ZERO);
    }

    #[test]
    fn test_balance_gate_blocks_only_buy() {
        let plan = plan_quotes(&snapshot(Some(dec!(2)), dec!(50)), &test_config()).unwrap();
        assert!(!plan.bid.should_place);
        assert_eq!(plan.bid.amount, Size::ZERO);
        assert!(plan.ask.should_place);
    }

    #[test]
    fn test_sell_clamped_to_held_position() {
        let plan = plan_quotes(&snapshot(Some(dec!(0.3004)), dec!(1000)), &test_config()).unwrap();
        assert!(plan.ask.should_place);
        assert_eq!(plan.ask.amount.inner(), dec!(0.3));
    }

    #[test]
    fn test_sell_within_step_tolerance_is_kept() {
        let plan = plan_quotes(&snapshot(Some(dec!(0.9995)), dec!(1000)), &test_config()).unwrap();
        assert_eq!(plan.ask.amount.inner(), dec!(1));
    }

    #[test]
    fn test_flat_position_forbids_sell() {
        let plan = plan_quotes(&snapshot(None, dec!(1000)), &test_config()).unwrap();
        assert!(!plan.ask.should_place);
        assert_eq!(plan.ask.amount, Size::ZERO);
        assert!(plan.bid.should_place);
    }

    #[test]
    fn test_clamped_sell_below_min_notional_is_forbidden() {
        // 0.05 held × ~100 = ~5 < 10 notional
        let plan = plan_quotes(&snapshot(Some(dec!(0.05)), dec!(1000)), &test_config()).unwrap();
        assert!(!plan.ask.should_place);
    }

    #[test]
    fn test_amounts_are_step_multiples() {
        let config = PricingConfig {
            base_amount: dec!(0.123456),
            ..test_config()
        };
        let plan = plan_quotes(&snapshot(Some(dec!(5)), dec!(1000)), &config).unwrap();
        for quote in [&plan.bid, &plan.ask] {
            assert!((quote.amount.inner() % config.step_size).is_zero());
            assert!(quote.amount.inner() >= Decimal::ZERO);
        }
        assert_eq!(plan.bid.amount.inner(), dec!(0.123));
    }
}
