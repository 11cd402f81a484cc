//! Pricing and sizing configuration.

use dmm_core::{CoreError, Price, Size};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Quote pricing/sizing parameters for one instrument.
///
/// Prices and spreads are in quote currency, amounts in base units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Target spread as a fraction of mid (0.002 = 0.2%).
    #[serde(default = "default_target_spread_pct")]
    pub target_spread_pct: Decimal,

    /// Absolute spread floor.
    #[serde(default = "default_min_spread")]
    pub min_spread: Decimal,

    /// Absolute spread ceiling.
    #[serde(default = "default_max_spread")]
    pub max_spread: Decimal,

    /// Inventory skew strength (0 = no skew).
    /// Skew = spread × inventory_ratio × intensity, applied to both quotes.
    #[serde(default = "default_inventory_skew_intensity")]
    pub inventory_skew_intensity: Decimal,

    /// Position size (base units) at which the inventory ratio saturates and
    /// the exposure-increasing side is switched off. 0 disables both.
    #[serde(default = "default_position_limit")]
    pub position_limit: Decimal,

    /// Full order amount per side.
    #[serde(default = "default_base_amount")]
    pub base_amount: Decimal,

    /// Resting volume near our price needed to quote the full base amount.
    #[serde(default = "default_liquidity_volume_threshold")]
    pub liquidity_volume_threshold: Decimal,

    /// Half-width, in ticks, of the window used to measure near-price liquidity.
    #[serde(default = "default_range_ticks_for_liquidity")]
    pub range_ticks_for_liquidity: u32,

    /// Minimum amount × price for an order to be worth placing.
    #[serde(default = "default_min_notional_value")]
    pub min_notional_value: Decimal,

    /// Venue price increment.
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,

    /// Venue amount increment.
    #[serde(default = "default_step_size")]
    pub step_size: Decimal,

    /// Venue minimum order amount.
    #[serde(default = "default_min_amount")]
    pub min_amount: Decimal,

    /// Decimal places the venue accepts for prices.
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,

    /// Decimal places the venue accepts for amounts.
    #[serde(default = "default_amount_decimals")]
    pub amount_decimals: u32,

    /// Book levels per side folded into the depth VWAP.
    #[serde(default = "default_vwap_levels")]
    pub vwap_levels: usize,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            target_spread_pct: default_target_spread_pct(),
            min_spread: default_min_spread(),
            max_spread: default_max_spread(),
            inventory_skew_intensity: default_inventory_skew_intensity(),
            position_limit: default_position_limit(),
            base_amount: default_base_amount(),
            liquidity_volume_threshold: default_liquidity_volume_threshold(),
            range_ticks_for_liquidity: default_range_ticks_for_liquidity(),
            min_notional_value: default_min_notional_value(),
            tick_size: default_tick_size(),
            step_size: default_step_size(),
            min_amount: default_min_amount(),
            price_decimals: default_price_decimals(),
            amount_decimals: default_amount_decimals(),
            vwap_levels: default_vwap_levels(),
        }
    }
}

impl PricingConfig {
    #[inline]
    pub fn tick(&self) -> Price {
        Price::new(self.tick_size)
    }

    #[inline]
    pub fn step(&self) -> Size {
        Size::new(self.step_size)
    }

    #[inline]
    pub fn min_size(&self) -> Size {
        Size::new(self.min_amount)
    }

    /// Reject parameter combinations the planner cannot honor.
    pub fn validate(&self) -> dmm_core::Result<()> {
        let non_negative = [
            ("target_spread_pct", self.target_spread_pct),
            ("min_spread", self.min_spread),
            ("max_spread", self.max_spread),
            ("inventory_skew_intensity", self.inventory_skew_intensity),
            ("position_limit", self.position_limit),
            ("liquidity_volume_threshold", self.liquidity_volume_threshold),
            ("min_notional_value", self.min_notional_value),
        ];
        for (name, value) in non_negative {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be >= 0, got {value}"
                )));
            }
        }
        if self.min_spread > self.max_spread {
            return Err(CoreError::InvalidConfig(format!(
                "min_spread {} exceeds max_spread {}",
                self.min_spread, self.max_spread
            )));
        }
        if !self.tick().is_positive() {
            return Err(CoreError::InvalidPrice(format!(
                "tick_size must be > 0, got {}",
                self.tick_size
            )));
        }
        if !self.step().is_positive() {
            return Err(CoreError::InvalidSize(format!(
                "step_size must be > 0, got {}",
                self.step_size
            )));
        }
        if self.tick_size.normalize().scale() > self.price_decimals {
            return Err(CoreError::InvalidPrice(format!(
                "tick_size {} is finer than price_decimals {}",
                self.tick_size, self.price_decimals
            )));
        }
        if self.step_size.normalize().scale() > self.amount_decimals {
            return Err(CoreError::InvalidSize(format!(
                "step_size {} is finer than amount_decimals {}",
                self.step_size, self.amount_decimals
            )));
        }
        if !Size::new(self.base_amount).is_positive() {
            return Err(CoreError::InvalidSize(format!(
                "base_amount must be > 0, got {}",
                self.base_amount
            )));
        }
        if self.min_amount.is_sign_negative() && !self.min_amount.is_zero() {
            return Err(CoreError::InvalidSize(format!(
                "min_amount must be >= 0, got {}",
                self.min_amount
            )));
        }
        if self.vwap_levels == 0 {
            return Err(CoreError::InvalidConfig("vwap_levels must be >= 1".to_string()));
        }
        Ok(())
    }
}

fn default_target_spread_pct() -> Decimal {
    Decimal::new(2, 3) // 0.2%
}
fn default_min_spread() -> Decimal {
    Decimal::new(1, 2) // 0.01
}
fn default_max_spread() -> Decimal {
    Decimal::new(100, 0)
}
fn default_inventory_skew_intensity() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_position_limit() -> Decimal {
    Decimal::ONE
}
fn default_base_amount() -> Decimal {
    Decimal::new(1, 1) // 0.1
}
fn default_liquidity_volume_threshold() -> Decimal {
    Decimal::new(10, 0)
}
fn default_range_ticks_for_liquidity() -> u32 {
    10
}
fn default_min_notional_value() -> Decimal {
    Decimal::new(5, 0) // 5 quote units
}
fn default_tick_size() -> Decimal {
    Decimal::new(1, 2) // 0.01
}
fn default_step_size() -> Decimal {
    Decimal::new(1, 3) // 0.001
}
fn default_min_amount() -> Decimal {
    Decimal::new(1, 3) // 0.001
}
fn default_price_decimals() -> u32 {
    2
}
fn default_amount_decimals() -> u32 {
    3
}
fn default_vwap_levels() -> usize {
    5
}
