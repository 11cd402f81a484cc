//! Depth-based two-sided quoting.
//!
//! - [`depth`]: VWAP reference price and near-price liquidity
//! - [`planner`]: market snapshot to per-side target quotes
//! - [`reconciler`]: tracked order to target with minimal venue calls
//! - [`volume`]: own-fill volume with an exclusive watermark

pub mod config;
pub mod depth;
pub mod planner;
pub mod reconciler;
pub mod volume;

pub use config::PricingConfig;
pub use depth::{depth_mid_price, volume_near_price, volume_near_price_ticks, vwap, DepthError};
pub use planner::{inventory_ratio, plan_quotes, target_spread, NoQuote, QuotePlan, TargetQuote};
pub use reconciler::{
    cancel_quietly, OrderReconciler, ReconcileAction, Reconciled, TrackedOrder,
};
pub use volume::{VolumeState, VolumeTracker, VolumeUpdate};
