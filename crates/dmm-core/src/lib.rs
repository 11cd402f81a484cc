//! Core domain types for the depth market maker.
//!
//! This crate provides fundamental types used throughout the quoting system:
//! - `Price`, `Size`: Precision-safe numeric types with tick/step alignment
//! - `OrderSide`, `OrderId`: Order identity
//! - `OrderBookSnapshot`, `MarketSnapshot`, `Trade`: Venue data handed to the core

pub mod decimal;
pub mod error;
pub mod order;
pub mod types;

pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use order::{OrderId, OrderSide};
pub use types::{BookLevel, MarketSnapshot, OrderBookSnapshot, Trade};
