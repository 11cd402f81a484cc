//! Venue gateway trait.
//!
//! The only collaborator the quoting core talks to. Implementations own
//! transport, auth, rate limiting and text-to-kind error mapping; the core
//! sees normalized data and [`VenueError`]s.

use std::pin::Pin;
use std::sync::Arc;

use dmm_core::{OrderBookSnapshot, OrderId, OrderSide, Price, Size, Trade};
use rust_decimal::Decimal;

use crate::error::GatewayResult;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Trait for a single-instrument venue connection.
pub trait VenueGateway: Send + Sync {
    /// Last traded price, if the venue reports one.
    fn fetch_ticker(&self) -> BoxFuture<'_, GatewayResult<Option<Price>>>;

    /// Normalized order book depth.
    fn fetch_order_book(&self) -> BoxFuture<'_, GatewayResult<OrderBookSnapshot>>;

    /// Free balance of the quote currency.
    fn fetch_quote_balance(&self) -> BoxFuture<'_, GatewayResult<Decimal>>;

    /// Signed position size. `Ok(None)` on venues without derivatives.
    fn fetch_position(&self) -> BoxFuture<'_, GatewayResult<Option<Decimal>>>;

    /// Place a resting limit order and return the exchange id.
    fn place_limit_order(
        &self,
        side: OrderSide,
        amount: Size,
        price: Price,
    ) -> BoxFuture<'_, GatewayResult<OrderId>>;

    /// Amend a resting order in place. The id stays valid on success.
    fn edit_order<'a>(
        &'a self,
        order_id: &'a OrderId,
        side: OrderSide,
        amount: Size,
        price: Price,
    ) -> BoxFuture<'a, GatewayResult<()>>;

    /// Cancel a resting order. Unknown ids fail with `ErrorKind::NotFound`.
    fn cancel_order<'a>(&'a self, order_id: &'a OrderId) -> BoxFuture<'a, GatewayResult<()>>;

    /// Own fills at or after `since_ms`, oldest first.
    fn fetch_trades_since(&self, since_ms: i64) -> BoxFuture<'_, GatewayResult<Vec<Trade>>>;

    /// Whether `edit_order` is available on this venue.
    fn supports_edit(&self) -> bool;
}

/// Arc wrapper for gateway trait objects.
pub type DynGateway = Arc<dyn VenueGateway>;
