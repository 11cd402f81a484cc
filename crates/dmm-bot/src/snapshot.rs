//! Per-cycle market snapshot assembly.

use dmm_core::MarketSnapshot;
use dmm_gateway::{ErrorKind, VenueError, VenueGateway};
use tracing::{debug, warn};

/// Fetch ticker, book, balance, and position concurrently.
///
/// A failed ticker only loses the last price. A venue without positions
/// (`Unsupported`) reads as absent. Any other failure aborts the snapshot.
pub async fn fetch_snapshot(gateway: &dyn VenueGateway) -> Result<MarketSnapshot, VenueError> {
    let (ticker, book, balance, position) = tokio::join!(
        gateway.fetch_ticker(),
        gateway.fetch_order_book(),
        gateway.fetch_quote_balance(),
        gateway.fetch_position(),
    );

    let last_price = match ticker {
        Ok(price) => price,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            warn!(error = %e, "Ticker fetch failed, continuing without last price");
            None
        }
    };

    let position = match position {
        Ok(position) => position,
        Err(e) if e.is(ErrorKind::Unsupported) => {
            debug!("Venue has no positions, treating as flat");
            None
        }
        Err(e) => return Err(e),
    };

    let book = book?;
    let balance = balance?;

    Ok(MarketSnapshot::new(
        last_price,
        Some(book).filter(|b| !b.bids.is_empty() || !b.asks.is_empty()),
        balance,
        position,
    ))
}
