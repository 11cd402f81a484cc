//! Market data types consumed by the quoting pipeline.
//!
//! The gateway hands these over already normalized: bids descending,
//! asks ascending, sizes in base units.

use crate::{OrderSide, Price, Size};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One (price, size) entry of an order book side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub size: Size,
}

impl BookLevel {
    pub fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }

    /// Level carries a positive price and a positive size.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.price.is_positive() && self.size.is_positive()
    }
}

impl From<(Decimal, Decimal)> for BookLevel {
    fn from((price, size): (Decimal, Decimal)) -> Self {
        Self::new(Price::new(price), Size::new(size))
    }
}

/// Order book depth snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Bid levels, best (highest) first.
    pub bids: Vec<BookLevel>,
    /// Ask levels, best (lowest) first.
    pub asks: Vec<BookLevel>,
}

impl OrderBookSnapshot {
    pub fn new(bids: Vec<BookLevel>, asks: Vec<BookLevel>) -> Self {
        Self { bids, asks }
    }

    /// Build from raw `(price, size)` pairs.
    pub fn from_pairs(bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> Self {
        Self {
            bids: bids.iter().copied().map(BookLevel::from).collect(),
            asks: asks.iter().copied().map(BookLevel::from).collect(),
        }
    }

    /// Resting levels that a quote on `side` would join.
    ///
    /// Buy quotes sit among the bids, sell quotes among the asks.
    pub fn side(&self, side: OrderSide) -> &[BookLevel] {
        match side {
            OrderSide::Buy => &self.bids,
            OrderSide::Sell => &self.asks,
        }
    }

    /// First valid bid level price.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.iter().find(|l| l.is_valid()).map(|l| l.price)
    }

    /// First valid ask level price.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.iter().find(|l| l.is_valid()).map(|l| l.price)
    }
}

/// Everything the planner needs from the venue for one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Last traded price, when the venue reported one.
    pub last_price: Option<Price>,
    /// Order book depth; `None` when the venue returned nothing usable.
    pub book: Option<OrderBookSnapshot>,
    /// Free quote-currency balance.
    pub quote_balance_free: Decimal,
    /// Signed position in base units (positive = long). `None` = flat / spot venue.
    pub position: Option<Decimal>,
}

impl MarketSnapshot {
    pub fn new(
        last_price: Option<Price>,
        book: Option<OrderBookSnapshot>,
        quote_balance_free: Decimal,
        position: Option<Decimal>,
    ) -> Self {
        Self {
            last_price,
            book,
            quote_balance_free,
            position,
        }
    }

    /// Signed position, treating an absent position as flat.
    pub fn position_or_flat(&self) -> Decimal {
        self.position.unwrap_or(Decimal::ZERO)
    }
}

/// A fill from the account's trade history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Execution time, Unix milliseconds.
    pub timestamp_ms: i64,
    /// Executed amount in base units.
    pub amount: Size,
    pub price: Price,
    pub side: OrderSide,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book() -> OrderBookSnapshot {
        OrderBookSnapshot::from_pairs(
            &[(dec!(100), dec!(5)), (dec!(99.9), dec!(5))],
            &[(dec!(100.1), dec!(5)), (dec!(100.2), dec!(5))],
        )
    }

    #[test]
    fn test_best_prices() {
        let book = book();
        assert_eq!(book.best_bid(), Some(Price::new(dec!(100))));
        assert_eq!(book.best_ask(), Some(Price::new(dec!(100.1))));
    }

    #[test]
    fn test_best_price_skips_invalid_levels() {
        let book = OrderBookSnapshot::from_pairs(
            &[(dec!(100), dec!(0)), (dec!(99.5), dec!(2))],
            &[(dec!(0), dec!(3)), (dec!(101), dec!(1))],
        );
        assert_eq!(book.best_bid(), Some(Price::new(dec!(99.5))));
        assert_eq!(book.best_ask(), Some(Price::new(dec!(101))));
    }

    #[test]
    fn test_empty_side_has_no_best_price() {
        let book = OrderBookSnapshot::from_pairs(&[(dec!(100), dec!(1))], &[]);
        assert_eq!(book.best_bid(), Some(Price::new(dec!(100))));
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn test_side_selection() {
        let book = book();
        assert_eq!(book.side(OrderSide::Buy)[0].price.inner(), dec!(100));
        assert_eq!(book.side(OrderSide::Sell)[0].price.inner(), dec!(100.1));
    }

    #[test]
    fn test_absent_position_is_flat() {
        let snap = MarketSnapshot::new(None, Some(book()), dec!(1000), None);
        assert_eq!(snap.position_or_flat(), Decimal::ZERO);
    }
}
