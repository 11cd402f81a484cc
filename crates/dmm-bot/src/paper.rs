//! Paper venue: the in-memory gateway seeded with a synthetic book.

use dmm_core::{BookLevel, OrderBookSnapshot, Price, Size};
use dmm_gateway::MockGateway;
use rust_decimal::Decimal;

use crate::config::{AppConfig, PaperConfig};

/// Symmetric book around `mid_price`, levels one tick apart starting one
/// tick away from the mid.
pub fn synthetic_book(paper: &PaperConfig, tick_size: Decimal) -> OrderBookSnapshot {
    let level = |k: usize, sign: Decimal| {
        let offset = tick_size * Decimal::from(k as u64);
        BookLevel::new(
            Price::new(paper.mid_price + sign * offset),
            Size::new(paper.level_size),
        )
    };
    let bids = (1..=paper.levels).map(|k| level(k, Decimal::NEGATIVE_ONE)).collect();
    let asks = (1..=paper.levels).map(|k| level(k, Decimal::ONE)).collect();
    OrderBookSnapshot::new(bids, asks)
}

pub fn paper_gateway(config: &AppConfig) -> MockGateway {
    let gateway = MockGateway::with_classifier(config.gateway.classifier());
    gateway.set_supports_edit(config.gateway.supports_edit);
    gateway.set_book(synthetic_book(&config.paper, config.pricing.tick_size));
    gateway.set_last_price(Some(Price::new(config.paper.mid_price)));
    gateway.set_quote_balance(config.paper.quote_balance);
    gateway.set_position(config.paper.position);
    gateway
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmm_gateway::VenueGateway;
    use rust_decimal_macros::dec;

    #[test]
    fn test_synthetic_book_shape() {
        let paper = PaperConfig {
            mid_price: dec!(100),
            levels: 3,
            level_size: dec!(2),
            ..Default::default()
        };
        let book = synthetic_book(&paper, dec!(0.5));

        assert_eq!(book.bids.len(), 3);
        assert_eq!(book.best_bid(), Some(Price::new(dec!(99.5))));
        assert_eq!(book.best_ask(), Some(Price::new(dec!(100.5))));
        assert_eq!(book.bids[2].price, Price::new(dec!(98.5)));
        assert_eq!(book.asks[2].size, Size::new(dec!(2)));
    }

    #[tokio::test]
    async fn test_paper_gateway_follows_config() {
        let mut config = AppConfig::default();
        config.gateway.supports_edit = false;
        config.paper.position = Some(dec!(1));

        let gateway = paper_gateway(&config);

        assert!(!gateway.supports_edit());
        let position = gateway.fetch_position().await.unwrap();
        assert_eq!(position, Some(dec!(1)));
    }
}
