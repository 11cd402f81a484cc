//! Order-related types and identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Exchange-assigned order identifier.
///
/// Venues disagree on the shape (numeric, UUID, hash), so the id is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_side_serde_lowercase() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            side: OrderSide,
        }
        let w: Wrapper = toml::from_str("side = \"sell\"").unwrap();
        assert_eq!(w.side, OrderSide::Sell);
        assert_eq!(OrderSide::Buy.to_string(), "buy");
    }

    #[test]
    fn test_order_id_roundtrips_display() {
        let id = OrderId::from("8812-ab");
        assert_eq!(id.to_string(), "8812-ab");
        assert_eq!(id.as_str(), "8812-ab");
    }
}
