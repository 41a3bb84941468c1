use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticker of a tradable asset, e.g. "BTC". Always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asset(String);

impl Asset {
    pub fn new(symbol: &str) -> Self {
        Self(symbol.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    Limit,
    Market,
}

/// A validated order, ready for the trade service. `price` is present iff the kind is LIMIT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub asset: Asset,
    pub side: Side,
    #[serde(rename = "type")]
    pub kind: OrderKind,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub notional: f64,
}

/// An order accepted by the trade service: the echoed request plus its id and acceptance time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    /// Unix epoch milliseconds
    #[serde(rename = "timestamp")]
    pub accepted_at: u64,
    #[serde(flatten)]
    pub request: OrderRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_request_omits_price_on_the_wire() {
        let request = OrderRequest {
            asset: Asset::new("btc"),
            side: Side::Sell,
            kind: OrderKind::Market,
            quantity: 0.5,
            price: None,
            notional: 25_000.0,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "asset": "BTC",
                "side": "SELL",
                "type": "MARKET",
                "quantity": 0.5,
                "notional": 25000.0
            })
        );
    }

    #[test]
    fn record_reads_echoed_request() {
        let body = r#"{
            "id": "4f9c2a",
            "timestamp": 1700000000000,
            "asset": "ETH",
            "side": "BUY",
            "type": "LIMIT",
            "quantity": 2,
            "price": 1800.5,
            "notional": 3601
        }"#;

        let record: OrderRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.id, "4f9c2a");
        assert_eq!(record.accepted_at, 1_700_000_000_000);
        assert_eq!(record.request.kind, OrderKind::Limit);
        assert_eq!(record.request.price, Some(1800.5));
        assert_eq!(record.request.asset, Asset::new("ETH"));
    }
}
