pub mod poller;

use crate::errors::FeedError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Levels kept per side when no depth is configured.
pub const DEFAULT_DEPTH: usize = 20;

/// One `[priceString, quantityString]` entry as received. Kept untyped so a bad
/// entry surfaces as `MalformedLevel` instead of failing the whole body decode.
pub type RawLevel = Vec<Value>;

/// The raw JSON shape the order book endpoint sends back.
/// Bids arrive best-first (descending), asks best-first (ascending).
#[derive(Debug, Clone, Deserialize)]
pub struct RawSnapshot {
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: u64,
    pub bids: Vec<RawLevel>,
    pub asks: Vec<RawLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceLevel {
    pub price: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spread {
    pub spread: f64,
    pub spread_percent: f64,
}

/// Depth-limited, numeric book ready for display. Replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookView {
    pub last_update_id: u64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    /// None while either side is empty (an incomplete book)
    pub spread: Option<Spread>,
}

/// Display order: asks worst-to-best down to the spread, then bids best-to-worst.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ladder {
    pub asks: Vec<PriceLevel>,
    pub spread: Option<Spread>,
    pub bids: Vec<PriceLevel>,
}

impl BookView {
    /// Highest bid price (best price a buyer will pay)
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|l| l.price)
    }

    /// Lowest ask price (best price a seller will accept)
    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|l| l.price)
    }

    pub fn is_complete(&self) -> bool {
        self.spread.is_some()
    }

    pub fn ladder(&self) -> Ladder {
        Ladder {
            asks: self.asks.iter().rev().copied().collect(),
            spread: self.spread,
            bids: self.bids.clone(),
        }
    }
}

/// Turns a raw snapshot into a `BookView` holding at most `depth` levels per side.
///
/// Only the first `depth` entries of each side are read, in the order received;
/// nothing is sorted. Zero-quantity entries in that window are removals in
/// exchange feeds and are dropped. Any unparsable entry in the window fails the
/// whole snapshot.
pub fn normalize(raw: &RawSnapshot, depth: usize) -> Result<BookView, FeedError> {
    let bids = side_levels("bid", &raw.bids, depth)?;
    let asks = side_levels("ask", &raw.asks, depth)?;

    let spread = match (bids.first(), asks.first()) {
        (Some(bid), Some(ask)) => {
            let spread = ask.price - bid.price;
            Some(Spread {
                spread,
                spread_percent: spread / bid.price * 100.0,
            })
        }
        _ => None,
    };

    Ok(BookView {
        last_update_id: raw.last_update_id,
        bids,
        asks,
        spread,
    })
}

fn side_levels(
    side: &'static str,
    raw: &[RawLevel],
    depth: usize,
) -> Result<Vec<PriceLevel>, FeedError> {
    raw.iter()
        .take(depth)
        .enumerate()
        .map(|(index, level)| parse_level(side, index, level))
        .filter(|level| !matches!(level, Ok(l) if l.quantity == 0.0))
        .collect()
}

fn parse_level(side: &'static str, index: usize, level: &[Value]) -> Result<PriceLevel, FeedError> {
    let malformed = || FeedError::MalformedLevel {
        side,
        index,
        level: Value::from(level.to_vec()).to_string(),
    };

    let [Value::String(price_str), Value::String(qty_str)] = level else {
        return Err(malformed());
    };

    let price = price_str.trim().parse::<f64>().map_err(|_| malformed())?;
    let quantity = qty_str.trim().parse::<f64>().map_err(|_| malformed())?;

    if !price.is_finite() || price <= 0.0 || !quantity.is_finite() || quantity < 0.0 {
        return Err(malformed());
    }

    Ok(PriceLevel { price, quantity })
}

#[cfg(test)]
pub(crate) fn raw_levels(pairs: &[(&str, &str)]) -> Vec<RawLevel> {
    pairs
        .iter()
        .map(|(p, q)| vec![Value::from(*p), Value::from(*q)])
        .collect()
}
