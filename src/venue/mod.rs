use crate::errors::{FeedError, SubmissionError};
use crate::models::{Asset, OrderRecord, OrderRequest};
use crate::orderbook::RawSnapshot;
use async_trait::async_trait;

pub mod http;

/// The remote service that publishes order books and accepts trades.
#[async_trait]
pub trait Venue: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_orderbook(&self, asset: &Asset) -> Result<RawSnapshot, FeedError>;

    /// Places one order. A rejection carries the service's reason verbatim.
    async fn submit_trade(&self, order: &OrderRequest) -> Result<OrderRecord, SubmissionError>;
}
