use super::Venue;
use crate::config::ApiBase;
use crate::errors::{FeedError, SubmissionError};
use crate::models::{Asset, OrderRecord, OrderRequest};
use crate::orderbook::RawSnapshot;
use async_trait::async_trait;
use serde::Deserialize;

/// The error body the trade endpoint sends with a non-2xx status
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

pub struct HttpVenue {
    client: reqwest::Client,
    base: ApiBase,
}

impl HttpVenue {
    pub fn new(base: ApiBase) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
        }
    }
}

#[async_trait]
impl Venue for HttpVenue {
    fn name(&self) -> &'static str {
        "http"
    }

    /// GET /orderbook/{asset}. Any non-2xx status is a transport failure, and a
    /// body that is not a snapshot at all is `MalformedBody`.
    async fn fetch_orderbook(&self, asset: &Asset) -> Result<RawSnapshot, FeedError> {
        let url = self.base.url(&format!("/orderbook/{asset}"));

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let snapshot = response.json::<RawSnapshot>().await.map_err(|e| {
            if e.is_decode() {
                FeedError::MalformedBody(e.to_string())
            } else {
                FeedError::Transport(e)
            }
        })?;

        tracing::debug!(
            "[{asset}] fetched book #{} bids: {} asks: {}",
            snapshot.last_update_id,
            snapshot.bids.len(),
            snapshot.asks.len()
        );

        Ok(snapshot)
    }

    /// POST /trade. The service echoes the order back with an id and timestamp.
    async fn submit_trade(&self, order: &OrderRequest) -> Result<OrderRecord, SubmissionError> {
        let url = self.base.url("/trade");

        let response = self.client.post(&url).json(order).send().await?;
        let status = response.status();

        if !status.is_success() {
            let reason = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => format!("Failed to submit order (status {})", status.as_u16()),
            };
            return Err(SubmissionError::Rejected(reason));
        }

        Ok(response.json::<OrderRecord>().await?)
    }
}
