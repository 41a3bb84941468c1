pub mod store;

use crate::entry::OrderForm;
use crate::errors::{FeedError, SubmissionError};
use crate::models::{Asset, OrderRecord, OrderRequest, Side};
use crate::orderbook::poller::{Generation, PollGate};
use crate::orderbook::{self, BookView, RawSnapshot};
use crate::submission::{Lifecycle, SubmissionState, Ticket, TradeHistory};
use std::sync::Arc;
use tokio::sync::Notify;
pub use store::SessionStore;

pub type SessionId = String;

/// What the book panel shows: the last good view, the latest feed problem, and
/// whether a poll for the current asset is still outstanding.
#[derive(Debug, Default)]
pub struct BookState {
    pub view: Option<BookView>,
    pub error: Option<String>,
    pub loading: bool,
    gate: PollGate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Applied,
    Failed,
    /// A newer poll was issued after this one; its response was dropped.
    Superseded,
}

/// One user's trading session: selected asset, order form, book, submission and history.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    asset: Asset,
    pub form: OrderForm,
    book: BookState,
    lifecycle: Lifecycle,
    history: TradeHistory,
    wake: Arc<Notify>,
}

impl Session {
    pub fn new(id: SessionId, asset: Asset) -> Self {
        Self {
            id,
            asset,
            form: OrderForm::new(),
            book: BookState::default(),
            lifecycle: Lifecycle::new(),
            history: TradeHistory::new(),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn book(&self) -> &BookState {
        &self.book
    }

    pub fn submission(&self) -> &SubmissionState {
        self.lifecycle.state()
    }

    pub fn history(&self) -> &TradeHistory {
        &self.history
    }

    /// Handle the book poller waits on for out-of-schedule polls.
    pub fn wake(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }

    /// Switches the watched asset. The old book is dropped, polls still in flight
    /// for it are superseded and the poller is woken for an immediate fetch.
    pub fn select_asset(&mut self, asset: Asset) -> bool {
        if asset == self.asset {
            return false;
        }

        tracing::info!("[session {}] asset {} -> {}", self.id, self.asset, asset);
        self.asset = asset;
        self.book.view = None;
        self.book.error = None;
        self.book.loading = true;
        self.book.gate.supersede();
        self.wake.notify_one();
        true
    }

    pub fn begin_poll(&mut self) -> (Generation, Asset) {
        self.book.loading = true;
        (self.book.gate.issue(), self.asset.clone())
    }

    /// Applies a poll response if it is still the latest one. A failed poll keeps
    /// the last good view on display next to the error.
    pub fn apply_poll(
        &mut self,
        generation: Generation,
        asset: &Asset,
        result: Result<RawSnapshot, FeedError>,
        depth: usize,
    ) -> PollOutcome {
        if !self.book.gate.is_current(generation) {
            tracing::debug!("[{asset}] dropping superseded book response");
            metrics::counter!("desk_book_polls_total", "outcome" => "superseded").increment(1);
            return PollOutcome::Superseded;
        }

        self.book.loading = false;

        match result.and_then(|raw| orderbook::normalize(&raw, depth)) {
            Ok(view) => {
                tracing::debug!(
                    "[{asset}] book #{} bids: {} asks: {} best: {:?} / {:?}",
                    view.last_update_id,
                    view.bids.len(),
                    view.asks.len(),
                    view.best_bid(),
                    view.best_ask()
                );
                self.book.view = Some(view);
                self.book.error = None;
                metrics::counter!("desk_book_polls_total", "outcome" => "applied").increment(1);
                PollOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("[{asset}] order book unavailable: {e}");
                self.book.error = Some(format!("Failed to fetch order book: {e}"));
                metrics::counter!("desk_book_polls_total", "outcome" => "failed").increment(1);
                PollOutcome::Failed
            }
        }
    }

    /// A click on a book level: bids prefill a buy, asks prefill a sell.
    pub fn select_level(&mut self, price: f64, side: Side) {
        self.form.prefill(price, side);
    }

    /// Validates the form and moves the lifecycle to Submitting.
    /// An in-flight submission is checked first and left untouched.
    pub fn begin_submit(&mut self) -> Result<(Ticket, OrderRequest), SubmissionError> {
        if self.lifecycle.is_submitting() {
            return Err(SubmissionError::InFlight);
        }

        let order = self
            .form
            .to_request(&self.asset)
            .map_err(SubmissionError::Invalid)?;
        let ticket = self.lifecycle.begin(order.clone())?;

        tracing::info!(
            "[session {}] submitting {:?} {:?} {} qty={} notional={}",
            self.id,
            order.side,
            order.kind,
            order.asset,
            order.quantity,
            order.notional
        );
        Ok((ticket, order))
    }

    /// Records the trade service's answer. Success clears the draft and files the
    /// record in history; failure keeps the draft exactly as typed.
    pub fn finish_submit(
        &mut self,
        ticket: Ticket,
        result: Result<OrderRecord, SubmissionError>,
    ) -> Result<OrderRecord, SubmissionError> {
        match result {
            Ok(record) => {
                if self.lifecycle.resolve(ticket, record.clone()) {
                    tracing::info!("[session {}] order {} accepted", self.id, record.id);
                    self.form.draft.reset();
                    self.history.push(record.clone());
                }
                metrics::counter!("desk_orders_total", "outcome" => "accepted").increment(1);
                Ok(record)
            }
            Err(e) => {
                tracing::warn!("[session {}] order failed: {e}", self.id);
                self.lifecycle.reject(ticket, e.to_string());
                metrics::counter!("desk_orders_total", "outcome" => "failed").increment(1);
                Err(e)
            }
        }
    }

    pub fn dismiss(&mut self) -> bool {
        self.lifecycle.dismiss()
    }

    pub fn dismiss_ticket(&mut self, ticket: Ticket) -> bool {
        self.lifecycle.dismiss_ticket(ticket)
    }

    /// Resets the draft; the form's kind and side are kept.
    pub fn cancel_draft(&mut self) {
        if self.form.draft.is_empty() {
            return;
        }
        self.form.draft.reset();
        tracing::debug!("[session {}] draft cancelled", self.id);
    }

    pub fn clear_history(&mut self) {
        if self.history.is_empty() {
            return;
        }
        tracing::info!("[session {}] cleared {} trades", self.id, self.history.len());
        self.history.clear();
    }
}
