use crate::entry::{Field, OrderForm};
use crate::models::{Asset, OrderKind, OrderRecord, Side};
use crate::orderbook::Ladder;
use crate::session::Session;
use crate::submission::SubmissionState;
use serde::{Deserialize, Serialize};

/// Response for POST /sessions
#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: String,
    pub asset: Asset,
}

/// Body of PUT /sessions/{id}/asset
#[derive(Deserialize)]
pub struct SelectAssetRequest {
    pub asset: String,
}

/// Body of POST /sessions/{id}/book/select
#[derive(Deserialize)]
pub struct SelectLevelRequest {
    pub price: f64,
    pub side: Side,
}

/// Body of PUT /sessions/{id}/draft
#[derive(Deserialize)]
pub struct SetFieldRequest {
    pub field: Field,
    pub value: String,
}

/// Body of PATCH /sessions/{id}/form
#[derive(Deserialize)]
pub struct UpdateFormRequest {
    pub kind: Option<OrderKind>,
    pub side: Option<Side>,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub kind: OrderKind,
    pub side: Side,
    pub quantity: String,
    pub price: String,
    pub notional: String,
    pub last_edited: Option<Field>,
    /// Drives the submit button
    pub submit_ready: bool,
}

impl From<&OrderForm> for FormView {
    fn from(form: &OrderForm) -> Self {
        Self {
            kind: form.kind,
            side: form.side,
            quantity: form.draft.quantity().to_string(),
            price: form.draft.price().to_string(),
            notional: form.draft.notional().to_string(),
            last_edited: form.draft.last_edited(),
            submit_ready: form.is_submit_ready(),
        }
    }
}

/// Response for GET /sessions/{id}/book
#[derive(Serialize)]
pub struct BookResponse {
    pub asset: Asset,
    pub ladder: Option<Ladder>,
    /// false while the book is missing or one-sided
    pub complete: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl From<&Session> for BookResponse {
    fn from(session: &Session) -> Self {
        let book = session.book();
        Self {
            asset: session.asset().clone(),
            ladder: book.view.as_ref().map(|v| v.ladder()),
            complete: book.view.as_ref().is_some_and(|v| v.is_complete()),
            loading: book.loading,
            error: book.error.clone(),
        }
    }
}

/// Response for GET /sessions/{id}
#[derive(Serialize)]
pub struct SessionView {
    pub id: String,
    pub asset: Asset,
    pub form: FormView,
    pub book: BookResponse,
    pub submission: SubmissionState,
    pub trade_count: usize,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id().to_string(),
            asset: session.asset().clone(),
            form: FormView::from(&session.form),
            book: BookResponse::from(session),
            submission: session.submission().clone(),
            trade_count: session.history().len(),
        }
    }
}

/// Response for GET /sessions/{id}/trades, newest first
#[derive(Serialize)]
pub struct TradesResponse {
    pub trades: Vec<OrderRecord>,
}
