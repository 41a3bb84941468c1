use super::AppState;
use super::models::{
    BookResponse, FormView, SelectAssetRequest, SelectLevelRequest, SessionCreated, SessionView,
    SetFieldRequest, TradesResponse, UpdateFormRequest,
};
use crate::entry::Field;
use crate::errors::ApiError;
use crate::models::{Asset, OrderRecord};
use crate::orderbook::poller;
use crate::session::Session;
use crate::submission::SubmissionState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;

/// Runs `f` against session `id`, or 404s.
fn with_session<R>(
    state: &AppState,
    id: &str,
    f: impl FnOnce(&mut Session) -> R,
) -> Result<R, ApiError> {
    state
        .store
        .with_mut(id, f)
        .ok_or_else(|| ApiError::SessionNotFound(id.to_string()))
}

/// GET /health: simple liveness check
pub async fn health() -> &'static str {
    "OK"
}

/// POST /sessions: opens a session on the default asset and starts its book poller
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let asset = state.config.default_asset().clone();
    let session_id = state.store.create(asset.clone());

    poller::spawn(
        state.store.clone(),
        Arc::clone(&state.venue),
        session_id.clone(),
        state.config.poll_interval,
        state.config.book_depth,
    );

    tracing::info!("[session {session_id}] opened on {asset}");
    (StatusCode::CREATED, Json(SessionCreated { session_id, asset }))
}

/// GET /sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    with_session(&state, &id, |s| Json(SessionView::from(&*s)))
}

/// DELETE /sessions/{id}: tears the session down, history included
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .remove(&id)
        .ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;

    tracing::info!("[session {id}] closed");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /sessions/{id}/asset: switches asset and triggers an immediate re-poll
pub async fn select_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SelectAssetRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let asset = Asset::new(&body.asset);
    if !state.config.is_listed(&asset) {
        return Err(ApiError::UnknownAsset(body.asset));
    }

    with_session(&state, &id, |s| {
        s.select_asset(asset);
        Json(SessionView::from(&*s))
    })
}

/// GET /sessions/{id}/book: ladder in display order plus spread
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    with_session(&state, &id, |s| Json(BookResponse::from(&*s)))
}

/// POST /sessions/{id}/book/select: a click on a ladder level prefills the form
pub async fn select_level(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SelectLevelRequest>,
) -> Result<Json<FormView>, ApiError> {
    if !body.price.is_finite() || body.price <= 0.0 {
        return Err(ApiError::InvalidLevel(body.price));
    }

    with_session(&state, &id, |s| {
        s.select_level(body.price, body.side);
        Json(FormView::from(&s.form))
    })
}

/// PUT /sessions/{id}/draft: one keystroke's worth of field text
pub async fn set_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SetFieldRequest>,
) -> Result<Json<FormView>, ApiError> {
    with_session(&state, &id, |s| {
        let draft = &mut s.form.draft;
        match body.field {
            Field::Quantity => draft.set_quantity(body.value),
            Field::Price => draft.set_price(body.value),
            Field::Notional => draft.set_notional(body.value),
        }
        Json(FormView::from(&s.form))
    })
}

/// PATCH /sessions/{id}/form: order kind and side toggles
pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateFormRequest>,
) -> Result<Json<FormView>, ApiError> {
    with_session(&state, &id, |s| {
        if let Some(kind) = body.kind {
            s.form.kind = kind;
        }
        if let Some(side) = body.side {
            s.form.side = side;
        }
        Json(FormView::from(&s.form))
    })
}

/// DELETE /sessions/{id}/draft: cancels the draft, clearing all three fields
pub async fn cancel_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FormView>, ApiError> {
    with_session(&state, &id, |s| {
        s.cancel_draft();
        Json(FormView::from(&s.form))
    })
}

/// POST /sessions/{id}/orders: submits the current form.
///
/// The session is only borrowed to start and to finish the submission, never
/// across the trade service call, so a second submit meanwhile sees Submitting
/// and is refused with 409.
pub async fn submit_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<OrderRecord>), ApiError> {
    let (ticket, order) = with_session(&state, &id, |s| s.begin_submit())??;

    let result = state.venue.submit_trade(&order).await;

    let result = match state.store.deliver(&id, result, |s, r| s.finish_submit(ticket, r)) {
        Ok(result) => result,
        Err(Ok(record)) => {
            tracing::warn!(
                "[session {id}] closed while its order was in flight; venue accepted {} at {}",
                record.id,
                record.accepted_at
            );
            return Err(ApiError::SessionNotFound(id));
        }
        Err(Err(e)) => {
            tracing::warn!("[session {id}] closed while its order was in flight; venue said: {e}");
            return Err(ApiError::SessionNotFound(id));
        }
    };

    let store = state.store.clone();
    let timeout = state.config.notice_timeout;
    let notice_id = id.clone();
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        store.with_mut(&notice_id, |s| s.dismiss_ticket(ticket));
    });

    Ok((StatusCode::CREATED, Json(result?)))
}

/// POST /sessions/{id}/submission/dismiss
pub async fn dismiss_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubmissionState>, ApiError> {
    with_session(&state, &id, |s| {
        s.dismiss();
        Json(s.submission().clone())
    })
}

/// GET /sessions/{id}/trades
pub async fn list_trades(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TradesResponse>, ApiError> {
    with_session(&state, &id, |s| {
        Json(TradesResponse {
            trades: s.history().iter().cloned().collect(),
        })
    })
}

/// DELETE /sessions/{id}/trades
pub async fn clear_trades(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    with_session(&state, &id, |s| s.clear_history())?;
    Ok(StatusCode::NO_CONTENT)
}
