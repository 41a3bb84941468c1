pub mod handlers;
pub mod models;
pub mod router;

use crate::config::Config;
use crate::session::SessionStore;
use crate::venue::Venue;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared handler state: the sessions, the remote venue and the configuration.
#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    pub venue: Arc<dyn Venue>,
    pub config: Arc<Config>,
}

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(store: SessionStore, venue: Arc<dyn Venue>, config: Config) -> Self {
        Self {
            state: AppState {
                store,
                venue,
                config: Arc::new(config),
            },
        }
    }

    /// Binds the server to the configured port and starts serving.
    pub async fn run(self) -> anyhow::Result<()> {
        let (metric_layer, metric_handle) = PrometheusMetricLayer::pair();
        crate::telemetry::describe_metrics();

        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.api_port));
        let app = router::build(self.state)
            .route("/metrics", get(move || async move { metric_handle.render() }))
            .layer(metric_layer);

        tracing::info!("API server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{FeedError, SubmissionError};
    use crate::models::{Asset, OrderRecord, OrderRequest};
    use crate::orderbook::{RawSnapshot, raw_levels};
    use crate::submission::SubmissionState;
    use async_trait::async_trait;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio::sync::Semaphore;
    use tower::ServiceExt;

    /// A venue whose trade endpoint waits for a permit, so tests control when it answers.
    struct StubVenue {
        gate: Semaphore,
        reject_with: Option<String>,
    }

    impl StubVenue {
        fn open() -> Self {
            Self {
                gate: Semaphore::new(Semaphore::MAX_PERMITS),
                reject_with: None,
            }
        }
    }

    #[async_trait]
    impl Venue for StubVenue {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_orderbook(&self, _asset: &Asset) -> Result<RawSnapshot, FeedError> {
            Ok(RawSnapshot {
                last_update_id: 1,
                bids: raw_levels(&[("100.00", "1.5"), ("99.50", "2.0")]),
                asks: raw_levels(&[("100.50", "1.0"), ("101.00", "3.0")]),
            })
        }

        async fn submit_trade(&self, order: &OrderRequest) -> Result<OrderRecord, SubmissionError> {
            let _permit = self.gate.acquire().await.map_err(|_| {
                SubmissionError::Rejected("venue shut down".to_string())
            })?;

            match &self.reject_with {
                Some(reason) => Err(SubmissionError::Rejected(reason.clone())),
                None => Ok(OrderRecord {
                    id: "trade-1".to_string(),
                    accepted_at: 1_700_000_000_000,
                    request: order.clone(),
                }),
            }
        }
    }

    fn app_with(venue: Arc<StubVenue>) -> (Router, AppState) {
        let config = Config {
            poll_interval: Duration::from_secs(3600),
            ..Config::default()
        };
        let state = AppState {
            store: SessionStore::new(),
            venue,
            config: Arc::new(config),
        };
        (router::build(state.clone()), state)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn open_session(app: &Router) -> String {
        let (status, body) = call(app, "POST", "/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    async fn fill_limit_buy(app: &Router, id: &str) {
        let uri = format!("/sessions/{id}/draft");
        call(app, "PUT", &uri, Some(json!({ "field": "price", "value": "100" }))).await;
        call(app, "PUT", &uri, Some(json!({ "field": "quantity", "value": "0.5" }))).await;
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app_with(Arc::new(StubVenue::open()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn draft_edits_auto_calculate() {
        let (app, _) = app_with(Arc::new(StubVenue::open()));
        let id = open_session(&app).await;
        let uri = format!("/sessions/{id}/draft");

        call(&app, "PUT", &uri, Some(json!({ "field": "price", "value": "3" }))).await;
        let (status, form) =
            call(&app, "PUT", &uri, Some(json!({ "field": "notional", "value": "100" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(form["quantity"], "33.33333333");
        assert_eq!(form["notional"], "100");
        assert_eq!(form["last_edited"], "notional");
        assert_eq!(form["submit_ready"], true);

        let (_, form) =
            call(&app, "PUT", &uri, Some(json!({ "field": "quantity", "value": "10" }))).await;
        assert_eq!(form["notional"], "30.00");
        assert_eq!(form["last_edited"], "quantity");
    }

    #[tokio::test]
    async fn book_is_polled_on_open() {
        let (app, _) = app_with(Arc::new(StubVenue::open()));
        let id = open_session(&app).await;

        let mut book = Value::Null;
        for _ in 0..50 {
            let (_, body) = call(&app, "GET", &format!("/sessions/{id}/book"), None).await;
            book = body;
            if book["ladder"].is_object() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(book["asset"], "BTC");
        assert_eq!(book["complete"], true);
        assert_eq!(book["ladder"]["asks"][0]["price"], 101.0);
        assert_eq!(book["ladder"]["bids"][0]["price"], 100.0);
        let spread = book["ladder"]["spread"]["spread"].as_f64().unwrap();
        assert!((spread - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn level_click_prefills_sell() {
        let (app, _) = app_with(Arc::new(StubVenue::open()));
        let id = open_session(&app).await;

        let (status, form) = call(
            &app,
            "POST",
            &format!("/sessions/{id}/book/select"),
            Some(json!({ "price": 100.5, "side": "SELL" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(form["price"], "100.5");
        assert_eq!(form["side"], "SELL");
        assert_eq!(form["kind"], "LIMIT");
    }

    #[tokio::test]
    async fn unknown_asset_is_refused() {
        let (app, _) = app_with(Arc::new(StubVenue::open()));
        let id = open_session(&app).await;

        let (status, _) = call(
            &app,
            "PUT",
            &format!("/sessions/{id}/asset"),
            Some(json!({ "asset": "DOGE" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, view) = call(
            &app,
            "PUT",
            &format!("/sessions/{id}/asset"),
            Some(json!({ "asset": "eth" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["asset"], "ETH");
    }

    #[tokio::test]
    async fn invalid_order_reports_fields() {
        let (app, _) = app_with(Arc::new(StubVenue::open()));
        let id = open_session(&app).await;

        let (status, body) = call(&app, "POST", &format!("/sessions/{id}/orders"), None).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"]["price"], "Price is required");
        assert_eq!(body["fields"]["quantity"], "Quantity is required");
    }

    #[tokio::test]
    async fn accepted_order_lands_in_history() {
        let (app, _) = app_with(Arc::new(StubVenue::open()));
        let id = open_session(&app).await;
        fill_limit_buy(&app, &id).await;

        let (status, record) = call(&app, "POST", &format!("/sessions/{id}/orders"), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(record["id"], "trade-1");
        assert_eq!(record["notional"], 50.0);

        let (_, session) = call(&app, "GET", &format!("/sessions/{id}"), None).await;
        assert_eq!(session["form"]["quantity"], "");
        assert_eq!(session["submission"]["state"], "succeeded");
        assert_eq!(session["trade_count"], 1);

        let (_, trades) = call(&app, "GET", &format!("/sessions/{id}/trades"), None).await;
        assert_eq!(trades["trades"][0]["id"], "trade-1");

        let (status, _) = call(&app, "DELETE", &format!("/sessions/{id}/trades"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, trades) = call(&app, "GET", &format!("/sessions/{id}/trades"), None).await;
        assert_eq!(trades["trades"], json!([]));
    }

    #[tokio::test]
    async fn rejected_order_keeps_draft() {
        let venue = Arc::new(StubVenue {
            reject_with: Some("Insufficient balance".to_string()),
            ..StubVenue::open()
        });
        let (app, _) = app_with(venue);
        let id = open_session(&app).await;
        fill_limit_buy(&app, &id).await;

        let (status, body) = call(&app, "POST", &format!("/sessions/{id}/orders"), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Insufficient balance");

        let (_, session) = call(&app, "GET", &format!("/sessions/{id}"), None).await;
        assert_eq!(session["form"]["price"], "100");
        assert_eq!(session["form"]["quantity"], "0.5");
        assert_eq!(session["form"]["notional"], "50.00");
        assert_eq!(session["submission"]["reason"], "Insufficient balance");

        let (_, state) =
            call(&app, "POST", &format!("/sessions/{id}/submission/dismiss"), None).await;
        assert_eq!(state["state"], "idle");
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_conflicts() {
        let venue = Arc::new(StubVenue {
            gate: Semaphore::new(0),
            reject_with: None,
        });
        let (app, state) = app_with(Arc::clone(&venue));
        let id = open_session(&app).await;
        fill_limit_buy(&app, &id).await;

        let first = tokio::spawn({
            let app = app.clone();
            let uri = format!("/sessions/{id}/orders");
            async move { call(&app, "POST", &uri, None).await }
        });

        let in_flight = |s: &crate::session::Session| {
            matches!(s.submission(), SubmissionState::Submitting { .. })
        };
        while !state.store.with(&id, in_flight).unwrap() {
            tokio::task::yield_now().await;
        }

        let (status, body) = call(&app, "POST", &format!("/sessions/{id}/orders"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "an order is already being submitted");

        venue.gate.add_permits(1);
        let (status, _) = first.await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn closed_session_is_gone() {
        let (app, _) = app_with(Arc::new(StubVenue::open()));
        let id = open_session(&app).await;

        let (status, _) = call(&app, "DELETE", &format!("/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(&app, "GET", &format!("/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], format!("session {id} not found"));
    }

    #[tokio::test]
    async fn session_closed_mid_submit_reports_not_found() {
        let venue = Arc::new(StubVenue {
            gate: Semaphore::new(0),
            reject_with: None,
        });
        let (app, state) = app_with(Arc::clone(&venue));
        let id = open_session(&app).await;
        fill_limit_buy(&app, &id).await;

        let submit = tokio::spawn({
            let app = app.clone();
            let uri = format!("/sessions/{id}/orders");
            async move { call(&app, "POST", &uri, None).await }
        });

        let in_flight = |s: &crate::session::Session| {
            matches!(s.submission(), SubmissionState::Submitting { .. })
        };
        while !state.store.with(&id, in_flight).unwrap() {
            tokio::task::yield_now().await;
        }

        let (status, _) = call(&app, "DELETE", &format!("/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        venue.gate.add_permits(1);
        let (status, body) = submit.await.unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], format!("session {id} not found"));
    }
}
