use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a single form field cannot be used. Local to the field, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("is required")]
    EmptyField,

    #[error("must be a number")]
    NotANumber,

    #[error("must be greater than zero")]
    NonPositive,
}

/// Failures of the order-book feed: malformed content or transport.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("order book request failed with status {0}")]
    Status(u16),

    #[error("order book body is not a snapshot: {0}")]
    MalformedBody(String),

    #[error("malformed {side} level #{index}: {level}")]
    MalformedLevel {
        side: &'static str,
        index: usize,
        level: String,
    },
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("an order is already being submitted")]
    InFlight,

    #[error("order is not valid")]
    Invalid(FieldErrors),

    #[error("{0}")]
    Rejected(String),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(pub BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, label: &str, err: FieldError) {
        self.0.insert(field, format!("{label} {err}"));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything a handler can fail with, mapped onto an HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("unknown asset {0}")]
    UnknownAsset(String),

    #[error("invalid level price {0}")]
    InvalidLevel(f64),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnknownAsset(_) | ApiError::InvalidLevel(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Submission(SubmissionError::Invalid(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Submission(SubmissionError::InFlight) => StatusCode::CONFLICT,
            ApiError::Submission(_) => StatusCode::BAD_GATEWAY,
        };

        let error = self.to_string();
        let fields = match self {
            ApiError::Submission(SubmissionError::Invalid(fields)) => Some(fields),
            _ => None,
        };

        (status, Json(ErrorBody { error, fields })).into_response()
    }
}
