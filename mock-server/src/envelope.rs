//! `{code, status, data[, message]}` response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// A success envelope with `code` equal to the HTTP status.
pub fn success(status: StatusCode, data: Value) -> Response {
    let body = json!({ "code": status.as_u16(), "status": "success", "data": data });
    (status, Json(body)).into_response()
}

/// An empty 204, used for empty lists and deletes.
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// A failure envelope: `data` is the reason phrase, `message` the detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub status: StatusCode,
    pub message: String,
}

impl Failure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Unknown {what}."))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let status = if self.status.is_server_error() { "fail" } else { "error" };
        let body = json!({
            "code": self.status.as_u16(),
            "status": status,
            "data": self.status.canonical_reason().unwrap_or("Error"),
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}
