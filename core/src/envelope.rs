//! Response envelope validation.
//!
//! # Design
//! Every API answer is wrapped as `{code, status, data, message?}`. A response
//! moves through `Received -> EnvelopeChecked -> Accepted | Rejected`:
//!
//! 1. HTTP 204 is the server's "success, nothing to return" and is replaced by
//!    the canonical `{code: 204, status: "success", data: {}}` whatever its body.
//! 2. Otherwise the body must be a JSON object (`MalformedResponse`).
//! 3. `code`, `status` and `data` must be present (`InvalidResponse`).
//! 4. `code` must be an accepted success code or one of `ERROR_CODES`, and
//!    `status` one of the three known statuses (`InvalidResponse`).
//! 5. On `success`, `data` must be an object and is handed back.
//! 6. Otherwise `data` and `message` must be strings and the server's verdict
//!    is raised as `Reported { code, "{data}: {message}" }`.
//!
//! A JSON `null` counts as absent, for every field.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Codes the server may pair with an `error` or `fail` status.
pub const ERROR_CODES: [u16; 9] = [400, 401, 404, 405, 406, 408, 409, 411, 500];

pub const NO_CONTENT: u16 = 204;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Fail,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Error => "error",
            Status::Fail => "fail",
        }
    }
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Status::Success),
            "error" => Ok(Status::Error),
            "fail" => Ok(Status::Fail),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn present<'a>(envelope: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    envelope.get(key).filter(|v| !v.is_null())
}

/// Steps 1 and 2: turn a raw response into an envelope object.
pub fn decode(response: &HttpResponse) -> Result<Map<String, Value>, ApiError> {
    if response.status == NO_CONTENT {
        let mut envelope = Map::new();
        envelope.insert("code".into(), Value::from(NO_CONTENT));
        envelope.insert("status".into(), Value::from(Status::Success.as_str()));
        envelope.insert("data".into(), Value::Object(Map::new()));
        return Ok(envelope);
    }

    match serde_json::from_slice::<Value>(&response.body) {
        Ok(Value::Object(envelope)) => Ok(envelope),
        Ok(other) => Err(ApiError::MalformedResponse(format!(
            "HTTP {}: expected a JSON object, got {}",
            response.status,
            kind(&other)
        ))),
        Err(e) => Err(ApiError::MalformedResponse(format!(
            "HTTP {}: {e}",
            response.status
        ))),
    }
}

/// Steps 3 to 6: check the envelope contract and hand back `data`.
pub fn validate(
    mut envelope: Map<String, Value>,
    accepted: &[u16],
) -> Result<Map<String, Value>, ApiError> {
    let (Some(code), Some(status), Some(_)) = (
        present(&envelope, "code"),
        present(&envelope, "status"),
        present(&envelope, "data"),
    ) else {
        return Err(ApiError::InvalidResponse(
            "missing \"code\", \"status\" or \"data\" property".into(),
        ));
    };

    let code = code
        .as_u64()
        .and_then(|c| u16::try_from(c).ok())
        .filter(|c| accepted.contains(c) || ERROR_CODES.contains(c));
    let status = status.as_str().and_then(|s| s.parse::<Status>().ok());
    let (Some(code), Some(status)) = (code, status) else {
        return Err(ApiError::InvalidResponse(
            "invalid \"code\" or \"status\" property".into(),
        ));
    };

    if status == Status::Success {
        return match envelope.remove("data") {
            Some(Value::Object(data)) => Ok(data),
            _ => Err(ApiError::InvalidResponse("invalid \"data\" property".into())),
        };
    }

    let Some(message) = present(&envelope, "message") else {
        return Err(ApiError::InvalidResponse(
            "missing \"message\" property".into(),
        ));
    };
    let (Some(data), Some(message)) = (
        envelope.get("data").and_then(Value::as_str),
        message.as_str(),
    ) else {
        return Err(ApiError::InvalidResponse(
            "invalid \"data\" or \"message\" property".into(),
        ));
    };

    warn!(code, %status, data, message, "server reported a failure");
    Err(ApiError::Reported {
        code,
        message: format!("{data}: {message}"),
    })
}

/// Decode and validate in one go.
pub fn open(response: &HttpResponse, accepted: &[u16]) -> Result<Map<String, Value>, ApiError> {
    validate(decode(response)?, accepted)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
