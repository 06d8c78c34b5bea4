//! Error types for the PDFrePRO client.
//!
//! # Design
//! Every failure class the API contract distinguishes gets its own variant so
//! callers can tell a broken transport from a broken response body, a body
//! that violates the envelope contract, and a well-formed envelope in which
//! the server reports an error of its own. Resource-level problems are split
//! into "missing" (field absent or `null`) and "invalid" (present but wrong).

use std::fmt;

use thiserror::Error;

/// The resource payloads a response can carry inside its `data` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Placeholder,
    Placeholders,
    Template,
    Templates,
    Url,
    Pdf,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Placeholder => "placeholder",
            Resource::Placeholders => "placeholders",
            Resource::Template => "template",
            Resource::Templates => "templates",
            Resource::Url => "URL",
            Resource::Pdf => "PDF",
        };
        f.write_str(name)
    }
}

/// Errors returned by `PdfreproClient` and `Client` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API key is not exactly 20 ASCII alphanumeric characters.
    #[error("the provided API key is invalid")]
    InvalidApiKey,

    /// The shared key is not exactly 64 ASCII alphanumeric characters.
    #[error("the provided shared key is invalid")]
    InvalidSharedKey,

    /// The HTTP call itself failed (connection, TLS, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The body is not a JSON object and the status is not 204.
    #[error("a malformed response has been received: {0}")]
    MalformedResponse(String),

    /// The envelope is present but breaks the `code`/`status`/`data`/`message` contract.
    #[error("the response is invalid: {0}")]
    InvalidResponse(String),

    /// A well-formed envelope whose status is `error` or `fail`.
    #[error("{message} (code {code})")]
    Reported { code: u16, message: String },

    /// A required field of a resource payload is absent or `null`.
    #[error("the response is invalid, due to a missing {resource} (field `{field}`)")]
    MissingResource { resource: Resource, field: &'static str },

    /// A resource field is present but has the wrong type or value.
    #[error("the response is invalid, due to an invalid {resource}: {reason}")]
    InvalidResource { resource: Resource, reason: String },

    /// Caller-supplied JSON text could not be parsed. Raised before any I/O.
    #[error("invalid JSON: {0}")]
    Json(String),

    /// A request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The server-side code of a reported failure, if this is one.
    pub fn code(&self) -> Option<u16> {
        match self {
            ApiError::Reported { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn invalid(resource: Resource, reason: impl Into<String>) -> Self {
        ApiError::InvalidResource {
            resource,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(resource: Resource, field: &'static str) -> Self {
        ApiError::MissingResource { resource, field }
    }
}
