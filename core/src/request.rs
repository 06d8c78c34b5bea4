//! Turns a logical call (method, resource path, optional payload) into a
//! signed `HttpRequest`.
//!
//! Bodies are serialized once, compactly, with `serde_json`: forward slashes
//! and non-ASCII characters are written verbatim and floats keep their
//! fraction (`1.0` stays `1.0`). The exact bytes that are hashed and counted
//! for the signature are the bytes that go on the wire.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::DEFAULT_HOST;
use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::signer::{http_date, CanonicalRequest, Signer, JSON_UTF8};

/// The `host[:port]` part of a host URL, as it appears in the canonical string.
///
/// The port is kept only when the host URL spells it out.
pub fn authority(host: &str) -> &str {
    let rest = host.split_once("://").map_or(host, |(_, rest)| rest);
    let rest = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    rest.rsplit_once('@').map_or(rest, |(_, authority)| authority)
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    credentials: Credentials,
    host: String,
}

impl RequestBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            host: DEFAULT_HOST.to_string(),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Replace the API host. An empty string leaves the current host in place.
    pub fn set_host(&mut self, host: &str) {
        if !host.is_empty() {
            self.host = host.trim_end_matches('/').to_string();
        }
    }

    /// A signed request without a body, dated now.
    pub fn request(&self, method: HttpMethod, resource: &str) -> Result<HttpRequest, ApiError> {
        self.request_at(method, resource, None::<&()>, Utc::now())
    }

    /// A signed request carrying `body` as JSON, dated now.
    pub fn request_with_body<B>(
        &self,
        method: HttpMethod,
        resource: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.request_at(method, resource, Some(body), Utc::now())
    }

    /// A signed request dated `now`. The formatted date is used for both the
    /// `Date` header and the canonical string.
    pub fn request_at<B>(
        &self,
        method: HttpMethod,
        resource: &str,
        body: Option<&B>,
        now: DateTime<Utc>,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let date = http_date(now);

        let canonical = CanonicalRequest::new(
            self.credentials.api_key().as_str(),
            method,
            resource,
            authority(&self.host),
            body.as_deref(),
            &date,
        );
        let authorization = Signer::new(&self.credentials).authorization(&canonical)?;

        let mut headers = vec![("Accept".to_string(), JSON_UTF8.to_string())];
        if let Some(body) = &body {
            headers.push(("Content-Type".to_string(), JSON_UTF8.to_string()));
            headers.push(("Content-Length".to_string(), body.len().to_string()));
        }
        headers.push(("Date".to_string(), date));
        headers.push(("Authorization".to_string(), authorization));

        debug!(%method, resource, has_body = body.is_some(), "built request");

        Ok(HttpRequest {
            method,
            url: format!("{}{resource}", self.host),
            resource: resource.to_string(),
            headers,
            body,
        })
    }
}
