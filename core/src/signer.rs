//! Request signing.
//!
//! # Design
//! A request is authorized by an HMAC-SHA256 over a canonical string made of
//! nine fields, each terminated by `\n`:
//!
//! ```text
//! apiKey, method, resource, host[:port], md5(body), accept, contentType,
//! contentLength, date
//! ```
//!
//! Fields that do not apply (body hash, content type and length on a request
//! without a body) are empty strings but keep their separator. The signature
//! is sent as `Authorization: SharedKey {apiKey}:{hex(hmac)}`.
//!
//! Everything here is pure: the same inputs, date string included, always
//! yield the same header.
//!
//! # Interoperability
//! Fields are separated by a real newline and the `Date` hour is zero-padded
//! (`%H`). Older PDFrePRO clients joined fields with the two-character
//! literal `\n` and wrote an unpadded hour. If the production service
//! verifies that legacy form, signatures from this module will not verify
//! against `api.pdfrepro.de`; only the mock server here is known to accept
//! them.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::http::HttpMethod;

type HmacSha256 = Hmac<Sha256>;

/// Value of both the `Accept` and (when a body is present) `Content-Type` headers.
pub const JSON_UTF8: &str = "application/json;charset=utf-8";

/// Format a timestamp the way the `Date` header and the canonical string expect it,
/// e.g. `Tue, 05 Mar 2024 09:07:03 GMT`. Always GMT, whatever the local timezone.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Lowercase hex MD5 of the serialized body, or empty when there is none.
pub fn body_hash(body: Option<&str>) -> String {
    body.map(|b| format!("{:x}", md5::compute(b.as_bytes())))
        .unwrap_or_default()
}

/// The nine inputs of a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest<'a> {
    pub api_key: &'a str,
    pub method: HttpMethod,
    pub resource: &'a str,
    pub host: &'a str,
    pub body_hash: String,
    pub accept: &'a str,
    pub content_type: &'a str,
    pub content_length: String,
    pub date: &'a str,
}

impl<'a> CanonicalRequest<'a> {
    /// Derive the body-dependent fields from an optional serialized body.
    pub fn new(
        api_key: &'a str,
        method: HttpMethod,
        resource: &'a str,
        host: &'a str,
        body: Option<&str>,
        date: &'a str,
    ) -> Self {
        Self {
            api_key,
            method,
            resource,
            host,
            body_hash: body_hash(body),
            accept: JSON_UTF8,
            content_type: if body.is_some() { JSON_UTF8 } else { "" },
            content_length: body.map(|b| b.len().to_string()).unwrap_or_default(),
            date,
        }
    }

    pub fn to_canonical_string(&self) -> String {
        let fields: [&str; 9] = [
            self.api_key,
            self.method.as_str(),
            self.resource,
            self.host,
            &self.body_hash,
            self.accept,
            self.content_type,
            &self.content_length,
            self.date,
        ];
        let mut out = String::with_capacity(fields.iter().map(|f| f.len() + 1).sum());
        for field in fields {
            out.push_str(field);
            out.push('\n');
        }
        out
    }
}

/// Computes `Authorization` header values for one set of credentials.
#[derive(Debug, Clone, Copy)]
pub struct Signer<'a> {
    credentials: &'a Credentials,
}

impl<'a> Signer<'a> {
    pub fn new(credentials: &'a Credentials) -> Self {
        Self { credentials }
    }

    /// Lowercase hex HMAC-SHA256 of `canonical` keyed with the shared key.
    pub fn signature(&self, canonical: &str) -> Result<String, ApiError> {
        let mut mac = HmacSha256::new_from_slice(self.credentials.shared_key().as_bytes())
            .map_err(|_| ApiError::InvalidSharedKey)?;
        mac.update(canonical.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    pub fn authorization(&self, request: &CanonicalRequest<'_>) -> Result<String, ApiError> {
        let signature = self.signature(&request.to_canonical_string())?;
        Ok(format!("SharedKey {}:{signature}", self.credentials.api_key()))
    }
}
