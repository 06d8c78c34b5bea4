//! `SharedKey` authorization, verified independently of the client crate.
//!
//! The canonical string is rebuilt from what actually arrived on the wire
//! (headers and body bytes), so a client that signs one thing and sends
//! another is rejected.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{digest::InvalidLength, Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::{envelope::Failure, AppState};

type HmacSha256 = Hmac<Sha256>;

const MAX_REQUEST_BYTES: usize = 4 * 1024 * 1024;

/// Join the nine signed fields, each terminated by a newline.
pub fn canonical_string(fields: [&str; 9]) -> String {
    fields.iter().fold(String::new(), |mut out, field| {
        out.push_str(field);
        out.push('\n');
        out
    })
}

/// Lowercase hex HMAC-SHA256 of `canonical` under `shared_key`.
pub fn sign(shared_key: &str, canonical: &str) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(shared_key.as_bytes())?;
    mac.update(canonical.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// `SharedKey <apiKey>:<signature>` split into its two parts.
fn parse_authorization(value: &str) -> Option<(&str, &str)> {
    value.strip_prefix("SharedKey ")?.split_once(':')
}

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
}

/// Canonical string for a request as received. Only POST and PUT contribute
/// a body hash and length.
pub fn canonical_for(api_key: &str, method: &Method, path: &str, headers: &HeaderMap, body: &[u8]) -> String {
    let has_body = *method == Method::POST || *method == Method::PUT;
    let (body_hash, content_length) = if has_body {
        (format!("{:x}", md5::compute(body)), body.len().to_string())
    } else {
        (String::new(), String::new())
    };
    let content_type = if has_body {
        header_str(headers, header::CONTENT_TYPE)
    } else {
        ""
    };
    canonical_string([
        api_key,
        method.as_str(),
        path,
        header_str(headers, header::HOST),
        &body_hash,
        header_str(headers, header::ACCEPT),
        content_type,
        &content_length,
        header_str(headers, header::DATE),
    ])
}

/// Middleware: reject anything not signed with the configured key pair.
pub async fn verify_signature(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_REQUEST_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return Failure::new(StatusCode::BAD_REQUEST, "Unreadable request body.").into_response(),
    };

    let authorization = header_str(&parts.headers, header::AUTHORIZATION);
    let Some((api_key, signature)) = parse_authorization(authorization) else {
        warn!(path = parts.uri.path(), "missing or malformed authorization");
        return Failure::new(StatusCode::UNAUTHORIZED, "Missing authorization.").into_response();
    };
    if api_key != state.config.api_key {
        warn!(path = parts.uri.path(), "unknown api key");
        return Failure::new(StatusCode::UNAUTHORIZED, "Unknown API key.").into_response();
    }

    let canonical = canonical_for(api_key, &parts.method, parts.uri.path(), &parts.headers, &bytes);
    let expected = match sign(&state.config.shared_key, &canonical) {
        Ok(expected) => expected,
        Err(_) => return Failure::new(StatusCode::INTERNAL_SERVER_ERROR, "Unusable shared key.").into_response(),
    };
    if expected != signature {
        warn!(method = %parts.method, path = parts.uri.path(), "signature mismatch");
        return Failure::new(StatusCode::UNAUTHORIZED, "Invalid signature.").into_response();
    }

    debug!(method = %parts.method, path = parts.uri.path(), "authorized");
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
