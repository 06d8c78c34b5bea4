//! Client core for the PDFrePRO v3 API.
//!
//! # Overview
//! Builds signed `HttpRequest` values and validates `HttpResponse` values
//! (host-does-IO pattern). `PdfreproClient` never touches the network;
//! `Client` pairs it with a `Transport` (ureq by default) and runs one
//! round-trip per call.
//!
//! # Design
//! - Every request carries a `SharedKey` authorization: an HMAC-SHA256 over
//!   nine canonical fields, keyed with the 64-character shared key.
//! - Every response is checked twice: first the `{code, status, data}`
//!   envelope against the operation's accepted status codes, then the shape
//!   of `data` for the resource that was asked for.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod blocking;
pub mod client;
pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod http;
pub mod request;
pub mod resource;
pub mod signer;
pub mod transport;
pub mod types;

pub use blocking::Client;
pub use client::PdfreproClient;
pub use config::{ClientConfig, DEFAULT_HOST};
pub use credentials::{ApiKey, Credentials, SharedKey};
pub use endpoint::Operation;
pub use error::{ApiError, Resource};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use transport::UreqTransport;
pub use types::{decode_pdf, resource_id, Placeholder, Template};
