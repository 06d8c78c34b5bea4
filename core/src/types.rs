//! Domain DTOs for the PDFrePRO API.
//!
//! # Design
//! Response types are only ever built by `resource` after their shape has
//! been checked, so their fields are plain owned values. Request payloads
//! skip absent optional fields entirely; the server treats a missing key as
//! "leave unchanged", which is different from an empty string.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Resource};

/// A named JSON data slot referenced by templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub id: String,
    pub name: String,
    pub last_modification_date: String,
    pub number_of_referenced_templates: u64,
    /// Only present when a single placeholder is fetched by id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<String>,
}

/// A document layout that merges placeholder data into a PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub last_modification_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ids of the placeholders the template uses. Only present when a single
    /// template is fetched by id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_placeholders: Option<Vec<String>>,
}

/// Payload for `POST /v3/placeholders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlaceholder {
    pub name: String,
    /// JSON document, sent as a string.
    pub data: String,
}

/// Payload for `PUT /v3/placeholders/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceholderChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Payload for `POST /v3/templates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    pub description: String,
    pub placeholder_ids: Vec<String>,
}

/// Payload for `PUT /v3/templates/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_ids: Option<Vec<String>>,
}

/// Payload for copying a placeholder or template (`POST .../{id}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CopyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload for `POST /v3/templates/{id}/pdf`. `data` is itself JSON text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfRequest {
    pub data: String,
    pub language: String,
}

/// The trailing id of a resource URL such as `/v3/placeholders/{id}`.
pub fn resource_id(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
}

/// Decode the Base64 PDF returned by `get_pdf`.
pub fn decode_pdf(pdf: &str) -> Result<Vec<u8>, ApiError> {
    BASE64
        .decode(pdf.trim())
        .map_err(|e| ApiError::invalid(Resource::Pdf, e.to_string()))
}
