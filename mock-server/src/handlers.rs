//! Route handlers for `/v3/placeholders` and `/v3/templates`.
//!
//! Request bodies are read as raw bytes and decoded here so that malformed
//! payloads get an error envelope instead of axum's plain-text rejection.

use std::sync::atomic::Ordering;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::{
    envelope::{no_content, success, Failure},
    AppState, EDITOR_URL,
};

type Reply = Result<Response, Failure>;

#[derive(Debug, Deserialize)]
pub struct NewPlaceholder {
    pub name: String,
    pub data: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaceholderChanges {
    pub name: Option<String>,
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub placeholder_ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub placeholder_ids: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CopyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PdfRequest {
    pub data: String,
    #[serde(default)]
    pub language: String,
}

fn payload<T: DeserializeOwned>(body: &Bytes) -> Result<T, Failure> {
    serde_json::from_slice(body).map_err(|e| Failure::bad_request(format!("Malformed request body: {e}")))
}

/// Placeholder data travels as JSON text and must itself parse.
fn json_text(data: &str) -> Result<Value, Failure> {
    serde_json::from_str(data).map_err(|e| Failure::bad_request(format!("Placeholder data is not JSON: {e}")))
}

fn required_name(name: String) -> Result<String, Failure> {
    if name.is_empty() {
        return Err(Failure::bad_request("A name is required."));
    }
    Ok(name)
}

fn list(key: &str, items: Vec<Value>) -> Response {
    if items.is_empty() {
        return no_content();
    }
    success(StatusCode::OK, json!({ key: items }))
}

fn created(url: String) -> Response {
    success(StatusCode::CREATED, json!({ "url": url }))
}

fn updated(url: String) -> Response {
    success(StatusCode::OK, json!({ "url": url }))
}

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

pub async fn list_placeholders(State(state): State<AppState>) -> Response {
    list("placeholders", state.store.read().await.list_placeholders())
}

pub async fn create_placeholder(State(state): State<AppState>, body: Bytes) -> Reply {
    let input: NewPlaceholder = payload(&body)?;
    let name = required_name(input.name)?;
    json_text(&input.data)?;
    let id = state.store.write().await.create_placeholder(name, input.data);
    info!(%id, "placeholder created");
    Ok(created(format!("/v3/placeholders/{id}")))
}

pub async fn get_placeholder(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    let view = state.store.read().await.placeholder_detail(&id)?;
    Ok(success(StatusCode::OK, view))
}

pub async fn update_placeholder(State(state): State<AppState>, Path(id): Path<String>, body: Bytes) -> Reply {
    let input: PlaceholderChanges = payload(&body)?;
    if let Some(data) = &input.data {
        json_text(data)?;
    }
    state
        .store
        .write()
        .await
        .update_placeholder(&id, input.name, input.data)?;
    Ok(updated(format!("/v3/placeholders/{id}")))
}

pub async fn copy_placeholder(State(state): State<AppState>, Path(id): Path<String>, body: Bytes) -> Reply {
    let input: CopyRequest = payload(&body)?;
    let copy = state.store.write().await.copy_placeholder(&id, input.name)?;
    info!(source = %id, id = %copy, "placeholder copied");
    Ok(created(format!("/v3/placeholders/{copy}")))
}

pub async fn delete_placeholder(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    state.store.write().await.delete_placeholder(&id)?;
    info!(%id, "placeholder deleted");
    Ok(no_content())
}

pub async fn templates_by_placeholder(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    let templates = state.store.read().await.templates_using(&id)?;
    Ok(list("templates", templates))
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

pub async fn list_templates(State(state): State<AppState>) -> Response {
    list("templates", state.store.read().await.list_templates())
}

pub async fn create_template(State(state): State<AppState>, body: Bytes) -> Reply {
    let input: NewTemplate = payload(&body)?;
    let name = required_name(input.name)?;
    let id = state
        .store
        .write()
        .await
        .create_template(name, input.description, input.placeholder_ids)?;
    info!(%id, "template created");
    Ok(created(format!("/v3/templates/{id}")))
}

pub async fn get_template(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    let view = state.store.read().await.template_detail(&id)?;
    Ok(success(StatusCode::OK, view))
}

pub async fn update_template(State(state): State<AppState>, Path(id): Path<String>, body: Bytes) -> Reply {
    let input: TemplateChanges = payload(&body)?;
    state.store.write().await.update_template(
        &id,
        input.name,
        input.description,
        input.placeholder_ids,
    )?;
    Ok(updated(format!("/v3/templates/{id}")))
}

pub async fn copy_template(State(state): State<AppState>, Path(id): Path<String>, body: Bytes) -> Reply {
    let input: CopyRequest = payload(&body)?;
    let copy = state
        .store
        .write()
        .await
        .copy_template(&id, input.name, input.description)?;
    info!(source = %id, id = %copy, "template copied");
    Ok(created(format!("/v3/templates/{copy}")))
}

pub async fn delete_template(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    state.store.write().await.delete_template(&id)?;
    info!(%id, "template deleted");
    Ok(no_content())
}

pub async fn placeholders_by_template(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    let placeholders = state.store.read().await.placeholders_of(&id)?;
    Ok(list("placeholders", placeholders))
}

pub async fn editor_url(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    state.store.read().await.template_detail(&id)?;
    let url = format!("{EDITOR_URL}/?token={}", Uuid::new_v4().simple());
    Ok(success(StatusCode::OK, json!({ "url": url })))
}

/// Renders at most `pdf_quota` documents; later calls are throttled with 429.
pub async fn render_pdf(State(state): State<AppState>, Path(id): Path<String>, body: Bytes) -> Reply {
    let input: PdfRequest = payload(&body)?;
    let data = json_text(&input.data)?;

    if let Some(quota) = state.config.pdf_quota {
        if state.pdf_renders.fetch_add(1, Ordering::SeqCst) >= quota {
            return Err(Failure::new(
                StatusCode::TOO_MANY_REQUESTS,
                "PDF quota exhausted, try again later.",
            ));
        }
    }

    let pdf = state.store.read().await.render(&id, &data, &input.language)?;
    info!(%id, bytes = pdf.len(), "pdf rendered");
    Ok(success(StatusCode::CREATED, json!({ "pdf": BASE64.encode(pdf) })))
}
