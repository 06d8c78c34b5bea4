//! In-memory mock of the PDFrePRO v3 API.
//!
//! Every route sits behind `SharedKey` signature verification. Responses use
//! the `{code, status, data}` envelope; empty lists and deletes answer with a
//! bare 204.

use std::sync::{atomic::AtomicU32, Arc};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};

pub mod auth;
pub mod envelope;
pub mod handlers;
pub mod store;

use envelope::Failure;
use store::Store;

/// Base of the editor links handed out by `/v3/templates/{id}/editor-url`.
pub const EDITOR_URL: &str = "https://editor.pdfrepro.de";

/// Key pair used when none is configured.
pub const DEMO_API_KEY: &str = "abcdefghij0123456789";
pub const DEMO_SHARED_KEY: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz012345678901";

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub api_key: String,
    pub shared_key: String,
    /// Number of PDFs rendered before `/pdf` starts answering 429.
    pub pdf_quota: Option<u32>,
}

impl MockConfig {
    pub fn new(api_key: &str, shared_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            shared_key: shared_key.to_string(),
            pdf_quota: None,
        }
    }

    pub fn with_pdf_quota(mut self, quota: u32) -> Self {
        self.pdf_quota = Some(quota);
        self
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self::new(DEMO_API_KEY, DEMO_SHARED_KEY)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MockConfig>,
    pub store: Arc<RwLock<Store>>,
    pub pdf_renders: Arc<AtomicU32>,
}

impl AppState {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(RwLock::new(Store::default())),
            pdf_renders: Arc::new(AtomicU32::new(0)),
        }
    }
}

pub fn app(config: MockConfig) -> Router {
    use handlers::*;

    let state = AppState::new(config);
    Router::new()
        .route("/v3/placeholders", get(list_placeholders).post(create_placeholder))
        .route(
            "/v3/placeholders/{id}",
            get(get_placeholder)
                .put(update_placeholder)
                .post(copy_placeholder)
                .delete(delete_placeholder),
        )
        .route("/v3/placeholders/{id}/templates", get(templates_by_placeholder))
        .route("/v3/templates", get(list_templates).post(create_template))
        .route(
            "/v3/templates/{id}",
            get(get_template)
                .put(update_template)
                .post(copy_template)
                .delete(delete_template),
        )
        .route("/v3/templates/{id}/placeholders", get(placeholders_by_template))
        .route("/v3/templates/{id}/editor-url", get(editor_url))
        .route("/v3/templates/{id}/pdf", post(render_pdf))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::verify_signature))
        .fallback(|| async { Failure::not_found("resource") })
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}
