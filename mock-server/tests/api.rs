use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mock_server::{
    app,
    auth::{canonical_for, sign},
    MockConfig, DEMO_API_KEY, DEMO_SHARED_KEY,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const JSON_UTF8: &str = "application/json;charset=utf-8";
const DATE: &str = "Sun, 18 Oct 2026 10:00:00 GMT";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// A request signed the way a PDFrePRO client signs it.
fn signed_with(shared_key: &str, method: Method, uri: &str, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method.clone())
        .uri(uri)
        .header(header::HOST, "localhost:3000")
        .header(header::ACCEPT, JSON_UTF8)
        .header(header::DATE, DATE);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, JSON_UTF8);
    }
    let bytes = body.unwrap_or("").as_bytes().to_vec();
    let headers = builder.headers_ref().unwrap().clone();
    let canonical = canonical_for(DEMO_API_KEY, &method, uri, &headers, &bytes);
    let signature = sign(shared_key, &canonical).unwrap();
    builder
        .header(header::AUTHORIZATION, format!("SharedKey {DEMO_API_KEY}:{signature}"))
        .body(Body::from(bytes))
        .unwrap()
}

fn signed(method: Method, uri: &str, body: Option<&str>) -> Request<Body> {
    signed_with(DEMO_SHARED_KEY, method, uri, body)
}

async fn send(app: &Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

/// Create a placeholder and return its id.
async fn create_placeholder(app: &Router, name: &str) -> String {
    let body = json!({ "name": name, "data": "{\"customer\":\"ACME\"}" }).to_string();
    let resp = send(app, signed(Method::POST, "/v3/placeholders", Some(&body))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let envelope = body_json(resp).await;
    let url = envelope["data"]["url"].as_str().unwrap().to_string();
    url.rsplit('/').next().unwrap().to_string()
}

async fn create_template(app: &Router, name: &str, placeholder_ids: &[&str]) -> String {
    let body = json!({ "name": name, "description": "", "placeholderIds": placeholder_ids }).to_string();
    let resp = send(app, signed(Method::POST, "/v3/templates", Some(&body))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let envelope = body_json(resp).await;
    let url = envelope["data"]["url"].as_str().unwrap().to_string();
    url.rsplit('/').next().unwrap().to_string()
}

// --- authorization ---

#[tokio::test]
async fn unsigned_request_is_rejected_with_envelope() {
    let app = app(MockConfig::default());
    let resp = send(
        &app,
        Request::builder().uri("/v3/templates").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let envelope = body_json(resp).await;
    assert_eq!(envelope["code"], 401);
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["data"], "Unauthorized");
}

#[tokio::test]
async fn wrong_shared_key_is_rejected() {
    let app = app(MockConfig::default());
    let other_key = "0".repeat(64);
    let resp = send(&app, signed_with(&other_key, Method::GET, "/v3/templates", None)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_body_is_rejected() {
    let app = app(MockConfig::default());
    let request = signed(Method::POST, "/v3/templates", Some(r#"{"name":"a"}"#));
    let (parts, _) = request.into_parts();
    let tampered = Request::from_parts(parts, Body::from(r#"{"name":"b"}"#));
    let resp = send(&app, tampered).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- placeholders ---

#[tokio::test]
async fn empty_lists_are_no_content() {
    let app = app(MockConfig::default());
    for uri in ["/v3/placeholders", "/v3/templates"] {
        let resp = send(&app, signed(Method::GET, uri, None)).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(body_bytes(resp).await.is_empty());
    }
}

#[tokio::test]
async fn created_placeholder_is_fetchable_with_raw_data() {
    let app = app(MockConfig::default());
    let id = create_placeholder(&app, "Customer").await;

    let resp = send(&app, signed(Method::GET, &format!("/v3/placeholders/{id}"), None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let envelope = body_json(resp).await;
    assert_eq!(envelope["code"], 200);
    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["data"]["id"], id.as_str());
    assert_eq!(envelope["data"]["rawData"], "{\"customer\":\"ACME\"}");
    assert_eq!(envelope["data"]["numberOfReferencedTemplates"], 0);

    let resp = send(&app, signed(Method::GET, "/v3/placeholders", None)).await;
    let envelope = body_json(resp).await;
    let list = envelope["data"]["placeholders"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert!(list[0].get("rawData").is_none());
}

#[tokio::test]
async fn placeholder_data_must_be_json() {
    let app = app(MockConfig::default());
    let body = json!({ "name": "Broken", "data": "not json" }).to_string();
    let resp = send(&app, signed(Method::POST, "/v3/placeholders", Some(&body))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let envelope = body_json(resp).await;
    assert_eq!(envelope["status"], "error");
    assert!(envelope["message"].as_str().unwrap().contains("not JSON"));
}

#[tokio::test]
async fn update_answers_with_own_url() {
    let app = app(MockConfig::default());
    let id = create_placeholder(&app, "Customer").await;
    let uri = format!("/v3/placeholders/{id}");

    let resp = send(&app, signed(Method::PUT, &uri, Some(r#"{"name":"Client"}"#))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["url"], uri.as_str());

    let resp = send(&app, signed(Method::GET, &uri, None)).await;
    assert_eq!(body_json(resp).await["data"]["name"], "Client");
}

#[tokio::test]
async fn referenced_placeholder_cannot_be_deleted() {
    let app = app(MockConfig::default());
    let placeholder = create_placeholder(&app, "Customer").await;
    let template = create_template(&app, "Invoice", &[placeholder.as_str()]).await;

    let uri = format!("/v3/placeholders/{placeholder}");
    let resp = send(&app, signed(Method::DELETE, &uri, None)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = send(&app, signed(Method::DELETE, &format!("/v3/templates/{template}"), None)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&app, signed(Method::DELETE, &uri, None)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, signed(Method::GET, &uri, None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["data"], "Not Found");
}

// --- templates ---

#[tokio::test]
async fn template_detail_lists_used_placeholders() {
    let app = app(MockConfig::default());
    let placeholder = create_placeholder(&app, "Customer").await;
    let template = create_template(&app, "Invoice", &[placeholder.as_str()]).await;

    let resp = send(&app, signed(Method::GET, &format!("/v3/templates/{template}"), None)).await;
    let envelope = body_json(resp).await;
    assert_eq!(envelope["data"]["usedPlaceholders"], json!([placeholder.as_str()]));

    let uri = format!("/v3/templates/{template}/placeholders");
    let envelope = body_json(send(&app, signed(Method::GET, &uri, None)).await).await;
    assert_eq!(envelope["data"]["placeholders"][0]["numberOfReferencedTemplates"], 1);

    let uri = format!("/v3/placeholders/{placeholder}/templates");
    let envelope = body_json(send(&app, signed(Method::GET, &uri, None)).await).await;
    assert_eq!(envelope["data"]["templates"][0]["id"], template.as_str());
}

#[tokio::test]
async fn copy_creates_a_new_template() {
    let app = app(MockConfig::default());
    let template = create_template(&app, "Invoice", &[]).await;
    let uri = format!("/v3/templates/{template}");

    let resp = send(&app, signed(Method::POST, &uri, Some(r#"{"name":"Invoice 2"}"#))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let url = body_json(resp).await["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/v3/templates/"));
    assert_ne!(url, uri);
}

#[tokio::test]
async fn editor_url_points_at_editor() {
    let app = app(MockConfig::default());
    let template = create_template(&app, "Invoice", &[]).await;
    let uri = format!("/v3/templates/{template}/editor-url");
    let resp = send(&app, signed(Method::GET, &uri, None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let url = body_json(resp).await["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with(mock_server::EDITOR_URL));
}

#[tokio::test]
async fn pdf_is_base64_and_quota_throttles() {
    let app = app(MockConfig::default().with_pdf_quota(1));
    let template = create_template(&app, "Invoice", &[]).await;
    let uri = format!("/v3/templates/{template}/pdf");
    let body = json!({ "data": "{\"total\":42}", "language": "de" }).to_string();

    let resp = send(&app, signed(Method::POST, &uri, Some(&body))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let pdf = body_json(resp).await["data"]["pdf"].as_str().unwrap().to_string();
    assert!(pdf.starts_with("JVBERi0xLjQ"), "Base64 of %PDF-1.4");

    let resp = send(&app, signed(Method::POST, &uri, Some(&body))).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let envelope = body_json(resp).await;
    assert_eq!(envelope["code"], 429);
    assert_eq!(envelope["status"], "error");
}

#[tokio::test]
async fn unknown_template_is_not_found() {
    let app = app(MockConfig::default());
    let resp = send(&app, signed(Method::GET, "/v3/templates/nope", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let envelope = body_json(resp).await;
    assert_eq!(envelope["code"], 404);
    assert_eq!(envelope["message"], "Unknown template.");
}
