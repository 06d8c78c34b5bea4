//! Full placeholder/template lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every client
//! operation over real HTTP through `Client<UreqTransport>`. The mock checks
//! each `Authorization` header independently, so these tests also prove the
//! signature is computed over exactly what goes on the wire.

use std::io::{Read, Write};

use mock_server::MockConfig;
use pdfrepro_core::{decode_pdf, resource_id, ApiError, Client};
use serde_json::json;

const API_KEY: &str = "abcdefghij0123456789";
const SHARED_KEY: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz012345678901";

/// Start the mock server on an ephemeral port and return its base URL.
fn start(config: MockConfig) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, config).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn client_for(host: &str, shared_key: &str) -> Client {
    let mut client = Client::new(API_KEY, shared_key).unwrap();
    client.set_host(host);
    client
}

#[test]
fn placeholder_and_template_lifecycle() {
    let host = start(MockConfig::new(API_KEY, SHARED_KEY));
    let client = client_for(&host, SHARED_KEY);
    assert_eq!(client.host(), host);

    // Step 1: a fresh account has nothing (204 → empty lists).
    assert!(client.get_all_placeholders().unwrap().is_empty());
    assert!(client.get_all_templates().unwrap().is_empty());

    // Step 2: create a placeholder and fetch it back by the returned URL.
    let url = client
        .create_placeholder("Customer", r#"{"customer":"ACME","items":[1,2]}"#)
        .unwrap();
    assert!(url.starts_with("/v3/placeholders/"));
    let placeholder_id = resource_id(&url).unwrap().to_string();

    let placeholder = client.get_placeholder(&placeholder_id).unwrap();
    assert_eq!(placeholder.id, placeholder_id);
    assert_eq!(placeholder.name, "Customer");
    assert_eq!(placeholder.number_of_referenced_templates, 0);
    assert_eq!(
        placeholder.raw_data.as_deref(),
        Some(r#"{"customer":"ACME","items":[1,2]}"#)
    );

    // Step 3: update (name only), then copy.
    client
        .update_placeholder(&placeholder_id, Some("Client"), None)
        .unwrap();
    let renamed = client.get_placeholder(&placeholder_id).unwrap();
    assert_eq!(renamed.name, "Client");
    assert_eq!(renamed.raw_data, placeholder.raw_data);

    let copy_url = client
        .copy_placeholder(&placeholder_id, Some("Client (copy)"))
        .unwrap();
    let copy_id = resource_id(&copy_url).unwrap().to_string();
    assert_ne!(copy_id, placeholder_id);
    assert_eq!(client.get_all_placeholders().unwrap().len(), 2);

    // Step 4: a template that uses the placeholder.
    let url = client
        .create_template("Invoice", Some("Monthly invoice"), &[placeholder_id.clone()])
        .unwrap();
    let template_id = resource_id(&url).unwrap().to_string();

    let template = client.get_template(&template_id).unwrap();
    assert_eq!(template.name, "Invoice");
    assert_eq!(template.description.as_deref(), Some("Monthly invoice"));
    assert_eq!(template.used_placeholders, Some(vec![placeholder_id.clone()]));

    // Step 5: cross-queries in both directions.
    let using = client.get_templates_by_placeholder(&placeholder_id).unwrap();
    assert_eq!(using.len(), 1);
    assert_eq!(using[0].id, template_id);
    assert!(using[0].used_placeholders.is_none());

    let used = client.get_placeholders_by_template(&template_id).unwrap();
    assert_eq!(used.len(), 1);
    assert_eq!(used[0].number_of_referenced_templates, 1);
    assert!(used[0].raw_data.is_none());

    assert!(client.get_templates_by_placeholder(&copy_id).unwrap().is_empty());

    // Step 6: update the template, clearing description and placeholders.
    client
        .update_template(&template_id, Some("Invoice v2"), Some(""), Some(&[]))
        .unwrap();
    let template = client.get_template(&template_id).unwrap();
    assert_eq!(template.name, "Invoice v2");
    assert_eq!(template.description.as_deref(), Some(""));
    assert_eq!(template.used_placeholders, Some(Vec::new()));

    // Step 7: copy it, open the editor, render a PDF.
    let copy_url = client
        .copy_template(&template_id, None, Some("duplicate"))
        .unwrap();
    let template_copy_id = resource_id(&copy_url).unwrap().to_string();
    assert_eq!(client.get_template(&template_copy_id).unwrap().name, "Invoice v2");

    let editor = client.get_editor_url(&template_id).unwrap();
    assert!(editor.starts_with("https://editor.pdfrepro.de"));

    let data = json!({ "customer": "ACME", "total": 42.5 });
    let pdf = client.get_pdf(&template_id, Some(&data), "de").unwrap();
    let bytes = decode_pdf(&pdf).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));

    let pdf = client.get_pdf(&template_id, None, "").unwrap();
    assert!(!pdf.is_empty());

    // Step 8: tear everything down.
    client.delete_template(&template_copy_id).unwrap();
    client.delete_template(&template_id).unwrap();
    client.delete_placeholder(&copy_id).unwrap();
    client.delete_placeholder(&placeholder_id).unwrap();

    match client.get_template(&template_id).unwrap_err() {
        ApiError::Reported { code, .. } => assert_eq!(code, 404),
        other => panic!("expected a reported 404, got {other:?}"),
    }
    assert!(client.get_all_placeholders().unwrap().is_empty());
    assert!(client.get_all_templates().unwrap().is_empty());
}

#[test]
fn invalid_placeholder_data_is_rejected_locally() {
    let host = start(MockConfig::new(API_KEY, SHARED_KEY));
    let client = client_for(&host, SHARED_KEY);

    let err = client.create_placeholder("Broken", "{not json").unwrap_err();
    assert!(matches!(err, ApiError::Json(_)));
    assert!(client.get_all_placeholders().unwrap().is_empty());
}

#[test]
fn wrong_shared_key_is_reported_as_401() {
    let host = start(MockConfig::new(API_KEY, SHARED_KEY));
    let other_key = "Z".repeat(64);
    let client = client_for(&host, &other_key);

    let err = client.get_all_templates().unwrap_err();
    assert_eq!(err.code(), Some(401));
    assert!(matches!(err, ApiError::Reported { .. }));
}

#[test]
fn exhausted_pdf_quota_is_reported_as_429() {
    let host = start(MockConfig::new(API_KEY, SHARED_KEY).with_pdf_quota(0));
    let client = client_for(&host, SHARED_KEY);

    let url = client.create_template("Invoice", None, &[]).unwrap();
    let id = resource_id(&url).unwrap().to_string();
    let err = client.get_pdf(&id, None, "en").unwrap_err();
    assert_eq!(err.code(), Some(429));
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_for(&format!("http://{addr}"), SHARED_KEY);

    let err = client.get_all_templates().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}

/// Answer exactly one request with a fixed raw HTTP response.
fn serve_once(response: Vec<u8>) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(&response).unwrap();
        stream.flush().unwrap();
    });
    format!("http://{addr}")
}

#[test]
fn non_utf8_body_is_a_malformed_response() {
    let body = b"<html>\xff\xfe bad gateway</html>";
    let mut response = format!(
        "HTTP/1.1 502 Bad Gateway\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    let client = client_for(&serve_once(response), SHARED_KEY);

    let err = client.get_all_templates().unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)), "got {err:?}");
}
