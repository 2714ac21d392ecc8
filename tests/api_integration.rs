//! Integration tests for the metadata client against a mock API.

use gofile_core::api::{ApiClient, ApiError, ContentDescriptor, Credentials, hash_password};
use gofile_core::config::DEFAULT_WEBSITE_TOKEN;
use gofile_core::{ContentId, GofileConfig};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&GofileConfig::new().with_api_base_url(server.uri()))
        .expect("failed to build API client")
}

#[tokio::test]
async fn test_fetch_sends_fixed_query_and_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contents/abc123"))
        .and(query_param("wt", DEFAULT_WEBSITE_TOKEN))
        .and(query_param("cache", "true"))
        .and(query_param("sortField", "createTime"))
        .and(query_param("sortDirection", "1"))
        .and(query_param_is_missing("password"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "id": "abc123",
                "type": "file",
                "name": "x.zip",
                "link": "https://host/d/abc123",
                "size": 1000
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let descriptor = client_for(&server)
        .fetch(
            &ContentId::from_raw("abc123"),
            &Credentials::new(Some("tok123".to_string()), None),
        )
        .await
        .expect("fetch should succeed");

    let file = descriptor.as_file().expect("expected a file descriptor");
    assert_eq!(file.name.as_deref(), Some("x.zip"));
    assert_eq!(file.link.as_deref(), Some("https://host/d/abc123"));
    assert_eq!(file.size, Some(1000));
}

#[tokio::test]
async fn test_fetch_sends_password_digest_only() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contents/locked"))
        .and(query_param("password", hash_password("hunter2").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "id": "locked",
                "type": "file",
                "name": "secret.pdf",
                "link": "https://host/download/locked/secret.pdf",
                "password": true,
                "passwordStatus": "passwordOk"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let descriptor = client_for(&server)
        .fetch(
            &ContentId::from_raw("locked"),
            &Credentials::new(None, Some("hunter2".to_string())),
        )
        .await
        .expect("fetch should succeed");
    assert!(descriptor.as_file().is_some());

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(
        requests
            .iter()
            .all(|request| !request.url.as_str().contains("hunter2")),
        "raw password must never be sent"
    );
}

#[tokio::test]
async fn test_fetch_password_required_is_distinct_variant() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contents/locked"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "id": "locked",
                "type": "folder",
                "password": true,
                "passwordStatus": "passwordRequired"
            }
        })))
        .mount(&server)
        .await;

    let descriptor = client_for(&server)
        .fetch(&ContentId::from_raw("locked"), &Credentials::default())
        .await
        .expect("password gate is not an error");
    assert!(matches!(
        descriptor,
        ContentDescriptor::PasswordRequired { .. }
    ));
}

#[tokio::test]
async fn test_fetch_error_status_carries_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contents/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": "error-notFound",
            "data": { "message": "Content not found" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let error = client_for(&server)
        .fetch(&ContentId::from_raw("gone"), &Credentials::default())
        .await
        .expect_err("non-ok status must fail");

    match error {
        ApiError::Status {
            status, message, ..
        } => {
            assert_eq!(status, "error-notFound");
            assert_eq!(message, "Content not found");
        }
        other => panic!("Expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_non_json_error_is_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .fetch(&ContentId::from_raw("abc"), &Credentials::default())
        .await
        .expect_err("gateway error must fail");
    assert!(matches!(error, ApiError::HttpStatus { status: 502, .. }));
}

#[tokio::test]
async fn test_fetch_folder_preserves_child_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contents/folder1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"status":"ok","data":{"id":"folder1","type":"folder","name":"Album","children":{
                "zz":{"id":"zz","type":"file","name":"first.jpg","link":"https://host/download/zz/first.jpg"},
                "aa":{"id":"aa","type":"file","name":"second.jpg","link":"https://host/download/aa/second.jpg"},
                "mm":{"id":"mm","type":"folder","name":"Nested"}
            }}}"#,
        ))
        .mount(&server)
        .await;

    let descriptor = client_for(&server)
        .fetch(&ContentId::from_raw("folder1"), &Credentials::default())
        .await
        .expect("fetch should succeed");
    let folder = descriptor.as_folder().expect("expected a folder");

    let names: Vec<_> = folder.files().filter_map(|f| f.name.as_deref()).collect();
    assert_eq!(names, vec!["first.jpg", "second.jpg"]);
    assert_eq!(folder.file_count(), 2);
    assert_eq!(folder.subfolders().count(), 1);
    assert_eq!(
        folder.first_file().and_then(|f| f.name.as_deref()),
        Some("first.jpg")
    );
}

#[tokio::test]
async fn test_fetch_unknown_type_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": { "id": "x", "type": "shortcut", "name": "odd" }
        })))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .fetch(&ContentId::from_raw("x"), &Credentials::default())
        .await
        .expect_err("unknown type must fail");
    assert!(matches!(error, ApiError::UnknownContentType { .. }));
}

#[tokio::test]
async fn test_create_guest_account_returns_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": { "id": "acc1", "token": "guest-token" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = client_for(&server)
        .create_guest_account()
        .await
        .expect("guest account should be created");
    assert_eq!(token, "guest-token");
}

#[tokio::test]
async fn test_create_guest_account_without_token_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {}
        })))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .create_guest_account()
        .await
        .expect_err("missing token must fail");
    assert!(matches!(error, ApiError::Malformed { .. }));
}
