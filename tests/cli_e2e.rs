//! End-to-end CLI tests for the gofile-dl binary.

use std::process::Output;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Runs the binary against `server` off the async runtime, without a guest account.
async fn run_against(server: &MockServer, mut args: Vec<String>) -> Output {
    args.push("--no-guest".to_string());
    run_binary(server, args).await
}

/// Runs the binary against `server` with only the endpoint overrides added.
async fn run_binary(server: &MockServer, args: Vec<String>) -> Output {
    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        Command::cargo_bin("gofile-dl")
            .unwrap()
            .args(&args)
            .args([
                "--no-progress",
                "--api-url",
                uri.as_str(),
                "--website-url",
                uri.as_str(),
            ])
            .env_remove("GOFILE_TOKEN")
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

async fn mount_file(server: &MockServer, id: &str, name: &str, body: &[u8]) {
    let link = format!("{}/download/{id}/{name}", server.uri());
    Mock::given(method("GET"))
        .and(path(format!("/contents/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "id": id,
                "type": "file",
                "name": name,
                "link": link,
                "size": body.len()
            }
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/download/{id}/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("gofile-dl").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Gofile"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("gofile-dl").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gofile-dl"));
}

#[test]
fn test_binary_missing_content_returns_error() {
    let mut cmd = Command::cargo_bin("gofile-dl").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("CONTENT"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("gofile-dl").unwrap();
    cmd.args(["abc123", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_downloads_single_file() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_file(&server, "abc123", "x.zip", b"0123456789").await;

    let output = run_against(
        &server,
        vec![
            format!("{}/d/abc123", server.uri()),
            "-o".to_string(),
            format!("{}/", temp.path().display()),
        ],
    )
    .await;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        std::fs::read(temp.path().join("x.zip")).unwrap(),
        b"0123456789"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_rerun_single_file_overwrites() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_file(&server, "abc123", "x.zip", b"fresh").await;
    std::fs::write(temp.path().join("x.zip"), b"stale copy").unwrap();

    let output = run_against(
        &server,
        vec!["abc123".to_string(), "-o".to_string(), format!("{}/", temp.path().display())],
    )
    .await;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(std::fs::read(temp.path().join("x.zip")).unwrap(), b"fresh");
    assert!(!temp.path().join("x_1.zip").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_guest_token_reaches_api_and_download() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let uri = server.uri();

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": { "token": "guest-tok" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contents/abc123"))
        .and(header("authorization", "Bearer guest-tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "id": "abc123",
                "type": "file",
                "name": "x.zip",
                "link": format!("{uri}/download/abc123/x.zip"),
                "size": 7
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/abc123/x.zip"))
        .and(header("cookie", "accountToken=guest-tok"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"payload".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_binary(
        &server,
        vec!["abc123".to_string(), "-o".to_string(), format!("{}/", temp.path().display())],
    )
    .await;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(std::fs::read(temp.path().join("x.zip")).unwrap(), b"payload");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_guest_account_failure_is_not_fatal() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_file(&server, "abc123", "x.zip", b"anonymous").await;

    let output = run_binary(
        &server,
        vec!["abc123".to_string(), "-o".to_string(), format!("{}/", temp.path().display())],
    )
    .await;

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(std::fs::read(temp.path().join("x.zip")).unwrap(), b"anonymous");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_output_file_path_renames_download() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_file(&server, "abc123", "x.zip", b"payload").await;

    let target = temp.path().join("renamed.zip");
    let output = run_against(
        &server,
        vec![
            "abc123".to_string(),
            "-o".to_string(),
            target.display().to_string(),
        ],
    )
    .await;

    assert!(output.status.success());
    assert_eq!(std::fs::read(&target).unwrap(), b"payload");
    assert!(!temp.path().join("x.zip").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_password_required_fails_with_hint() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/contents/locked"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": { "id": "locked", "type": "folder", "password": true, "passwordStatus": "passwordRequired" }
        })))
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        vec![
            "locked".to_string(),
            "-q".to_string(),
            "-o".to_string(),
            format!("{}/", temp.path().display()),
        ],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--password"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_api_error_reports_server_message() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/contents/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": "error-notFound",
            "data": { "message": "Content not found" }
        })))
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        vec![
            "gone".to_string(),
            "-o".to_string(),
            format!("{}/", temp.path().display()),
        ],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Content not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_folder_all_downloads_every_file() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/contents/album"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "id": "album",
                "type": "folder",
                "name": "Album",
                "children": {
                    "a": { "id": "a", "type": "file", "name": "a.txt", "link": format!("{uri}/download/a/a.txt") },
                    "b": { "id": "b", "type": "file", "name": "b.txt", "link": format!("{uri}/download/b/b.txt") }
                }
            }
        })))
        .mount(&server)
        .await;
    for (id, body) in [("a", "alpha"), ("b", "beta")] {
        Mock::given(method("GET"))
            .and(path(format!("/download/{id}/{id}.txt")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
    }

    let output = run_against(
        &server,
        vec![
            "album".to_string(),
            "--all".to_string(),
            "-f".to_string(),
            "Saved".to_string(),
            "-o".to_string(),
            temp.path().display().to_string(),
        ],
    )
    .await;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let saved = temp.path().join("Saved");
    assert_eq!(std::fs::read(saved.join("a.txt")).unwrap(), b"alpha");
    assert_eq!(std::fs::read(saved.join("b.txt")).unwrap(), b"beta");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_folder_without_all_takes_first_file() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/contents/album"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "id": "album",
                "type": "folder",
                "children": {
                    "b": { "id": "b", "type": "file", "name": "b.txt", "link": format!("{uri}/download/b/b.txt") },
                    "a": { "id": "a", "type": "file", "name": "a.txt", "link": format!("{uri}/download/a/a.txt") }
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/b/b.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("beta"))
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        vec![
            "album".to_string(),
            "-o".to_string(),
            format!("{}/", temp.path().display()),
        ],
    )
    .await;

    assert!(output.status.success());
    assert!(temp.path().join("b.txt").exists());
    assert!(!temp.path().join("a.txt").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_recursive_downloads_nested_folders() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/contents/tree"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "id": "tree",
                "type": "folder",
                "name": "Tree",
                "children": {
                    "top": { "id": "top", "type": "file", "name": "top.txt", "link": format!("{uri}/download/top/top.txt") },
                    "sub": { "id": "sub", "type": "folder", "name": "Nested" }
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contents/sub"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "id": "sub",
                "type": "folder",
                "name": "Nested",
                "children": {
                    "deep": { "id": "deep", "type": "file", "name": "deep.txt", "link": format!("{uri}/download/deep/deep.txt") }
                }
            }
        })))
        .mount(&server)
        .await;
    for (id, body) in [("top", "upper"), ("deep", "lower")] {
        Mock::given(method("GET"))
            .and(path(format!("/download/{id}/{id}.txt")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
    }

    let output = run_against(
        &server,
        vec![
            "tree".to_string(),
            "--all".to_string(),
            "--recursive".to_string(),
            "-o".to_string(),
            temp.path().display().to_string(),
        ],
    )
    .await;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(std::fs::read(temp.path().join("top.txt")).unwrap(), b"upper");
    assert_eq!(
        std::fs::read(temp.path().join("Nested").join("deep.txt")).unwrap(),
        b"lower"
    );
}
