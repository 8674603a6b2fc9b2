//! CLI integration tests
//!
//! Runs the built binary with a scrubbed environment. Vision requests go to
//! a mock server; `--dry-run` keeps publishing in-process.

use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENV_KEYS: [&str; 13] = [
    "VISIONPIPE_GOOGLE_API_KEY",
    "GoogleAPIKey",
    "VISIONPIPE_VISION_ENDPOINT",
    "VISIONPIPE_QUEUE_CONNECTION",
    "MSGQ_CONSTR_VISION_ANALYSER",
    "VISIONPIPE_QUEUE_NAME",
    "MSGQ_NAME_VISION_ANALYSER",
    "VISIONPIPE_REQUEST_TIMEOUT",
    "VISIONPIPE_LANGUAGE_HINTS",
    "VISIONPIPE_STRIP",
    "VISIONPIPE_LOG_LEVEL",
    "VISIONPIPE_LOG_JSON",
    "RUST_LOG",
];

fn visionpipe() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_visionpipe"));
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

async fn mock_vision(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/images:annotate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": [{
                "labelAnnotations": [
                    { "mid": "/m/01yrx", "description": "Cat", "score": 0.99 }
                ],
                "fullTextAnnotation": { "text": "Hello \"World\"" }
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cli_help() {
    let output = visionpipe().arg("--help").output().await.unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("visionpipe"));
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("operations"));
    assert!(stdout.contains("config"));
}

#[tokio::test]
async fn test_cli_version() {
    let output = visionpipe().arg("--version").output().await.unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_operations_json() {
    let output = visionpipe()
        .args(["operations", "--format", "json"])
        .output()
        .await
        .unwrap();

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|op| op["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"DETECT_DOCTEXT"));
    assert!(names.contains(&"DETECT_ALL"));
}

#[tokio::test]
async fn test_config_hides_secrets() {
    let output = visionpipe()
        .args(["config", "--format", "json"])
        .env("VISIONPIPE_GOOGLE_API_KEY", "super-secret-key")
        .env("VISIONPIPE_QUEUE_NAME", "results")
        .output()
        .await
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("super-secret-key"));

    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["google_api_key"], "set");
    assert_eq!(value["queue_connection"], "not set");
    assert_eq!(value["queue_name"], "results");
}

#[tokio::test]
async fn test_config_rejects_invalid_queue_name() {
    let output = visionpipe()
        .arg("config")
        .env("VISIONPIPE_QUEUE_NAME", "Bad_Name")
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration error"));
}

#[tokio::test]
async fn test_analyze_dry_run_prints_envelopes() {
    let server = MockServer::start().await;
    mock_vision(&server).await;

    let output = visionpipe()
        .args([
            "analyze",
            "gs://bucket/cat.jpg",
            "-o",
            "labels",
            "-o",
            "doc-text",
            "--strip",
            "always",
            "--dry-run",
            "--format",
            "json",
        ])
        .env("VISIONPIPE_GOOGLE_API_KEY", "test-key")
        .env("VISIONPIPE_VISION_ENDPOINT", server.uri())
        .output()
        .await
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();

    let report = &value["reports"][0];
    assert_eq!(report["uri"], "gs://bucket/cat.jpg");
    assert_eq!(report["succeeded"].as_array().unwrap().len(), 2);
    assert!(report["failed"].as_array().unwrap().is_empty());

    let envelopes = value["envelopes"].as_array().unwrap();
    assert_eq!(envelopes.len(), 2);
    assert_eq!(envelopes[0]["APIFunction"], "DETECT_LABELS");
    assert_eq!(envelopes[0]["LabelAnnotations"][0]["description"], "Cat");
    assert!(envelopes[0]["LabelAnnotations"][0].get("mid").is_none());
    assert_eq!(envelopes[1]["APIFunction"], "DETECT_DOCTEXT");
}

#[tokio::test]
async fn test_analyze_local_file() {
    let server = MockServer::start().await;
    mock_vision(&server).await;

    let dir = TempDir::new().unwrap();
    let image = dir.path().join("cat.jpg");
    fs::write(&image, b"\xFF\xD8\xFF\xE0 not really a jpeg").unwrap();

    let output = visionpipe()
        .args(["analyze", image.to_str().unwrap(), "-o", "labels", "--dry-run", "-f", "json"])
        .env("VISIONPIPE_GOOGLE_API_KEY", "test-key")
        .env("VISIONPIPE_VISION_ENDPOINT", server.uri())
        .output()
        .await
        .unwrap();

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    let uri = value["reports"][0]["uri"].as_str().unwrap();
    assert!(uri.starts_with("file://"));
    assert!(uri.ends_with("cat.jpg"));
    assert_eq!(value["envelopes"][0]["BLOBURI"], uri);
}

#[tokio::test]
async fn test_analyze_without_api_key_fails_resource() {
    let output = visionpipe()
        .args(["analyze", "gs://bucket/cat.jpg", "--dry-run", "--format", "json"])
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["reports"].as_array().unwrap().is_empty());
    let error = value["failures"][0]["error"].as_str().unwrap();
    assert!(error.contains("API key"));
}

#[tokio::test]
async fn test_analyze_without_queue_connection() {
    let output = visionpipe()
        .args(["analyze", "gs://bucket/cat.jpg"])
        .env("VISIONPIPE_GOOGLE_API_KEY", "test-key")
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Queue connection string not set"));
}

#[tokio::test]
async fn test_unknown_operation_is_usage_error() {
    let output = visionpipe()
        .args(["analyze", "gs://bucket/cat.jpg", "-o", "colours"])
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown detection operation"));
}
