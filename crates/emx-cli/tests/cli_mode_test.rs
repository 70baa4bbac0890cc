use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn binary_path() -> &'static str {
    env!("CARGO_BIN_EXE_emx-cli")
}

fn write_config(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("emx-cli-{}-{name}.yaml", std::process::id()));
    std::fs::write(&path, content).expect("write config");
    path
}

async fn run_cli(args: Vec<String>) -> Output {
    tokio::task::spawn_blocking(move || {
        Command::new(binary_path())
            .args(&args)
            .env("RUST_LOG", "error")
            .env_remove("EMX_API_KEY")
            .env_remove("EMX_API_SECRET")
            .output()
            .expect("Failed to start emx-cli binary")
    })
    .await
    .expect("join")
}

#[test]
fn help_lists_commands() {
    let output = Command::new(binary_path())
        .arg("--help")
        .output()
        .expect("Failed to start emx-cli binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cancel-all"));
    assert!(stdout.contains("stream"));
}

#[test]
fn missing_config_file_fails() {
    let output = Command::new(binary_path())
        .args(["--config", "/nonexistent/emx.yaml", "contracts"])
        .output()
        .expect("Failed to start emx-cli binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("load config"), "stderr: {stderr}");
}

#[test]
fn stream_requires_channel() {
    let output = Command::new(binary_path())
        .args(["stream", "--contract", "BTCZ19"])
        .output()
        .expect("Failed to start emx-cli binary");

    assert!(!output.status.success());
}

#[tokio::test(flavor = "multi_thread")]
async fn contracts_command_prints_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/contracts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contracts": [{"contract_code": "BTCZ19"}, {"contract_code": "ETHH19"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = write_config("contracts", &format!("rest_url: {}\n", server.uri()));
    let output = run_cli(vec![
        "--config".to_string(),
        config.display().to_string(),
        "--log-level".to_string(),
        "error".to_string(),
        "contracts".to_string(),
    ])
    .await;
    let _ = std::fs::remove_file(&config);

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let value: Value = serde_json::from_slice(&output.stdout).expect("json on stdout");
    assert_eq!(value[0]["contract_code"], "BTCZ19");
    assert_eq!(value[1]["contract_code"], "ETHH19");
}

#[tokio::test(flavor = "multi_thread")]
async fn private_command_without_credentials_fails() {
    let server = MockServer::start().await;

    let config = write_config("accounts", &format!("rest_url: {}\n", server.uri()));
    let output = run_cli(vec![
        "--config".to_string(),
        config.display().to_string(),
        "accounts".to_string(),
    ])
    .await;
    let _ = std::fs::remove_file(&config);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API key and secret are required"), "stderr: {stderr}");

    let received = server.received_requests().await.expect("recording enabled");
    assert!(received.is_empty());
}
