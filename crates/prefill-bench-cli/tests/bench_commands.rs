use clap::Parser;
use prefill_bench::ApiSettings;
use prefill_bench_cli::cli::ApiArgs;
use prefill_bench_cli::commands::api::handle_api;
use serde_json::json;
use std::process::Command;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_api_command_prints_header_and_runs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "max_tokens": 5,
            "stream": false
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"usage": {"prompt_tokens": 50}})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let prompt = dir.path().join("prompt.txt");
    std::fs::write(&prompt, "Hello world").unwrap();

    let args = ApiArgs::try_parse_from([
        "bench-api",
        prompt.to_str().unwrap(),
        "test-model",
        "2",
    ])
    .unwrap();
    let settings =
        ApiSettings::default().with_endpoint(format!("{}/v1/chat/completions", server.uri()));

    let mut out = Vec::new();
    let runs = handle_api(&args, settings, &mut out).await.unwrap();
    assert_eq!(runs.len(), 2);

    let out = String::from_utf8(out).unwrap();
    let expected_header = format!(
        "Model: test-model\nPrompt: {}\nRuns: 2\n\nRun 1/2... ",
        prompt.display()
    );
    assert!(out.starts_with(&expected_header), "{}", out);
    assert!(out.contains("\nAverage: "));
}

#[tokio::test]
async fn test_api_command_uses_configured_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "configured-model"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"usage": {"prompt_tokens": 3}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let prompt = dir.path().join("prompt.txt");
    std::fs::write(&prompt, "Hi").unwrap();

    let args = ApiArgs::try_parse_from(["bench-api", prompt.to_str().unwrap()]).unwrap();
    let mut settings =
        ApiSettings::default().with_endpoint(format!("{}/v1/chat/completions", server.uri()));
    settings.model = "configured-model".to_string();

    let mut out = Vec::new();
    handle_api(&args, settings, &mut out).await.unwrap();
    assert!(String::from_utf8(out).unwrap().starts_with("Model: configured-model\n"));
}

#[cfg(feature = "candle")]
#[test]
fn test_bench_prefill_missing_prompt_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");

    let output = Command::new(env!("CARGO_BIN_EXE_bench-prefill"))
        .arg("--model")
        .arg(dir.path().join("no-model"))
        .arg("--prompt")
        .arg(&missing)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(&format!("Error: Prompt file not found: {}", missing.display())));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Loading model"));
}
