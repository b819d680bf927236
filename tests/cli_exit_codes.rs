use httpmock::prelude::*;
use serde_json::{json, Value};
use std::process::{Command, Output};
use tempfile::TempDir;

const CREDENTIAL_VARS: [&str; 4] = [
    "FIRECRAWL_API_KEY",
    "GOOGLE_API_KEY",
    "GEMINI_API_KEY",
    "MIRAGE_GEMINI_MODEL",
];

/// Run the binary with an empty HOME and no credentials in the environment.
fn run_mirage(home: &TempDir, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mirage"));
    cmd.args(args).env("HOME", home.path()).env_remove("RUST_LOG");
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd.output().expect("run mirage")
}

fn stderr_payload(output: &Output) -> Value {
    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr
        .lines()
        .rev()
        .find_map(|line| serde_json::from_str::<Value>(line).ok())
        .unwrap_or_else(|| panic!("no JSON payload on stderr: {stderr}"))
}

#[test]
fn serve_without_credentials_exits_with_config_error() {
    let home = TempDir::new().expect("tempdir");
    let output = run_mirage(&home, &["serve"], &[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let payload = stderr_payload(&output);
    assert_eq!(payload["category"], "config");
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("FIRECRAWL_API_KEY"));
}

#[test]
fn missing_gemini_key_is_reported() {
    let home = TempDir::new().expect("tempdir");
    let output = run_mirage(&home, &["serve"], &[("FIRECRAWL_API_KEY", "fc-test")]);

    assert_eq!(output.status.code(), Some(2));
    let payload = stderr_payload(&output);
    assert_eq!(payload["category"], "config");
    assert!(payload["remediation"]
        .as_str()
        .unwrap_or_default()
        .contains("GOOGLE_API_KEY"));
}

#[test]
fn unreadable_config_file_is_fatal() {
    let home = TempDir::new().expect("tempdir");
    let missing = home.path().join("missing.toml");
    let output = run_mirage(
        &home,
        &["--config", missing.to_str().unwrap(), "serve"],
        &[("FIRECRAWL_API_KEY", "fc"), ("GOOGLE_API_KEY", "gk")],
    );

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr_payload(&output)["category"], "config");
}

#[test]
fn tools_command_prints_catalogue_without_credentials() {
    let home = TempDir::new().expect("tempdir");
    let output = run_mirage(&home, &["tools", "--format", "json"], &[]);

    assert_eq!(output.status.code(), Some(0));
    let tools: Value = serde_json::from_slice(&output.stdout).expect("catalogue JSON");
    assert_eq!(tools.as_array().map(Vec::len), Some(5));
    assert_eq!(tools[0]["name"], "extract_brand");
}

#[test]
fn serve_exits_cleanly_on_eof() {
    let home = TempDir::new().expect("tempdir");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mirage"));
    cmd.env("HOME", home.path())
        .env("FIRECRAWL_API_KEY", "fc-test")
        .env("GOOGLE_API_KEY", "gk-test")
        .stdin(std::process::Stdio::null());
    let output = cmd.output().expect("run mirage");

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn call_with_invalid_json_arguments_is_fatal() {
    let home = TempDir::new().expect("tempdir");
    let output = run_mirage(
        &home,
        &["call", "extract_brand", "--args", "{url:"],
        &[("FIRECRAWL_API_KEY", "fc"), ("GOOGLE_API_KEY", "gk")],
    );

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr_payload(&output)["category"], "validation");
}

#[test]
fn call_runs_one_tool_against_configured_providers() {
    let firecrawl = MockServer::start();
    firecrawl.mock(|when, then| {
        when.method(POST)
            .path("/v1/scrape")
            .header("authorization", "Bearer fc-file");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"markdown": "# Acme", "metadata": {"sourceURL": "https://acme.test/"}}
        }));
    });
    let gemini = MockServer::start();
    gemini.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/file-model:generateContent")
            .header("x-goog-api-key", "gk-file");
        then.status(200).json_body(json!({
            "candidates": [{"content": {"parts": [{
                "text": "{\"colors\": {\"primary\": \"#112233\"}, \"typography\": {\"headings\": \"Inter\", \"body\": \"Inter\"}}"
            }]}}]
        }));
    });

    let home = TempDir::new().expect("tempdir");
    let config_path = home.path().join("mirage.toml");
    std::fs::write(
        &config_path,
        format!(
            "[firecrawl]\napi_key = \"fc-file\"\nbase_url = \"{}\"\ntimeout = \"5s\"\n\n[gemini]\napi_key = \"gk-file\"\nbase_url = \"{}\"\nmodel = \"file-model\"\n",
            firecrawl.base_url(),
            gemini.base_url()
        ),
    )
    .expect("write config");

    let output = run_mirage(
        &home,
        &[
            "--config",
            config_path.to_str().unwrap(),
            "call",
            "extract_brand",
            "--args",
            r#"{"url": "https://acme.test"}"#,
        ],
        &[],
    );

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let brand: Value = serde_json::from_slice(&output.stdout).expect("brand JSON");
    assert_eq!(brand["sourceUrl"], "https://acme.test/");
    assert_eq!(brand["colors"]["primary"], "#112233");
    assert_eq!(brand["typography"]["weights"], json!([400, 600, 700]));
}

#[test]
fn failed_call_prints_payload_and_exits_one() {
    let firecrawl = MockServer::start();
    firecrawl.mock(|when, then| {
        when.method(POST).path("/v1/scrape");
        then.status(402)
            .json_body(json!({"success": false, "error": "Insufficient credits"}));
    });

    let home = TempDir::new().expect("tempdir");
    let config_path = home.path().join("mirage.toml");
    std::fs::write(
        &config_path,
        format!(
            "[firecrawl]\napi_key = \"fc\"\nbase_url = \"{}\"\n\n[gemini]\napi_key = \"gk\"\n",
            firecrawl.base_url()
        ),
    )
    .expect("write config");

    let output = run_mirage(
        &home,
        &[
            "--config",
            config_path.to_str().unwrap(),
            "call",
            "extract_brand",
            "--args",
            r#"{"url": "https://acme.test"}"#,
        ],
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("payload JSON");
    assert_eq!(payload["operation"], "extract_brand");
    assert_eq!(payload["category"], "fetch");
    assert_eq!(payload["message"], "Insufficient credits");
}
