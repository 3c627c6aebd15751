//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};

use mockito::Matcher;

/// Run the binary with an isolated HOME and no OpLang environment
fn oplang(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_oplang"))
        .args(args)
        .env("HOME", home)
        .env_remove("OPLANG_URL")
        .env_remove("OPLANG_API_KEY")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    let output = oplang(home.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("OpLang"), "Should show app name");
    for command in ["query", "vars", "events", "symbols", "health"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    let output = oplang(home.path(), &["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("oplang"), "Should show binary name");
}

/// Test query subcommand help
#[test]
fn test_query_help() {
    let home = tempfile::tempdir().unwrap();
    let output = oplang(home.path(), &["query", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Query help should succeed");
    for flag in ["--resource", "--metric", "--custom", "--since", "--from", "--var"] {
        assert!(stdout.contains(flag), "Should show {} option", flag);
    }
}

/// Test that a missing backend URL is reported
#[test]
fn test_missing_url_fails() {
    let home = tempfile::tempdir().unwrap();
    let output = oplang(home.path(), &["health"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("No backend URL configured"));
}

/// Test that --custom conflicts with the structured flags
#[test]
fn test_custom_conflicts_with_resource() {
    let home = tempfile::tempdir().unwrap();
    let output = oplang(
        home.path(),
        &[
            "--url",
            "http://127.0.0.1:9",
            "query",
            "--custom",
            "host | cpu_usage",
            "--resource",
            "host",
        ],
    );
    assert!(!output.status.success());
}

/// Test health against a mock backend
#[test]
fn test_health_success() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1/execute")
        .match_header("authorization", "Bearer secret")
        .match_body(Matcher::PartialJson(serde_json::json!({"statement": "host"})))
        .with_status(200)
        .with_body(r#"{"resources": []}"#)
        .create();

    let home = tempfile::tempdir().unwrap();
    let url = server.url();
    let output = oplang(
        home.path(),
        &["--url", &url, "--api-key", "secret", "health"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    mock.assert();
    assert!(output.status.success(), "Health should succeed");
    assert!(stdout.contains("Success"));
}

/// Test that a failed health check exits non-zero with the response in the message
#[test]
fn test_health_failure() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/v1/execute")
        .with_status(200)
        .with_body("{}")
        .create();

    let home = tempfile::tempdir().unwrap();
    let url = server.url();
    let output = oplang(home.path(), &["--url", &url, "health"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Health check test query failed, response data: {}"));
}

/// Test that the config file supplies the URL and variables print as JSON
#[test]
fn test_vars_uses_config_file() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1/execute")
        .match_body(Matcher::PartialJson(serde_json::json!({"statement": "pod"})))
        .with_status(200)
        .with_body(r#"{"resources": [{"id": 7, "name": "web-0", "type": "POD"}]}"#)
        .create();

    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join(".config").join("oplang");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.json"),
        serde_json::json!({ "url": server.url() }).to_string(),
    )
    .unwrap();

    let output = oplang(
        home.path(),
        &["--format", "json", "vars", "$kind", "--var", "kind=pod"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    mock.assert();
    assert!(output.status.success(), "vars should succeed");
    let values: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(values, serde_json::json!([{"text": "web-0"}]));
}

/// Test query output in JSON
#[test]
fn test_query_json_output() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/v1/execute")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "statement": "host | cpu_usage | from=1000 | to=2000"
        })))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "metric_query": [{
                    "group_infos": [
                        {"group": "METRIC", "name": "", "value": "cpu_usage"},
                        {"group": "RESOURCE", "name": "", "value": "1"}
                    ],
                    "metric": {"timestamps": [1000], "values": [3]}
                }],
                "resources": [{"id": 1, "name": "i-1234", "type": "HOST"}]
            })
            .to_string(),
        )
        .create();

    let home = tempfile::tempdir().unwrap();
    let url = server.url();
    let output = oplang(
        home.path(),
        &[
            "--url", &url, "--format", "json", "query", "--resource", "host", "--metric",
            "cpu_usage", "--from", "1000", "--to", "2000",
        ],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "query should succeed");
    let response: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(response["data"][0]["name"], "cpu_usage: i-1234");
}
