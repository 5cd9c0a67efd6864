use std::env;
use std::fs;
use std::net::TcpListener;
use std::sync::{Mutex, OnceLock};

use hrbot_cli::commands::{config, doctor, search};
use hrbot_core::config::{AppConfig, RenderMode};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn config_attributes_env_and_default_sources() {
    with_env(&[("HRBOT_SEARCH_HOST", "search.internal"), ("HRBOT_LOG_LEVEL", "debug")], || {
        let result = config::run(None);
        assert_eq!(result.exit_code, 0);

        assert!(result
            .output
            .contains("- search.host = search.internal (source: env (HRBOT_SEARCH_HOST))"));
        assert!(result.output.contains("- search.port = 8083 (source: default)"));
        assert!(result.output.contains("- logging.level = debug (source: env (HRBOT_LOG_LEVEL))"));
        assert!(result
            .output
            .contains("- search endpoint = http://search.internal:8083/search_candidates"));
    });
}

#[test]
fn config_attributes_file_sources() {
    with_env(&[], || {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("hrbot.toml");
        fs::write(&file, "[search]\nport = 9100\nrender_mode = \"card\"\n").expect("write config");

        let result = config::run(Some(&file));
        assert_eq!(result.exit_code, 0);

        let expected_source = format!("(source: file ({}))", file.display());
        assert!(result.output.contains(&format!("- search.port = 9100 {expected_source}")));
        assert!(result.output.contains(&format!("- search.render_mode = card {expected_source}")));
        assert!(result.output.contains("- search.max_results = 20 (source: default)"));
    });
}

#[test]
fn config_returns_validation_failure_payload() {
    with_env(&[("HRBOT_SEARCH_TIMEOUT_SECS", "0")], || {
        let result = config::run(None);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
        assert!(payload["message"].as_str().unwrap_or_default().contains("search.timeout_secs"));
    });
}

#[test]
fn doctor_passes_when_search_service_accepts_connections() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("address").port().to_string();

    with_env(&[("HRBOT_SEARCH_HOST", "127.0.0.1"), ("HRBOT_SEARCH_PORT", port.as_str())], || {
        let result = doctor::run(None, true);
        assert_eq!(result.exit_code, 0, "doctor output: {}", result.output);

        let report = parse_payload(&result.output);
        assert_eq!(report["overall_status"], "pass");
        assert_eq!(report["checks"][0]["name"], "config_validation");
        assert_eq!(report["checks"][2]["name"], "search_reachability");
        assert_eq!(report["checks"][2]["status"], "pass");
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_is_invalid() {
    with_env(&[("HRBOT_SEARCH_PATH", "search_candidates")], || {
        let result = doctor::run(None, false);
        assert_eq!(result.exit_code, 1);

        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation: "));
        assert!(result.output.contains("- [skip] search_endpoint: "));
        assert!(result.output.contains("- [skip] search_reachability: "));
    });
}

#[test]
fn search_rejects_blank_query_without_network() {
    with_env(&[], || {
        let result = search::run(None, "   ", false);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "search");
        assert_eq!(payload["error_class"], "validation");
    });
}

#[tokio::test]
async fn search_prints_text_messages_from_service_results() {
    let server = search_server(ResponseTemplate::new(200).set_body_json(json!({
        "results": [
            { "filename": "E1.txt", "text": "{name=Ana Lima, summary=Backend}", "hybridScore": 0.8 },
            { "filename": "E2.txt", "text": "{name=Bo Chen, summary=Data}", "hybridScore": 0.6 }
        ]
    })))
    .await;

    let result = search::execute(&search_config(&server, RenderMode::Text), "backend").await;

    assert_eq!(result.exit_code, 0);
    let first = result.output.find("🧑 *Ana Lima*").expect("first candidate");
    let second = result.output.find("🧑 *Bo Chen*").expect("second candidate");
    assert!(first < second);
    assert!(result.output.contains("📄 *Employee ID:* `E1`"));
}

#[tokio::test]
async fn search_prints_card_activities_as_json() {
    let server = search_server(ResponseTemplate::new(200).set_body_json(json!({
        "results": [{ "filename": "E7.txt", "text": "{name=Cy, employee_id=EMP-7}", "score": 0.5 }]
    })))
    .await;

    let result = search::execute(&search_config(&server, RenderMode::Card), "cy").await;

    assert_eq!(result.exit_code, 0);
    let activities = parse_payload(&result.output);
    let card = &activities[0]["attachments"][0];
    assert_eq!(card["contentType"], "application/vnd.microsoft.card.adaptive");
    assert_eq!(card["content"]["body"][1]["text"], "**Employee ID:** EMP-7");
}

#[tokio::test]
async fn search_reports_upstream_failure() {
    let server =
        search_server(ResponseTemplate::new(502).set_body_string("upstream index offline")).await;

    let result = search::execute(&search_config(&server, RenderMode::Text), "ops").await;

    assert_eq!(result.exit_code, 4);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "transport");
    assert_eq!(payload["message"], "upstream index offline");
}

#[tokio::test]
async fn search_reports_no_candidates() {
    let server = search_server(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .await;

    let result = search::execute(&search_config(&server, RenderMode::Text), "nobody").await;

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.output, "⚠️ No candidates found.");
}

async fn search_server(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search_candidates"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn search_config(server: &MockServer, render_mode: RenderMode) -> hrbot_core::SearchConfig {
    let mut config = AppConfig::default().search;
    config.host = server.address().ip().to_string();
    config.port = server.address().port();
    config.render_mode = render_mode;
    config
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "HRBOT_SEARCH_SCHEME",
        "HRBOT_SEARCH_HOST",
        "HRBOT_SEARCH_PORT",
        "HRBOT_SEARCH_PATH",
        "HRBOT_SEARCH_TIMEOUT_SECS",
        "HRBOT_SEARCH_CHUNK_CHAR_LIMIT",
        "HRBOT_SEARCH_MAX_RESULTS",
        "HRBOT_SEARCH_RENDER_MODE",
        "HRBOT_SEARCH_FILENAME_SUFFIX",
        "HRBOT_SERVER_BIND_ADDRESS",
        "HRBOT_SERVER_PORT",
        "HRBOT_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "HRBOT_LOGGING_LEVEL",
        "HRBOT_LOGGING_FORMAT",
        "HRBOT_LOG_LEVEL",
        "HRBOT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
