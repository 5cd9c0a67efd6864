use std::env;
use std::fs;
use std::path::Path;

use hrbot_core::config::{resolve_config_path, AppConfig};
use toml::Value;

use super::{load_options, CommandResult};

pub fn run(config_path: Option<&Path>) -> CommandResult {
    let config = match AppConfig::load(load_options(config_path)) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("config", "config_validation", error.to_string(), 2)
        }
    };

    let file_path = resolve_config_path(config_path);
    let file_doc = file_path.as_deref().and_then(load_config_file_doc);
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, file_doc.as_ref(), file_path.as_deref())
    };

    let search = &config.search;
    let server = &config.server;
    let logging = &config.logging;

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.push(format!("- search endpoint = {}", search.endpoint_url()));
    let mut push = |key_path: &str, value: String, env_keys: &[&str]| {
        lines.push(render_line(key_path, &value, source(key_path, env_keys)));
    };

    push("search.scheme", search.scheme.clone(), &["HRBOT_SEARCH_SCHEME"]);
    push("search.host", search.host.clone(), &["HRBOT_SEARCH_HOST"]);
    push("search.port", search.port.to_string(), &["HRBOT_SEARCH_PORT"]);
    push("search.path", search.path.clone(), &["HRBOT_SEARCH_PATH"]);
    push("search.timeout_secs", search.timeout_secs.to_string(), &["HRBOT_SEARCH_TIMEOUT_SECS"]);
    push(
        "search.chunk_char_limit",
        search.chunk_char_limit.to_string(),
        &["HRBOT_SEARCH_CHUNK_CHAR_LIMIT"],
    );
    push("search.max_results", search.max_results.to_string(), &["HRBOT_SEARCH_MAX_RESULTS"]);
    push(
        "search.render_mode",
        format!("{:?}", search.render_mode).to_lowercase(),
        &["HRBOT_SEARCH_RENDER_MODE"],
    );
    push(
        "search.filename_suffix",
        search.filename_suffix.clone(),
        &["HRBOT_SEARCH_FILENAME_SUFFIX"],
    );
    push("server.bind_address", server.bind_address.clone(), &["HRBOT_SERVER_BIND_ADDRESS"]);
    push("server.port", server.port.to_string(), &["HRBOT_SERVER_PORT"]);
    push(
        "server.graceful_shutdown_secs",
        server.graceful_shutdown_secs.to_string(),
        &["HRBOT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
    );
    push("logging.level", logging.level.clone(), &["HRBOT_LOGGING_LEVEL", "HRBOT_LOG_LEVEL"]);
    push(
        "logging.format",
        format!("{:?}", logging.format).to_lowercase(),
        &["HRBOT_LOGGING_FORMAT", "HRBOT_LOG_FORMAT"],
    );

    CommandResult::plain(0, lines.join("\n"))
}

fn load_config_file_doc(path: &Path) -> Option<Value> {
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
