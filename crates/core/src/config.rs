use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "hrbot.toml";
pub const NESTED_CONFIG_FILE: &str = "config/hrbot.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Remote candidate search service plus the limits applied to its results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub timeout_secs: u64,
    pub chunk_char_limit: usize,
    pub max_results: usize,
    pub render_mode: RenderMode,
    pub filename_suffix: String,
}

impl SearchConfig {
    pub fn endpoint_url(&self) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// How search results are presented to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Text,
    Card,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub search_host: Option<String>,
    pub search_port: Option<u16>,
    pub search_timeout_secs: Option<u64>,
    pub render_mode: Option<RenderMode>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                scheme: "http".to_string(),
                host: "127.0.0.1".to_string(),
                port: 8083,
                path: "/search_candidates".to_string(),
                timeout_secs: 10,
                chunk_char_limit: 3800,
                max_results: 20,
                render_mode: RenderMode::Text,
                filename_suffix: ".txt".to_string(),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3978,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for RenderMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "card" | "cards" => Ok(Self::Card),
            other => Err(ConfigError::Validation(format!(
                "unsupported render mode `{other}` (expected text|card)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(search) = patch.search {
            if let Some(scheme) = search.scheme {
                self.search.scheme = scheme;
            }
            if let Some(host) = search.host {
                self.search.host = host;
            }
            if let Some(port) = search.port {
                self.search.port = port;
            }
            if let Some(path) = search.path {
                self.search.path = path;
            }
            if let Some(timeout_secs) = search.timeout_secs {
                self.search.timeout_secs = timeout_secs;
            }
            if let Some(chunk_char_limit) = search.chunk_char_limit {
                self.search.chunk_char_limit = chunk_char_limit;
            }
            if let Some(max_results) = search.max_results {
                self.search.max_results = max_results;
            }
            if let Some(render_mode) = search.render_mode {
                self.search.render_mode = render_mode;
            }
            if let Some(filename_suffix) = search.filename_suffix {
                self.search.filename_suffix = filename_suffix;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("HRBOT_SEARCH_SCHEME") {
            self.search.scheme = value;
        }
        if let Some(value) = read_env("HRBOT_SEARCH_HOST") {
            self.search.host = value;
        }
        if let Some(value) = read_env("HRBOT_SEARCH_PORT") {
            self.search.port = parse_u16("HRBOT_SEARCH_PORT", &value)?;
        }
        if let Some(value) = read_env("HRBOT_SEARCH_PATH") {
            self.search.path = value;
        }
        if let Some(value) = read_env("HRBOT_SEARCH_TIMEOUT_SECS") {
            self.search.timeout_secs = parse_u64("HRBOT_SEARCH_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("HRBOT_SEARCH_CHUNK_CHAR_LIMIT") {
            self.search.chunk_char_limit = parse_usize("HRBOT_SEARCH_CHUNK_CHAR_LIMIT", &value)?;
        }
        if let Some(value) = read_env("HRBOT_SEARCH_MAX_RESULTS") {
            self.search.max_results = parse_usize("HRBOT_SEARCH_MAX_RESULTS", &value)?;
        }
        if let Some(value) = read_env("HRBOT_SEARCH_RENDER_MODE") {
            self.search.render_mode = value.parse()?;
        }
        if let Some(value) = read_env("HRBOT_SEARCH_FILENAME_SUFFIX") {
            self.search.filename_suffix = value;
        }

        if let Some(value) = read_env("HRBOT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("HRBOT_SERVER_PORT") {
            self.server.port = parse_u16("HRBOT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("HRBOT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("HRBOT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level = read_env("HRBOT_LOGGING_LEVEL").or_else(|| read_env("HRBOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("HRBOT_LOGGING_FORMAT").or_else(|| read_env("HRBOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.search_host {
            self.search.host = host;
        }
        if let Some(port) = overrides.search_port {
            self.search.port = port;
        }
        if let Some(timeout_secs) = overrides.search_timeout_secs {
            self.search.timeout_secs = timeout_secs;
        }
        if let Some(render_mode) = overrides.render_mode {
            self.search.render_mode = render_mode;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_search(&self.search)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Returns the config file that `AppConfig::load` would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
    if !matches!(search.scheme.as_str(), "http" | "https") {
        return Err(ConfigError::Validation(
            "search.scheme must be `http` or `https`".to_string(),
        ));
    }

    if search.host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "search.host is required (hostname or IP of the candidate search service)".to_string(),
        ));
    }

    if search.port == 0 {
        return Err(ConfigError::Validation("search.port must be greater than zero".to_string()));
    }

    if !search.path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "search.path must start with `/` (got `{}`)",
            search.path
        )));
    }

    if search.timeout_secs == 0 || search.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "search.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if !(100..=28_000).contains(&search.chunk_char_limit) {
        return Err(ConfigError::Validation(
            "search.chunk_char_limit must be in range 100..=28000".to_string(),
        ));
    }

    if !(1..=100).contains(&search.max_results) {
        return Err(ConfigError::Validation(
            "search.max_results must be in range 1..=100".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address is required".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    search: Option<SearchPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    scheme: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: Option<String>,
    timeout_secs: Option<u64>,
    chunk_char_limit: Option<usize>,
    max_results: Option<usize>,
    render_mode: Option<RenderMode>,
    filename_suffix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
