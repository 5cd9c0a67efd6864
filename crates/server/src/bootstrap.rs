use std::sync::Arc;

use hrbot_core::{
    config::{AppConfig, ConfigError},
    CandidateSearch, HttpCandidateSearch, SearchError,
};
use hrbot_teams::{app::build_bot, router::RouteBuildError, BotApplication, MemoryStateStore};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub bot: Arc<BotApplication>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("search client setup failed: {0}")]
    SearchClient(#[source] SearchError),
    #[error(transparent)]
    Routes(#[from] RouteBuildError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let search = HttpCandidateSearch::from_config(&config.search)
        .map_err(BootstrapError::SearchClient)?;
    info!(
        event_name = "system.bootstrap.search_client_ready",
        correlation_id = "bootstrap",
        endpoint = %search.endpoint(),
        timeout_secs = config.search.timeout_secs,
        "candidate search client configured"
    );

    let search: Arc<dyn CandidateSearch> = Arc::new(search);
    let bot = build_bot(&config.search, search, Arc::new(MemoryStateStore::new()))?;

    Ok(Application { config, bot: Arc::new(bot) })
}

#[cfg(test)]
mod tests {
    use hrbot_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        bootstrap_with_config(AppConfig::load(options)?)
    }

    #[test]
    fn bootstrap_fails_fast_on_invalid_search_settings() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                search_timeout_secs: Some(0),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().expect("invalid timeout must fail").to_string();
        assert!(message.contains("search.timeout_secs"), "unexpected message: {message}");
    }

    #[test]
    fn bootstrap_builds_bot_from_overrides() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                search_host: Some("search.internal".to_owned()),
                search_port: Some(9000),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("bootstrap should succeed");

        assert_eq!(
            app.config.search.endpoint_url(),
            "http://search.internal:9000/search_candidates"
        );
    }
}
