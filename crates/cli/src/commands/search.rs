use std::path::Path;

use hrbot_core::{
    config::{AppConfig, RenderMode},
    CandidateSearch, HttpCandidateSearch, SearchConfig, SearchErrorClass, SearchQuery,
};
use hrbot_teams::{
    search::{candidate_views, render_candidates, SearchRendering, NO_CANDIDATES_MESSAGE},
    OutboundActivity,
};

use super::{load_options, CommandResult};

const MESSAGE_DIVIDER: &str = "\n----\n";

pub fn run(config_path: Option<&Path>, query: &str, cards: bool) -> CommandResult {
    let mut config = match AppConfig::load(load_options(config_path)) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("search", "config_validation", error.to_string(), 2)
        }
    };
    if cards {
        config.search.render_mode = RenderMode::Card;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "search",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        }
    };

    runtime.block_on(execute(&config.search, query))
}

/// Runs one search against the configured service and prints the messages a
/// chat user would receive.
pub async fn execute(config: &SearchConfig, query: &str) -> CommandResult {
    let query = match SearchQuery::parse(query) {
        Ok(query) => query,
        Err(error) => return CommandResult::failure("search", "validation", error.to_string(), 2),
    };

    let client = match HttpCandidateSearch::from_config(config) {
        Ok(client) => client,
        Err(error) => return CommandResult::failure("search", "client", error.detail(), 3),
    };

    let response = match client.search(&query).await {
        Ok(response) => response,
        Err(error) => {
            let error_class = match error.class() {
                SearchErrorClass::Validation => "validation",
                SearchErrorClass::Transport => "transport",
            };
            return CommandResult::failure("search", error_class, error.detail(), 4);
        }
    };

    if response.is_empty() {
        return CommandResult::plain(0, NO_CANDIDATES_MESSAGE);
    }

    let rendering = SearchRendering::from(config);
    let views = candidate_views(response, &rendering);
    let messages = render_candidates(&views, &rendering);

    let output = match rendering.render_mode {
        RenderMode::Text => messages
            .iter()
            .map(OutboundActivity::text_content)
            .collect::<Vec<_>>()
            .join(MESSAGE_DIVIDER),
        RenderMode::Card => match serde_json::to_string_pretty(&messages) {
            Ok(json) => json,
            Err(error) => {
                return CommandResult::failure("search", "serialization", error.to_string(), 5)
            }
        },
    };

    CommandResult::plain(0, output)
}
