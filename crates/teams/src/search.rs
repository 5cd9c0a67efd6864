use std::sync::Arc;

use async_trait::async_trait;
use hrbot_core::{
    chunk_entries, render_text_entry, CandidateSearch, CandidateView, RenderMode, SearchConfig,
    SearchQuery, SearchResponse,
};
use tracing::{info, warn};

use crate::{
    activity::OutboundActivity,
    cards::candidate_card,
    router::ActivityHandler,
    turn::{TurnContext, TurnError},
};

pub const SEARCH_COMMAND: &str = "/search_candidates";
pub const SEARCH_COMMAND_PATTERN: &str = r"(?i)^/search_candidates(?:\s+|$)";
pub const EMPTY_QUERY_MESSAGE: &str = "❗ Please provide a query after `/search_candidates`.";
pub const NO_CANDIDATES_MESSAGE: &str = "⚠️ No candidates found.";

/// Rendering knobs the handler needs from [`SearchConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRendering {
    pub max_results: usize,
    pub chunk_char_limit: usize,
    pub render_mode: RenderMode,
    pub filename_suffix: String,
}

impl From<&SearchConfig> for SearchRendering {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_results: config.max_results,
            chunk_char_limit: config.chunk_char_limit,
            render_mode: config.render_mode,
            filename_suffix: config.filename_suffix.clone(),
        }
    }
}

pub fn search_error_message(detail: &str) -> String {
    format!("❌ Search Candidates Error:\n```{detail}```")
}

/// Text after the command word, trimmed. Empty when the command stands alone.
pub fn extract_query(text: &str) -> &str {
    let text = text.trim_start();
    match text.get(..SEARCH_COMMAND.len()) {
        Some(head) if head.eq_ignore_ascii_case(SEARCH_COMMAND) => {
            text[SEARCH_COMMAND.len()..].trim()
        }
        _ => text.trim(),
    }
}

/// Views for the top results, in service order.
pub fn candidate_views(
    response: SearchResponse,
    rendering: &SearchRendering,
) -> Vec<CandidateView> {
    response
        .into_top(rendering.max_results)
        .iter()
        .map(|result| CandidateView::from_result(result, &rendering.filename_suffix))
        .collect()
}

/// Turns ranked views into outbound activities: text chunks within the
/// per-message limit, or a single carousel-style activity holding one card
/// per candidate.
pub fn render_candidates(
    views: &[CandidateView],
    rendering: &SearchRendering,
) -> Vec<OutboundActivity> {
    match rendering.render_mode {
        RenderMode::Text => {
            let entries = views.iter().map(render_text_entry).collect::<Vec<_>>();
            chunk_entries(&entries, rendering.chunk_char_limit)
                .into_iter()
                .map(OutboundActivity::text)
                .collect()
        }
        RenderMode::Card => {
            vec![OutboundActivity::cards(views.iter().map(candidate_card).collect())]
        }
    }
}

pub struct CandidateSearchHandler {
    search: Arc<dyn CandidateSearch>,
    rendering: SearchRendering,
}

impl CandidateSearchHandler {
    pub fn new(search: Arc<dyn CandidateSearch>, rendering: SearchRendering) -> Self {
        Self { search, rendering }
    }
}

#[async_trait]
impl ActivityHandler for CandidateSearchHandler {
    fn name(&self) -> &'static str {
        "search_candidates"
    }

    async fn handle(&self, turn: &mut TurnContext<'_>) -> Result<(), TurnError> {
        let Ok(query) = SearchQuery::parse(extract_query(turn.activity().text())) else {
            return turn.send_text(EMPTY_QUERY_MESSAGE).await;
        };

        info!(
            event_name = "search.request.started",
            correlation_id = %turn.correlation_id(),
            query_chars = query.as_str().chars().count(),
            "running candidate search"
        );

        let response = match self.search.search(&query).await {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    event_name = "search.request.failed",
                    correlation_id = %turn.correlation_id(),
                    error_class = ?error.class(),
                    error = %error,
                    "candidate search failed"
                );
                return turn.send_text(search_error_message(&error.detail())).await;
            }
        };

        if response.is_empty() {
            info!(
                event_name = "search.results.empty",
                correlation_id = %turn.correlation_id(),
                "candidate search returned no results"
            );
            return turn.send_text(NO_CANDIDATES_MESSAGE).await;
        }

        let views = candidate_views(response, &self.rendering);
        let replies = render_candidates(&views, &self.rendering);

        info!(
            event_name = "search.results.rendered",
            correlation_id = %turn.correlation_id(),
            candidates = views.len(),
            messages = replies.len(),
            render_mode = ?self.rendering.render_mode,
            "candidate search rendered"
        );

        for reply in replies {
            turn.send(reply).await?;
        }
        Ok(())
    }
}
