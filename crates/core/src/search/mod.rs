pub mod blob;
pub mod client;
pub mod format;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::SearchError;

/// A trimmed, non-empty free-text query. Constructing one is the only way to
/// reach [`CandidateSearch::search`], so an empty query never hits the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub keyword_score: Option<f64>,
    #[serde(default)]
    pub vector_score: Option<f64>,
    #[serde(default)]
    pub hybrid_score: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Option<Vec<SearchResult>>,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.results.as_ref().map_or(true, Vec::is_empty)
    }

    /// Keeps the first `max_results` results in service order and drops the rest.
    pub fn into_top(self, max_results: usize) -> Vec<SearchResult> {
        let mut results = self.results.unwrap_or_default();
        results.truncate(max_results);
        results
    }
}

#[async_trait]
pub trait CandidateSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::{SearchQuery, SearchResponse, SearchResult};
    use crate::errors::SearchError;

    #[test]
    fn query_is_trimmed() {
        let query = SearchQuery::parse("   rust engineer  ").expect("query");
        assert_eq!(query.as_str(), "rust engineer");
    }

    #[test]
    fn blank_query_is_rejected() {
        assert_eq!(SearchQuery::parse(""), Err(SearchError::EmptyQuery));
        assert_eq!(SearchQuery::parse(" \t\n "), Err(SearchError::EmptyQuery));
    }

    #[test]
    fn response_decodes_camel_case_scores() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"results":[{"filename":"E100.txt","text":"{name=Ana}","keywordScore":0.5,"vectorScore":0.25,"hybridScore":null}]}"#,
        )
        .expect("decode");

        let results = response.results.expect("results");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].keyword_score, Some(0.5));
        assert_eq!(results[0].vector_score, Some(0.25));
        assert_eq!(results[0].hybrid_score, None);
        assert_eq!(results[0].score, None);
    }

    #[test]
    fn missing_results_counts_as_empty() {
        let response: SearchResponse = serde_json::from_str("{}").expect("decode");
        assert!(response.is_empty());
        assert!(SearchResponse { results: Some(Vec::new()) }.is_empty());
    }

    #[test]
    fn into_top_truncates_in_order() {
        let response = SearchResponse {
            results: Some(
                (0..25)
                    .map(|index| SearchResult {
                        filename: format!("E{index}.txt"),
                        ..SearchResult::default()
                    })
                    .collect(),
            ),
        };

        let top = response.into_top(20);
        assert_eq!(top.len(), 20);
        assert_eq!(top[0].filename, "E0.txt");
        assert_eq!(top[19].filename, "E19.txt");
    }
}
