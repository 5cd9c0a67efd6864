use thiserror::Error;

/// Failures of a single candidate search invocation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("search query is empty")]
    EmptyQuery,
    #[error("search request timed out: {0}")]
    Timeout(String),
    #[error("search request failed: {0}")]
    Transport(String),
    #[error("search service returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("search response could not be decoded: {0}")]
    Decode(String),
    #[error("search client could not be built: {0}")]
    Client(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchErrorClass {
    Validation,
    Transport,
}

impl SearchError {
    pub fn class(&self) -> SearchErrorClass {
        match self {
            Self::EmptyQuery => SearchErrorClass::Validation,
            Self::Timeout(_)
            | Self::Transport(_)
            | Self::Upstream { .. }
            | Self::Decode(_)
            | Self::Client(_) => SearchErrorClass::Transport,
        }
    }

    /// Text shown to the user: the upstream payload when the service answered,
    /// otherwise the underlying error message.
    pub fn detail(&self) -> String {
        match self {
            Self::Upstream { status, body } if body.trim().is_empty() => {
                format!("search service returned HTTP {status}")
            }
            Self::Upstream { body, .. } => body.clone(),
            Self::Timeout(message)
            | Self::Transport(message)
            | Self::Decode(message)
            | Self::Client(message) => message.clone(),
            Self::EmptyQuery => self.to_string(),
        }
    }
}
