//! Core building blocks for hrbot: configuration, the error taxonomy and the
//! candidate search domain (query validation, HTTP client, blob parsing and
//! text formatting). Nothing here knows about chat activities.

pub mod config;
pub mod errors;
pub mod search;

pub use config::{AppConfig, ConfigError, LoadOptions, RenderMode, SearchConfig};
pub use errors::{SearchError, SearchErrorClass};
pub use search::{
    blob::{recover_structured, CandidateFields, SocialProfile, StructuredRecoveryError},
    client::{probe_reachability, HttpCandidateSearch},
    format::{chunk_entries, render_text_entry, CandidateView, ENTRY_SEPARATOR},
    CandidateSearch, SearchQuery, SearchResponse, SearchResult,
};
