//! Teams-style bot surface for hrbot
//!
//! - **Activities** (`activity`) - inbound/outbound activity payloads
//! - **Router** (`router`) - ordered literal / regex / predicate matchers, first match wins
//! - **Handlers** (`handlers`, `search`) - built-in commands and `/search_candidates`
//! - **Cards** (`cards`) - Adaptive Card 1.4 builders
//! - **State** (`state`) - per-conversation state store
//! - **Application** (`app`) - turn processing and the `build_bot` entrypoint
//!
//! # Architecture
//!
//! ```text
//! Activity → BotApplication → RouteTable → ActivityHandler → ReplySink
//!                 ↓                              ↓
//!        ConversationStateStore          CandidateSearch (HTTP)
//! ```

pub mod activity;
pub mod app;
pub mod cards;
pub mod handlers;
pub mod router;
pub mod search;
pub mod state;
pub mod turn;

pub use activity::{Activity, ActivityType, OutboundActivity};
pub use app::{build_bot, BotApplication, TurnOutcome};
pub use state::{ConversationState, ConversationStateStore, MemoryStateStore};
pub use turn::{BufferedReplySink, ReplySink, TurnContext, TurnError};
