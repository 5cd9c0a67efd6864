use async_trait::async_trait;
use serde::Serialize;

use crate::{
    router::ActivityHandler,
    turn::{TurnContext, TurnError},
};

pub const RESET_CONFIRMATION: &str = "✅ Conversation state has been reset.";
pub const RUSTC_VERSION: &str = env!("HRBOT_RUSTC_VERSION");
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn greeting_message() -> String {
    format!(
        "👋 Hello! I'm your resume assistant bot running on SDK v{SDK_VERSION}.\nTry `/search_candidates your query` to find matching candidates."
    )
}

fn to_json<T: Serialize>(value: &T) -> Result<String, TurnError> {
    serde_json::to_string(value).map_err(|error| TurnError::Serialize(error.to_string()))
}

pub struct ResetHandler;

#[async_trait]
impl ActivityHandler for ResetHandler {
    fn name(&self) -> &'static str {
        "reset"
    }

    async fn handle(&self, turn: &mut TurnContext<'_>) -> Result<(), TurnError> {
        turn.clear_state();
        turn.send_text(RESET_CONFIRMATION).await
    }
}

pub struct CountHandler;

#[async_trait]
impl ActivityHandler for CountHandler {
    fn name(&self) -> &'static str {
        "count"
    }

    async fn handle(&self, turn: &mut TurnContext<'_>) -> Result<(), TurnError> {
        let count = turn.state().count();
        turn.send_text(format!("The count is {count}")).await
    }
}

pub struct DiagHandler;

#[async_trait]
impl ActivityHandler for DiagHandler {
    fn name(&self) -> &'static str {
        "diag"
    }

    async fn handle(&self, turn: &mut TurnContext<'_>) -> Result<(), TurnError> {
        let payload = to_json(turn.activity())?;
        turn.send_text(payload).await
    }
}

pub struct StateHandler;

#[async_trait]
impl ActivityHandler for StateHandler {
    fn name(&self) -> &'static str {
        "state"
    }

    async fn handle(&self, turn: &mut TurnContext<'_>) -> Result<(), TurnError> {
        let payload = to_json(turn.state())?;
        turn.send_text(payload).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RuntimeInfo {
    pub rustversion: &'static str,
    pub sdkversion: &'static str,
}

impl RuntimeInfo {
    pub fn current() -> Self {
        Self { rustversion: RUSTC_VERSION, sdkversion: SDK_VERSION }
    }
}

pub struct RuntimeHandler;

#[async_trait]
impl ActivityHandler for RuntimeHandler {
    fn name(&self) -> &'static str {
        "runtime"
    }

    async fn handle(&self, turn: &mut TurnContext<'_>) -> Result<(), TurnError> {
        let payload = to_json(&RuntimeInfo::current())?;
        turn.send_text(payload).await
    }
}

pub struct GreetingHandler;

#[async_trait]
impl ActivityHandler for GreetingHandler {
    fn name(&self) -> &'static str {
        "greeting"
    }

    async fn handle(&self, turn: &mut TurnContext<'_>) -> Result<(), TurnError> {
        turn.send_text(greeting_message()).await
    }
}

pub struct EchoHandler;

#[async_trait]
impl ActivityHandler for EchoHandler {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn handle(&self, turn: &mut TurnContext<'_>) -> Result<(), TurnError> {
        let count = turn.state_mut().increment_count();
        let reply = format!("[{count}] You said: {}", turn.activity().text());
        turn.send_text(reply).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{
        greeting_message, CountHandler, DiagHandler, EchoHandler, ResetHandler, RuntimeHandler,
        StateHandler, RESET_CONFIRMATION,
    };
    use crate::{
        activity::Activity,
        router::ActivityHandler,
        state::ConversationState,
        turn::{BufferedReplySink, TurnContext},
    };

    async fn run(
        handler: &dyn ActivityHandler,
        activity: &Activity,
        state: &mut ConversationState,
    ) -> Vec<String> {
        let sink = BufferedReplySink::new();
        let mut turn = TurnContext::new(activity, state, &sink, "corr-test");
        handler.handle(&mut turn).await.expect("handler should succeed");
        sink.texts().await
    }

    #[tokio::test]
    async fn echo_increments_counter_and_quotes_text() {
        let mut state = ConversationState::default();
        let activity = Activity::message("conv", "hello bot");

        assert_eq!(run(&EchoHandler, &activity, &mut state).await, vec!["[1] You said: hello bot"]);
        assert_eq!(run(&EchoHandler, &activity, &mut state).await, vec!["[2] You said: hello bot"]);
    }

    #[tokio::test]
    async fn count_reports_zero_when_unset() {
        let mut state = ConversationState::default();
        let replies = run(&CountHandler, &Activity::message("conv", "/count"), &mut state).await;
        assert_eq!(replies, vec!["The count is 0"]);
    }

    #[tokio::test]
    async fn reset_clears_counter_and_confirms() {
        let mut state = ConversationState::default();
        state.increment_count();

        let replies = run(&ResetHandler, &Activity::message("conv", "/reset"), &mut state).await;

        assert_eq!(replies, vec![RESET_CONFIRMATION]);
        assert_eq!(state, ConversationState::default());
    }

    #[tokio::test]
    async fn diag_echoes_the_raw_activity() {
        let mut activity = Activity::message("conv-9", "/diag");
        activity.extra.insert("locale".to_owned(), json!("pt-PT"));
        let mut state = ConversationState::default();

        let replies = run(&DiagHandler, &activity, &mut state).await;
        let dumped: Value = serde_json::from_str(&replies[0]).expect("diag output is json");

        assert_eq!(dumped["conversation"]["id"], json!("conv-9"));
        assert_eq!(dumped["text"], json!("/diag"));
        assert_eq!(dumped["locale"], json!("pt-PT"));
    }

    #[tokio::test]
    async fn state_dumps_conversation_scope() {
        let mut state = ConversationState::default();
        state.increment_count();
        state.increment_count();

        let replies = run(&StateHandler, &Activity::message("conv", "/state"), &mut state).await;
        assert_eq!(replies, vec![r#"{"conversation":{"count":2}}"#]);
    }

    #[tokio::test]
    async fn runtime_reports_toolchain_and_crate_versions() {
        let mut state = ConversationState::default();
        let replies = run(&RuntimeHandler, &Activity::message("conv", "/runtime"), &mut state).await;
        let info: Value = serde_json::from_str(&replies[0]).expect("runtime output is json");

        assert_eq!(info["sdkversion"], json!(env!("CARGO_PKG_VERSION")));
        assert!(info["rustversion"].as_str().is_some_and(|version| !version.is_empty()));
    }

    #[test]
    fn greeting_names_the_search_command() {
        let greeting = greeting_message();
        assert!(greeting.starts_with("👋 Hello!"));
        assert!(greeting.contains("/search_candidates"));
        assert!(greeting.contains(env!("CARGO_PKG_VERSION")));
    }
}
