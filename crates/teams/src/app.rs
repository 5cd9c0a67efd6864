use std::{collections::HashMap, sync::Arc};

use hrbot_core::{CandidateSearch, SearchConfig};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    activity::Activity,
    handlers::{
        CountHandler, DiagHandler, EchoHandler, GreetingHandler, ResetHandler, RuntimeHandler,
        StateHandler,
    },
    router::{ActivityHandler, Matcher, RouteBuildError, RouteTable},
    search::{CandidateSearchHandler, SearchRendering, SEARCH_COMMAND_PATTERN},
    state::ConversationStateStore,
    turn::{ReplySink, TurnContext, TurnError},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Handled { route: &'static str, replies: usize },
    Ignored,
}

/// Runs turns: picks a route, loads conversation state, invokes the handler
/// and persists whatever state it leaves behind. Turns for the same
/// conversation never overlap.
pub struct BotApplication {
    routes: RouteTable,
    store: Arc<dyn ConversationStateStore>,
    turn_gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl BotApplication {
    pub fn new(routes: RouteTable, store: Arc<dyn ConversationStateStore>) -> Self {
        Self { routes, store, turn_gates: Mutex::new(HashMap::new()) }
    }

    pub async fn process(
        &self,
        activity: &Activity,
        sink: &dyn ReplySink,
    ) -> Result<TurnOutcome, TurnError> {
        let correlation_id = activity.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let conversation_id = activity.conversation_id().ok_or(TurnError::MissingConversation)?;

        info!(
            event_name = "ingress.activity.received",
            correlation_id = %correlation_id,
            conversation_id = %conversation_id,
            activity_type = activity.activity_type.as_str(),
            "received activity"
        );

        let Some(handler) = self.routes.select(activity) else {
            debug!(
                event_name = "ingress.activity.ignored",
                correlation_id = %correlation_id,
                activity_type = activity.activity_type.as_str(),
                "no route for activity"
            );
            return Ok(TurnOutcome::Ignored);
        };

        let gate = self.turn_gate(conversation_id).await;
        let outcome = {
            let _turn_guard = gate.lock().await;
            self.run_turn(activity, conversation_id, &correlation_id, handler.as_ref(), sink).await
        };
        self.release_turn_gate(conversation_id, gate).await;

        match &outcome {
            Ok(TurnOutcome::Handled { route, replies }) => info!(
                event_name = "ingress.activity.handled",
                correlation_id = %correlation_id,
                route = *route,
                replies = *replies,
                "turn completed"
            ),
            Ok(TurnOutcome::Ignored) => {}
            Err(error) => warn!(
                event_name = "ingress.activity.failed",
                correlation_id = %correlation_id,
                route = handler.name(),
                error = %error,
                "turn failed"
            ),
        }

        outcome
    }

    async fn run_turn(
        &self,
        activity: &Activity,
        conversation_id: &str,
        correlation_id: &str,
        handler: &dyn ActivityHandler,
        sink: &dyn ReplySink,
    ) -> Result<TurnOutcome, TurnError> {
        let mut state = self.store.load(conversation_id).await?;
        let (cleared, replies) = {
            let mut turn = TurnContext::new(activity, &mut state, sink, correlation_id);
            handler.handle(&mut turn).await?;
            (turn.state_cleared(), turn.replies_sent())
        };

        if cleared {
            self.store.delete(conversation_id).await?;
        } else {
            self.store.save(conversation_id, state).await?;
        }

        Ok(TurnOutcome::Handled { route: handler.name(), replies })
    }

    async fn turn_gate(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        let mut gates = self.turn_gates.lock().await;
        Arc::clone(gates.entry(conversation_id.to_owned()).or_default())
    }

    async fn release_turn_gate(&self, conversation_id: &str, gate: Arc<Mutex<()>>) {
        let mut gates = self.turn_gates.lock().await;
        // Map entry plus ours: nobody else is waiting on this conversation.
        if Arc::strong_count(&gate) <= 2 {
            gates.remove(conversation_id);
        }
    }
}

/// Builds the route table in match order: literal commands, the search
/// command, the member-joined greeting, then the echo fallback.
pub fn default_routes(
    config: &SearchConfig,
    search: Arc<dyn CandidateSearch>,
) -> Result<RouteTable, RouteBuildError> {
    let mut routes = RouteTable::new();
    routes.register(Matcher::command("/reset"), ResetHandler);
    routes.register(Matcher::command("/count"), CountHandler);
    routes.register(Matcher::command("/diag"), DiagHandler);
    routes.register(Matcher::command("/state"), StateHandler);
    routes.register(Matcher::command("/runtime"), RuntimeHandler);
    routes.register(
        Matcher::pattern(SEARCH_COMMAND_PATTERN)?,
        CandidateSearchHandler::new(search, SearchRendering::from(config)),
    );
    routes.register(Matcher::predicate(Activity::adds_members), GreetingHandler);
    routes.fallback(EchoHandler);
    Ok(routes)
}

/// Explicit initialization of the bot. Nothing is registered at import time.
pub fn build_bot(
    config: &SearchConfig,
    search: Arc<dyn CandidateSearch>,
    store: Arc<dyn ConversationStateStore>,
) -> Result<BotApplication, RouteBuildError> {
    let routes = default_routes(config, search)?;
    info!(
        event_name = "bot.routes.registered",
        routes = routes.route_count(),
        render_mode = ?config.render_mode,
        "bot routes registered"
    );
    Ok(BotApplication::new(routes, store))
}
