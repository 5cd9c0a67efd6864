use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use hrbot_teams::{Activity, BotApplication, BufferedReplySink, OutboundActivity, TurnError};
use serde::Serialize;
use tracing::error;

#[derive(Clone)]
pub struct MessagesState {
    bot: Arc<BotApplication>,
}

/// Replies produced by the turn, returned inline (expect-replies delivery).
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub activities: Vec<OutboundActivity>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn router(bot: Arc<BotApplication>) -> Router {
    Router::new().route("/api/messages", post(receive)).with_state(MessagesState { bot })
}

pub async fn receive(State(state): State<MessagesState>, Json(activity): Json<Activity>) -> Response {
    let sink = BufferedReplySink::new();

    match state.bot.process(&activity, &sink).await {
        Ok(_) => {
            (StatusCode::OK, Json(MessagesResponse { activities: sink.take().await }))
                .into_response()
        }
        Err(TurnError::MissingConversation) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: TurnError::MissingConversation.to_string() }),
        )
            .into_response(),
        Err(turn_error) => {
            error!(
                event_name = "ingress.activity.error",
                correlation_id = activity.id.as_deref().unwrap_or("unknown"),
                error = %turn_error,
                "activity processing failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: turn_error.to_string() }),
            )
                .into_response()
        }
    }
}
