use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use hrbot_core::{probe_reachability, SearchConfig};
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    search: SearchConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub search: HealthCheck,
    pub checked_at: String,
}

pub fn router(search: SearchConfig) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { search })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let search = search_check(&state.search).await;
    let ready = search.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: format!("hrbot-server {} accepting activities", env!("CARGO_PKG_VERSION")),
        },
        search,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn search_check(config: &SearchConfig) -> HealthCheck {
    match probe_reachability(config).await {
        Ok(latency) => HealthCheck {
            status: "ready",
            detail: format!(
                "search service {}:{} reachable in {}ms",
                config.host,
                config.port,
                latency.as_millis()
            ),
        },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("search service unreachable: {}", error.detail()),
        },
    }
}
