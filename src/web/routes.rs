// HTTP routes for the side channel: liveness, health and request statistics.
//
// Hosting platforms poll `/` to keep the process warm; `/health` is meant
// for orchestrator probes and only reports healthy once the gateway is ready.

use crate::core::requests::{RequestService, RequestStore, RequestSummary};
use crate::core::status::BotStatus;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state for the HTTP routes
pub struct WebState<S: RequestStore> {
    pub status: Arc<BotStatus>,
    pub requests: Arc<RequestService<S>>,
}

// Derive would require `S: Clone`; only the Arcs are cloned.
impl<S: RequestStore> Clone for WebState<S> {
    fn clone(&self) -> Self {
        Self {
            status: Arc::clone(&self.status),
            requests: Arc::clone(&self.requests),
        }
    }
}

/// Health probe response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" once the gateway session is ready, "starting" otherwise
    pub status: &'static str,
    pub ready: bool,
    pub bot: Option<String>,
    pub guilds: usize,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

pub fn create_router<S: RequestStore + 'static>(state: WebState<S>) -> Router {
    Router::new()
        .route("/", get(root::<S>))
        .route("/health", get(health::<S>))
        .route("/stats", get(stats::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root<S: RequestStore + 'static>(State(state): State<WebState<S>>) -> String {
    let name = state.status.bot_name().unwrap_or("Request desk bot");
    format!("{name} is running")
}

async fn health<S: RequestStore + 'static>(
    State(state): State<WebState<S>>,
) -> (StatusCode, Json<HealthResponse>) {
    let ready = state.status.is_ready();
    let response = HealthResponse {
        status: if ready { "ok" } else { "starting" },
        ready,
        bot: state.status.bot_name().map(str::to_string),
        guilds: state.status.guild_count(),
        uptime_seconds: state.status.uptime().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    };

    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}

async fn stats<S: RequestStore + 'static>(
    State(state): State<WebState<S>>,
) -> Result<Json<RequestSummary>, StatusCode> {
    state.requests.summary().await.map(Json).map_err(|e| {
        tracing::error!("Failed to build request summary: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::requests::Submission;
    use crate::core::settings::GuildSettings;
    use crate::infra::state::JsonStateStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_state(dir: &TempDir) -> WebState<JsonStateStore> {
        let store = Arc::new(
            JsonStateStore::open(dir.path().join("state.json"))
                .await
                .unwrap(),
        );
        WebState {
            status: Arc::new(BotStatus::new()),
            requests: Arc::new(RequestService::new(store)),
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn root_reports_liveness() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        let (code, body) = get(create_router(state.clone()), "/").await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body, "Request desk bot is running");

        state.status.mark_ready("Desk", 1);
        let (_, body) = get(create_router(state), "/").await;
        assert_eq!(body, "Desk is running");
    }

    #[tokio::test]
    async fn health_follows_gateway_readiness() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        let (code, body) = get(create_router(state.clone()), "/health").await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "starting");
        assert_eq!(json["ready"], false);

        state.status.mark_ready("Desk", 3);
        let (code, body) = get(create_router(state), "/health").await;
        assert_eq!(code, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["guilds"], 3);
        assert_eq!(json["bot"], "Desk");
    }

    #[tokio::test]
    async fn stats_counts_requests() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        let mut settings = GuildSettings::default_for(1);
        settings.review_channel_id = Some(2);
        settings.submission_cooldown_secs = 0;
        for author in [10, 11] {
            state
                .requests
                .submit(
                    &settings,
                    Submission {
                        author_id: author,
                        category_key: "bug".to_string(),
                        subject: "Broken".to_string(),
                        details: "It broke".to_string(),
                    },
                )
                .await
                .unwrap();
        }

        let (code, body) = get(create_router(state), "/stats").await;
        assert_eq!(code, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["open"], 2);
        assert_eq!(json["closed"], 0);
        assert_eq!(json["guilds"], 1);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let dir = TempDir::new().unwrap();
        let (code, _) = get(create_router(test_state(&dir).await), "/admin").await;
        assert_eq!(code, StatusCode::NOT_FOUND);
    }
}
