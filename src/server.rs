use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::warn;

use crate::config::Config;
use crate::dispatch::DispatchReport;
use crate::error::{RelayError, RelayResult};
use crate::lotto::LottoClient;
use crate::marker::MarkerStore;
use crate::platform::line::{verify_signature, LineClient, WebhookBody};
use crate::platform::PushClient;
use crate::registry::{Target, TargetKind, TargetRegistry};
use crate::scheduler::jobs;
use crate::storage::Store;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub registry: TargetRegistry,
    pub marker: MarkerStore,
    line: LineClient,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let line = LineClient::new(config.line.channel_access_token.clone());
        Self {
            registry: TargetRegistry::new(store.clone()),
            marker: MarkerStore::new(store),
            line,
            config,
        }
    }

    pub fn push_client(&self) -> &dyn PushClient {
        &self.line
    }

    /// The lottery upstream is optional configuration, checked only when a
    /// lottery operation actually runs.
    pub fn lotto_client(&self) -> RelayResult<LottoClient> {
        let base_url = self
            .config
            .lotto
            .base_url
            .as_deref()
            .ok_or_else(|| RelayError::Config("LOTTO_API_BASE_URL is not set".to_string()))?;
        LottoClient::new(base_url)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/targets", get(list_targets))
        .route("/test-push", get(test_push))
        .route("/send-lotto-now", get(send_lotto_now))
        .route("/webhook", post(webhook))
        .with_state(state)
}

async fn health() -> &'static str {
    "linerelay is running ✅"
}

async fn list_targets(
    State(state): State<Arc<AppState>>,
) -> RelayResult<Json<Vec<Target>>> {
    Ok(Json(state.registry.list().await?))
}

async fn test_push(
    State(state): State<Arc<AppState>>,
) -> RelayResult<Json<DispatchReport>> {
    let report = jobs::announce(&state, jobs::TEST_TEXT).await?;
    Ok(Json(report))
}

async fn send_lotto_now(
    State(state): State<Arc<AppState>>,
) -> RelayResult<Json<DispatchReport>> {
    let report = jobs::trigger_lottery_now(&state).await?;
    Ok(Json(report))
}

/// Webhook receiver: verify the signature over the raw body, then register
/// any group/room sources. Storage faults become a 500 via `RelayError` so
/// the platform can retry delivery; the process keeps running.
async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> RelayResult<StatusCode> {
    let signature = headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !verify_signature(&state.config.line.channel_secret, signature, body.as_bytes()) {
        warn!("Webhook rejected: bad signature");
        return Ok(StatusCode::UNAUTHORIZED);
    }

    let payload: WebhookBody = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Webhook rejected: undecodable body: {}", e);
            return Ok(StatusCode::BAD_REQUEST);
        }
    };

    for (kind, id) in source_targets(&payload) {
        state.registry.record(kind, &id).await?;
    }

    Ok(StatusCode::OK)
}

/// Extract the registrable (kind, id) pairs from a webhook batch. Events
/// from other source kinds (users, unknown) are ignored.
fn source_targets(payload: &WebhookBody) -> Vec<(TargetKind, String)> {
    payload
        .events
        .iter()
        .filter_map(|event| {
            let source = event.source.as_ref()?;
            match source.kind.as_str() {
                "group" => source.group_id.clone().map(|id| (TargetKind::Group, id)),
                "room" => source.room_id.clone().map(|id| (TargetKind::Room, id)),
                _ => None,
            }
        })
        .collect()
}
