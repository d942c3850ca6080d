//! HTTP gateway for Eva.
//!
//! Exposes the Meta webhook handshake (GET /webhook), signed webhook
//! delivery (POST /webhook), manual workflow triggers (POST /trigger), and a
//! health check. Built on Axum.

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use eva_actions::ActionClient;
use eva_config::AppConfig;
use eva_memory::MemoryStore;
use eva_workflow::{WorkflowContext, WorkflowKind, run_workflow};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub store: Arc<MemoryStore>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/webhook", get(webhook_verify_handler))
        .route("/webhook", post(webhook_receive_handler))
        .route("/trigger", post(trigger_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let store = Arc::new(MemoryStore::new(config.memory.dir.clone()));
    let state = Arc::new(GatewayState { config, store });

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Verify a Meta webhook signature (`X-Hub-Signature-256` header).
///
/// The header must be `sha256=` followed by the hex HMAC-SHA256 of the raw
/// body under the app secret. Comparison is constant-time.
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let Some(sig_hex) = signature.strip_prefix("sha256=") else {
        return false;
    };

    let provided = match hex::decode(sig_hex) {
        Ok(b) => b,
        Err(_) => return false,
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&provided).is_ok()
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "eva-gateway",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// Meta webhook verification challenge: echo the challenge when the mode is
/// `subscribe` and the token matches.
async fn webhook_verify_handler(
    State(state): State<SharedState>,
    Query(params): Query<VerifyParams>,
) -> Result<String, StatusCode> {
    let expected = state.config.gateway.verify_token.as_deref();

    let mode_ok = params.mode.as_deref() == Some("subscribe");
    let token_ok = expected.is_some() && params.verify_token.as_deref() == expected;

    if mode_ok && token_ok {
        info!("Webhook verification challenge accepted");
        Ok(params.challenge.unwrap_or_default())
    } else {
        warn!("Webhook verification challenge rejected");
        Err(StatusCode::FORBIDDEN)
    }
}

async fn webhook_receive_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, StatusCode> {
    // Signature check runs over the raw body, before any parsing. No secret
    // configured means no check.
    if let Some(secret) = state.config.gateway.app_secret.as_deref() {
        let signature = headers
            .get("X-Hub-Signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !verify_signature(&body, signature, secret) {
            warn!("Webhook signature rejected");
            return Err(StatusCode::FORBIDDEN);
        }
    }

    let data: Option<serde_json::Value> = serde_json::from_slice(&body).ok();
    if data.as_ref().is_none_or(|d| d.is_null()) {
        return Ok(Json(serde_json::json!({"status": "no data"})));
    }

    info!(bytes = body.len(), "Webhook payload received");
    Ok(Json(serde_json::json!({"status": "received"})))
}

#[derive(Deserialize)]
struct TriggerRequest {
    #[serde(default)]
    workflow: String,
}

async fn trigger_handler(
    State(state): State<SharedState>,
    Json(payload): Json<TriggerRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let kind: WorkflowKind = payload.workflow.parse().map_err(|_| {
        let valid: Vec<&str> = WorkflowKind::ALL.iter().map(|k| k.as_str()).collect();
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Unknown workflow", "valid": valid})),
        )
    })?;

    let ctx = workflow_context(&state).map_err(|e| {
        error!(error = %e, "Workflow context unavailable");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e})),
        )
    })?;

    info!(workflow = %kind, "Triggering workflow");

    match run_workflow(kind, &ctx).await {
        Ok(()) => Ok(Json(
            serde_json::json!({"status": "ok", "workflow": kind.as_str()}),
        )),
        Err(e) => {
            error!(workflow = %kind, error = %e, "Workflow failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            ))
        }
    }
}

fn workflow_context(state: &GatewayState) -> Result<WorkflowContext, String> {
    let api_key = state
        .config
        .actions
        .composio_api_key
        .clone()
        .ok_or_else(|| "Composio API key not configured".to_string())?;

    let actions = ActionClient::new(api_key, state.config.actions.composio_base_url.clone())
        .map_err(|e| e.to_string())?;

    Ok(WorkflowContext {
        actions,
        store: state.store.clone(),
        repo_dir: state.config.memory.repo_dir.clone(),
        user: state.config.user.clone(),
    })
}
