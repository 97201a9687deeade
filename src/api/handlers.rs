//! API request handlers
//!
//! Every response uses the `{ok, result}` / `{ok, error}` envelope.

use crate::config_manager::DefaultsUpdate;
use crate::error::ApiError;
use crate::interest::InterestSubmission;
use crate::presets;
use crate::types::PriceAuditInput;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

type ApiResult = Result<Json<Value>, ApiError>;

// ==========================================
// Response Helpers
// ==========================================

fn ok<T: Serialize>(result: T) -> ApiResult {
    let result = serde_json::to_value(result).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "result": result
    })))
}

fn rejected(rejection: JsonRejection) -> ApiError {
    warn!("Rejected request body: {}", rejection.body_text());
    ApiError::BadRequest(rejection.body_text())
}

/// Decode a JSON body whatever its `Content-Type`; browsers posting with
/// `text/plain` or no header at all are still served
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected request body: {}", e);
        ApiError::BadRequest(e.to_string())
    })
}

/// `cost` and `listPrice` must be present finite numbers before the engine runs
fn parse_audit_input(body: Value) -> Result<PriceAuditInput, ApiError> {
    let finite = |key: &str| body.get(key).and_then(Value::as_f64).is_some_and(f64::is_finite);
    if !finite("cost") || !finite("listPrice") {
        return Err(ApiError::BadRequest("Invalid cost/listPrice".to_string()));
    }

    serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// ==========================================
// Health
// ==========================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs()
    }))
}

// ==========================================
// Price Audit Handlers
// ==========================================

pub async fn run_audit(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult {
    let input = parse_audit_input(parse_body(&body)?)?;

    let output = state.config.engine().audit(&input);
    debug!(
        "Price audit: currency={} score={} risk={:?}",
        input.currency, output.score, output.risk_level
    );

    ok(output)
}

pub async fn get_examples() -> ApiResult {
    ok(presets::examples(Utc::now().timestamp_millis()))
}

pub async fn get_defaults(State(state): State<Arc<AppState>>) -> ApiResult {
    ok(state.config.get_defaults())
}

pub async fn update_defaults(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DefaultsUpdate>, JsonRejection>,
) -> ApiResult {
    let Json(update) = body.map_err(rejected)?;
    let defaults = state.config.update_defaults(&update)?;
    ok(defaults)
}

// ==========================================
// Waitlist Handlers
// ==========================================

pub async fn register_interest(body: Bytes) -> ApiResult {
    let submission: InterestSubmission = parse_body(&body)?;
    let record = submission.accept(Utc::now())?;

    info!(
        "Interest registered: email={} product={} utm={:?} client_ts={:?}",
        record.email,
        record.product.as_deref().unwrap_or("-"),
        record.utm,
        record.client_ts
    );

    Ok(Json(serde_json::json!({ "ok": true })))
}
