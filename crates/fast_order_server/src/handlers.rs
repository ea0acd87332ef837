//! HTTP handlers for the order API

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::types::{GenerateOrderRequest, GenerateOrderResponse};
use fast_order::{CallContext, FastOrderError, ResilientLlm};

/// Shared server state
pub struct AppState {
    pub llm: ResilientLlm,
    /// Budget for each generation
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(llm: ResilientLlm, request_timeout: Duration) -> Self {
        Self {
            llm,
            request_timeout,
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(GenerateOrderResponse::failure(message))).into_response()
}

/// Map a core error onto a status code and a user-facing message
fn classify(err: &FastOrderError) -> (StatusCode, String) {
    match err {
        FastOrderError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        e if e.is_rejection() => (
            StatusCode::SERVICE_UNAVAILABLE,
            "LLM service temporarily unavailable".to_string(),
        ),
        FastOrderError::Timeout(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            "LLM request timed out".to_string(),
        ),
        _ => (
            StatusCode::BAD_GATEWAY,
            "Failed to generate order".to_string(),
        ),
    }
}

/// Handler for GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// Handler for POST /api/generate-order
pub async fn generate_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateOrderRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!("[Handler] invalid request body: {}", rejection);
            return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    let request = req.into_generation_request();
    if let Err(e) = request.validate() {
        let (status, message) = classify(&e);
        return error_response(status, &message);
    }

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, mode = %request.mode, "[Handler] generating order");

    let ctx = CallContext::with_timeout(state.request_timeout);
    // Axum drops this future when the client goes away; the guard then cancels the call.
    let _cancel_on_drop = ctx.cancellation_token().clone().drop_guard();

    match state.llm.generate_order(&ctx, &request).await {
        Ok(message) => (
            StatusCode::OK,
            Json(GenerateOrderResponse::success(message)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(%request_id, "[Handler] LLM error: {}", e);
            let (status, message) = classify(&e);
            error_response(status, &message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_statuses() {
        let (status, msg) = classify(&FastOrderError::Validation("Current orders is required".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Current orders is required");

        assert_eq!(
            classify(&FastOrderError::CircuitOpen).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            classify(&FastOrderError::TooManyTrialRequests).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            classify(&FastOrderError::Timeout(Duration::from_secs(30))).0,
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            classify(&FastOrderError::Upstream("boom".into())),
            (StatusCode::BAD_GATEWAY, "Failed to generate order".to_string())
        );
    }
}
