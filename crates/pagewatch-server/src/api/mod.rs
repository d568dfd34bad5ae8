mod health;
mod notify;

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pagewatch_notify::NotificationService;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState};

pub const AVAILABLE_ENDPOINTS: [&str; 3] = [
    "POST /api/notify",
    "GET /api/health",
    "GET /api/test-telegram",
];

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NotificationService>,
}

/// `{ "success": true, ... }` body shared by the success responses.
#[derive(Debug, Serialize)]
pub struct SuccessBody {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl SuccessBody {
    pub(super) fn new(message: Option<&'static str>) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// `{ "success": false, "error": ... }` body with the status it is sent under.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_endpoints: Option<Vec<&'static str>>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            error: error.into(),
            details: None,
            hint: None,
            available_endpoints: None,
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>, hint: &'static str) -> Self {
        self.details = Some(details.into());
        self.hint = Some(hint);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn notify_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/notify", post(notify::notify))
        .route_layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/test-telegram", get(health::test_telegram));

    Router::new()
        .merge(public_routes)
        .merge(notify_router(rate_limit))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn not_found() -> ApiError {
    let mut error = ApiError::new(StatusCode::NOT_FOUND, "Endpoint not found");
    error.available_endpoints = Some(AVAILABLE_ENDPOINTS.to_vec());
    error
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");
    ApiError::internal("internal server error").into_response()
}

pub fn rate_limit_state(max_requests: usize) -> RateLimitState {
    RateLimitState::new(max_requests, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
