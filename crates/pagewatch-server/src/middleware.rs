use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation id for one request, available to handlers as an extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Counts notify calls in fixed windows. Shared across clones.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    // (window start, calls admitted in it)
    admitted: Arc<Mutex<(Instant, usize)>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            admitted: Arc::new(Mutex::new((Instant::now(), 0))),
        }
    }

    /// Admits one call at `now` unless the current window is full.
    pub async fn try_admit(&self, now: Instant) -> bool {
        let mut guard = self.admitted.lock().await;
        let (started, count) = &mut *guard;
        if now.duration_since(*started) >= self.window {
            *started = now;
            *count = 0;
        }
        if *count < self.max_requests {
            *count += 1;
            true
        } else {
            false
        }
    }
}

/// Reuses the caller's `x-request-id` or mints a v4 UUID, then echoes it on
/// the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = match req.headers().get(&REQUEST_ID_HEADER).map(HeaderValue::to_str) {
        Some(Ok(value)) if !value.is_empty() => value.to_owned(),
        _ => Uuid::new_v4().to_string(),
    };
    let header = HeaderValue::from_str(&id).ok();
    req.extensions_mut().insert(RequestId(id));

    let mut res = next.run(req).await;
    if let Some(header) = header {
        res.headers_mut().insert(REQUEST_ID_HEADER.clone(), header);
    }
    res
}

pub async fn enforce_rate_limit(
    State(limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if limit.try_admit(Instant::now()).await {
        return next.run(req).await;
    }
    tracing::warn!(path = %req.uri().path(), "notify rate limit exceeded");
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "success": false, "error": "rate limit exceeded" })),
    )
        .into_response()
}
