use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};
use pagewatch_core::NotificationOutcome;
use pagewatch_notify::{MISSING_IP, MISSING_LOCATION};

use super::{ApiError, AppState, SuccessBody};
use crate::middleware::RequestId;

/// `POST /api/notify`: one visitor event in, one dispatch out.
///
/// The body is read raw so that malformed JSON gets the same
/// `{success:false}` envelope as every other rejection.
pub(super) async fn notify(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<(StatusCode, Json<SuccessBody>), ApiError> {
    let payload: serde_json::Value = serde_json::from_slice(&body)
        .ok()
        .filter(serde_json::Value::is_object)
        .ok_or_else(|| {
            tracing::warn!(request_id = %req_id.0, "notify body is not a JSON object");
            ApiError::bad_request("invalid JSON body")
        })?;

    match state.service.handle(&payload).await {
        NotificationOutcome::Accepted => Ok((StatusCode::OK, Json(SuccessBody::new(None)))),
        NotificationOutcome::RejectedInvalid(reason) => {
            Err(ApiError::bad_request(client_message(&reason)))
        }
        NotificationOutcome::DeliveryFailed(cause) => {
            tracing::error!(request_id = %req_id.0, cause = %cause, "error processing notification");
            Err(ApiError::internal("failed to deliver notification"))
        }
    }
}

/// Maps internal rejection reasons to the texts sent back to the browser.
fn client_message(reason: &str) -> &'static str {
    match reason {
        MISSING_IP => "IP address is required",
        MISSING_LOCATION => "Location data is required",
        _ => "invalid request",
    }
}
