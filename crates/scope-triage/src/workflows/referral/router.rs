use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use super::domain::RawReferral;
use super::evaluation::ReferralResult;
use super::notification::{NotificationStatus, ReferralNotifier};
use super::reference::ReferenceId;
use super::service::{ReferralService, ReferralServiceError};

/// Body returned for an accepted referral.
#[derive(Debug, Serialize)]
pub struct ReferralResponse {
    #[serde(flatten)]
    pub result: ReferralResult,
    pub notification: NotificationStatus,
}

/// Router builder exposing HTTP endpoints for referral triage.
pub fn referral_router<N>(service: Arc<ReferralService<N>>) -> Router
where
    N: ReferralNotifier + 'static,
{
    Router::new()
        .route("/api/v1/referrals", post(submit_handler::<N>))
        .route(
            "/api/v1/referrals/:reference_id/notification",
            get(notification_handler::<N>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<N>(
    State(service): State<Arc<ReferralService<N>>>,
    payload: Result<axum::Json<RawReferral>, JsonRejection>,
) -> Response
where
    N: ReferralNotifier + 'static,
{
    let record = match payload {
        Ok(axum::Json(record)) => record,
        Err(rejection) => {
            let payload = json!({
                "error": rejection.body_text(),
                "field": Value::Null,
            });
            return (rejection.status(), axum::Json(payload)).into_response();
        }
    };

    match service.submit(record) {
        Ok(submission) => {
            let body = ReferralResponse {
                result: submission.result,
                notification: submission.notification,
            };
            (StatusCode::CREATED, axum::Json(body)).into_response()
        }
        Err(ReferralServiceError::Input(error)) => {
            let payload = json!({
                "error": error.to_string(),
                "field": error.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn notification_handler<N>(
    State(service): State<Arc<ReferralService<N>>>,
    Path(reference_id): Path<String>,
) -> Response
where
    N: ReferralNotifier + 'static,
{
    let id = ReferenceId(reference_id);
    match service.notification_status(&id) {
        Some(status) => {
            let payload = json!({
                "reference_id": id.0,
                "notification": status,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        None => {
            let payload = json!({
                "error": format!("no notification tracked for referral reference '{}'", id.0),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
