//! Notifier Health Route

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notifier::NotifierInfo;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::AppState;

/// Response for the email health check
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailHealth {
    pub email_system: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<NotifierInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Verify the notification transport
pub async fn email_test(State(state): State<Arc<AppState>>) -> Response {
    match state.monitor.check_notifier().await {
        Ok(info) => Json(EmailHealth {
            email_system: "OK",
            config: Some(info),
            message: None,
        })
        .into_response(),
        Err(e) => {
            error!("Email health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(EmailHealth {
                    email_system: "ERROR",
                    config: None,
                    message: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}
