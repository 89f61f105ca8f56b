//! Reading Routes

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use storage::StoreSnapshot;
use tracing::warn;

use crate::AppState;

/// Error text returned for rejected payloads
pub const INVALID_PAYLOAD: &str = r#"Invalid payload. Expect: { distance: number, motor: "ON"|"OFF" }"#;

/// Response for rejected payloads
#[derive(Debug, Serialize)]
pub struct InvalidPayload {
    pub error: &'static str,
    pub got: Value,
}

/// Decode a request body for validation and echo.
///
/// An empty body reads as `{}`; a body that is not JSON is echoed back as a
/// string.
fn parse_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Count and latest reading
pub async fn get_data(State(state): State<Arc<AppState>>) -> Json<StoreSnapshot> {
    Json(state.monitor.snapshot())
}

/// Ingest one reading
pub async fn post_data(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let payload = parse_body(&body);

    let input = match state.validator.validate(&payload) {
        Ok(input) => input,
        Err(e) => {
            warn!("Rejected payload: {}", e);
            counter!("readings_rejected_total").increment(1);
            return (
                StatusCode::BAD_REQUEST,
                Json(InvalidPayload {
                    error: INVALID_PAYLOAD,
                    got: payload,
                }),
            )
                .into_response();
        }
    };

    state.monitor.ingest(input.into_reading()).await;
    Json(json!({ "ok": true })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b""), json!({}));
        assert_eq!(parse_body(b"  \n"), json!({}));
        assert_eq!(
            parse_body(br#"{"distance": 12, "motor": "ON"}"#),
            json!({ "distance": 12, "motor": "ON" })
        );
        assert_eq!(parse_body(b"distance=12"), json!("distance=12"));
    }
}
