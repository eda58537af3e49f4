//! Callable trigger
//!
//! Remote-procedure style invocation using the callable-function envelope:
//! requests carry `{"data": ...}`, successes answer `{"result": ...}` and
//! failures answer `{"error": {"status", "message"}}` with no detail.
//!
//! A missing entity list is not an error here: it answers a result with
//! `success: false`.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{HeaderMap, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tracing::{error, info, warn};

use crate::ranking::{Outcome, RankingPipeline};
use crate::routes::{allowed_origin, json_response, TriggerResult};
use crate::server::AppState;

/// Incoming callable envelope. The payload itself is not used.
#[derive(Debug, Deserialize)]
pub struct CallableRequest {
    pub data: serde_json::Value,
}

/// Opaque callable failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallableError {
    pub status: &'static str,
    pub message: &'static str,
}

impl CallableError {
    pub const INTERNAL: CallableError = CallableError {
        status: "INTERNAL",
        message: "INTERNAL",
    };

    pub const INVALID_ARGUMENT: CallableError = CallableError {
        status: "INVALID_ARGUMENT",
        message: "Bad Request",
    };

    pub fn http_status(&self) -> StatusCode {
        match self.status {
            "INVALID_ARGUMENT" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for CallableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)
    }
}

impl std::error::Error for CallableError {}

/// Run one aggregation with callable error semantics
pub async fn invoke(pipeline: &RankingPipeline) -> Result<TriggerResult, CallableError> {
    match pipeline.run().await {
        Ok(Outcome::Persisted { ranking_id, entries }) => {
            info!(ranking_id = %ranking_id, entries, "Callable trigger completed");
            Ok(TriggerResult::persisted(ranking_id))
        }
        Ok(Outcome::SourceNotFound) => Ok(TriggerResult::not_found()),
        Err(e) => {
            error!(error = %e, "Ranking aggregation failed");
            Err(CallableError::INTERNAL)
        }
    }
}

/// Handle `POST /callable/aggregate-ranking`
pub async fn handle_callable_request(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    body: &Bytes,
) -> Response<Full<Bytes>> {
    let origin = allowed_origin(headers);

    if method != Method::POST {
        return error_response(CallableError::INVALID_ARGUMENT, &origin);
    }

    // An empty body is an envelope without data
    if !body.iter().all(u8::is_ascii_whitespace) {
        if let Err(e) = serde_json::from_slice::<CallableRequest>(body) {
            warn!("Invalid callable envelope: {}", e);
            return error_response(CallableError::INVALID_ARGUMENT, &origin);
        }
    }

    match invoke(&state.pipeline).await {
        Ok(result) => json_response(StatusCode::OK, &json!({ "result": result }), &origin),
        Err(e) => error_response(e, &origin),
    }
}

/// Rejection for a request whose body could not be read
pub fn invalid_argument(headers: &HeaderMap) -> Response<Full<Bytes>> {
    error_response(CallableError::INVALID_ARGUMENT, &allowed_origin(headers))
}

fn error_response(error: CallableError, origin: &str) -> Response<Full<Bytes>> {
    json_response(error.http_status(), &json!({ "error": error }), origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_requires_data_field() {
        assert!(serde_json::from_slice::<CallableRequest>(br#"{"data":null}"#).is_ok());
        assert!(serde_json::from_slice::<CallableRequest>(br#"{"data":{"x":1}}"#).is_ok());
        assert!(serde_json::from_slice::<CallableRequest>(br#"{}"#).is_err());
        assert!(serde_json::from_slice::<CallableRequest>(b"").is_err());
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(CallableError::INTERNAL.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(CallableError::INVALID_ARGUMENT.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(CallableError::INTERNAL).unwrap(),
            json!({ "status": "INTERNAL", "message": "INTERNAL" })
        );
    }
}
