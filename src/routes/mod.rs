//! HTTP routes for the ranking aggregator
//!
//! The two trigger adapters (`aggregate`, `callable`) are thin: they map
//! transport concerns onto one `RankingPipeline::run` call and collapse every
//! error into a generic envelope.

pub mod aggregate;
pub mod callable;
pub mod health;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{HeaderMap, Response, StatusCode};
use serde::{Deserialize, Serialize};

pub use aggregate::handle_aggregate_request;
pub use callable::{handle_callable_request, invoke, CallableError};
pub use health::{health_check, version_info};

/// Success/failure envelope returned by both triggers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TriggerResult {
    pub fn persisted(ranking_id: String) -> Self {
        Self {
            success: true,
            ranking_id: Some(ranking_id),
            message: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            success: false,
            ranking_id: None,
            message: Some("Document not found.".to_string()),
        }
    }
}

/// Echo the caller's origin, or allow any
pub(crate) fn allowed_origin(headers: &HeaderMap) -> String {
    headers
        .get("origin")
        .and_then(|value| value.to_str().ok())
        .filter(|origin| !origin.is_empty())
        .unwrap_or("*")
        .to_string()
}

/// Build a JSON response with CORS headers
pub(crate) fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    origin: &str,
) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(body).unwrap_or_default();

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Cache-Control", "no-store")
        .header("Access-Control-Allow-Origin", origin)
        .header("Vary", "Origin")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| fallback_response())
}

/// CORS preflight response
pub(crate) fn preflight_response(origin: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", origin)
        .header("Access-Control-Allow-Headers", "Content-Type, x-api-key")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Max-Age", "3600")
        .header("Vary", "Origin")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| fallback_response())
}

fn fallback_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        br#"{"message":"An error occurred."}"#,
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
