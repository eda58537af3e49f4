//! HTTP trigger
//!
//! `POST /aggregate-ranking` with the shared secret in `x-api-key`.
//!
//! | Condition | Status | Body |
//! |---|---|---|
//! | method is not POST | 405 | `{"message":"Method not allowed."}` |
//! | key missing or wrong | 403 | `{"message":"Forbidden."}` |
//! | entity list missing | 404 | `{"message":"Document not found."}` |
//! | ranking persisted | 200 | `{"success":true,"rankingId":"..."}` |
//! | anything else | 500 | `{"message":"An error occurred."}` |
//!
//! The method and key checks happen before any storage access.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{HeaderMap, Method, Response, StatusCode};
use serde_json::json;
use tracing::{error, info, warn};

use crate::ranking::Outcome;
use crate::routes::{allowed_origin, json_response, TriggerResult};
use crate::server::AppState;

/// Handle one HTTP trigger request
pub async fn handle_aggregate_request(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
) -> Response<Full<Bytes>> {
    let origin = allowed_origin(headers);

    if method != Method::POST {
        let mut response = json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &json!({ "message": "Method not allowed." }),
            &origin,
        );
        response
            .headers_mut()
            .insert("Allow", hyper::header::HeaderValue::from_static("POST, OPTIONS"));
        return response;
    }

    if !state.api_key.validate_headers(headers) {
        warn!("Rejected aggregation request with missing or invalid API key");
        return json_response(
            StatusCode::FORBIDDEN,
            &json!({ "message": "Forbidden." }),
            &origin,
        );
    }

    match state.pipeline.run().await {
        Ok(Outcome::Persisted { ranking_id, entries }) => {
            info!(ranking_id = %ranking_id, entries, "HTTP trigger completed");
            json_response(StatusCode::OK, &TriggerResult::persisted(ranking_id), &origin)
        }
        Ok(Outcome::SourceNotFound) => json_response(
            StatusCode::NOT_FOUND,
            &json!({ "message": "Document not found." }),
            &origin,
        ),
        Err(e) => {
            error!(error = %e, "Ranking aggregation failed");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "message": "An error occurred." }),
                &origin,
            )
        }
    }
}
