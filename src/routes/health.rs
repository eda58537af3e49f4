//! Health and version endpoints
//!
//! - /health, /healthz - Liveness probe (is the service running?)
//! - /version - Build identification for deployment verification

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// Backing store ("mongodb" or "memory")
    pub store: &'static str,
    pub mode: &'static str,
    pub timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub git_commit: &'static str,
    pub git_commit_full: &'static str,
    pub build_timestamp: &'static str,
}

pub fn build_health_response(state: &AppState) -> HealthResponse {
    HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        store: state.pipeline.store().kind(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Liveness probe
pub fn health_check(state: &AppState) -> Response<Full<Bytes>> {
    ok_json(&build_health_response(state))
}

pub fn version_info() -> Response<Full<Bytes>> {
    ok_json(&VersionResponse {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        git_commit: env!("GIT_COMMIT_SHORT"),
        git_commit_full: env!("GIT_COMMIT_FULL"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
    })
}

fn ok_json<T: Serialize>(body: &T) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(body).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}
