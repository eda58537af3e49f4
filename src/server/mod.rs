//! HTTP server for the ranking triggers

pub mod http;

pub use http::{route, run, AppState, MAX_CALLABLE_BODY_BYTES};
