//! Authentication for the HTTP trigger
//!
//! The HTTP trigger is guarded by one shared secret sent in `x-api-key`.

pub mod api_key;

pub use api_key::{ApiKeyValidator, API_KEY_HEADER};
