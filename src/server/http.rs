//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo, one task per connection.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::ApiKeyValidator;
use crate::config::Args;
use crate::db::DocumentStore;
use crate::ranking::RankingPipeline;
use crate::routes::{self, allowed_origin, preflight_response};
use crate::types::Result;

/// Largest accepted callable request body
pub const MAX_CALLABLE_BODY_BYTES: usize = 64 * 1024;

const AGGREGATE_PATH: &str = "/aggregate-ranking";
const AGGREGATE_ALIAS: &str = "/aggregateRanking";
const CALLABLE_PATH: &str = "/callable/aggregate-ranking";

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// The single aggregation core behind both triggers
    pub pipeline: RankingPipeline,
    pub api_key: ApiKeyValidator,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, store: Arc<dyn DocumentStore>) -> Self {
        let pipeline = RankingPipeline::new(store, args.pipeline_config());
        let api_key = ApiKeyValidator::new(args.api_key());

        Self {
            args,
            pipeline,
            api_key,
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server and serve until Ctrl+C or SIGTERM
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Ranking aggregator listening on {} (store: {})",
        state.args.listen,
        state.pipeline.store().kind()
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - using dev API key unless API_KEY is set");
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { handle_request(state, addr, req).await }
                        });

                        if let Err(err) = http1::Builder::new()
                            .serve_connection(io, service)
                            .await
                        {
                            error!("Error serving connection from {}: {:?}", addr, err);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {:?}", e);
                }
            },
            _ = &mut shutdown => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

/// Log and route one request from a connection
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    info!("[{}] {} {}", addr, req.method(), req.uri().path());
    Ok(route(&state, req).await)
}

/// Dispatch a request to its handler by method and path
pub async fn route<B>(state: &AppState, req: Request<B>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (&method, path.as_str()) {
        (&Method::OPTIONS, AGGREGATE_PATH | AGGREGATE_ALIAS | CALLABLE_PATH) => {
            preflight_response(&allowed_origin(req.headers()))
        }

        (_, AGGREGATE_PATH | AGGREGATE_ALIAS) => {
            routes::handle_aggregate_request(state, &method, req.headers()).await
        }

        (_, CALLABLE_PATH) => {
            let headers = req.headers().clone();
            match Limited::new(req.into_body(), MAX_CALLABLE_BODY_BYTES)
                .collect()
                .await
            {
                Ok(collected) => {
                    let body = collected.to_bytes();
                    routes::handle_callable_request(state, &method, &headers, &body).await
                }
                Err(e) => {
                    warn!("Callable request body error: {}", e);
                    routes::callable::invalid_argument(&headers)
                }
            }
        }

        (&Method::GET, "/health" | "/healthz") => routes::health_check(state),

        (&Method::GET, "/version") => routes::version_info(),

        _ => not_found_response(&path),
    }
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
