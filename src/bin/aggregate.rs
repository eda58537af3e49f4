//! One-shot ranking run
//!
//! Invokes the callable trigger directly, without the HTTP server, and
//! prints the callable envelope to stdout. Exits non-zero on failure.
//!
//! ```sh
//! ranking-aggregate --entity-count-source live --sort-direction desc
//! ```

use clap::Parser;
use serde_json::json;
use tracing::error;

use ranking_aggregator::{config::Args, db, logging, ranking::RankingPipeline, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    logging::init(&args.log_level, args.log_format);

    // No shared secret here: the caller already has process access
    if args.fetch_concurrency == 0 || args.request_timeout_ms == 0 {
        error!("FETCH_CONCURRENCY and REQUEST_TIMEOUT_MS must be greater than zero");
        std::process::exit(2);
    }

    let store = db::connect(&args).await?;
    let pipeline = RankingPipeline::new(store, args.pipeline_config());

    match routes::invoke(&pipeline).await {
        Ok(result) => {
            println!("{}", json!({ "result": result }));
            Ok(())
        }
        Err(e) => {
            println!("{}", json!({ "error": e }));
            std::process::exit(1);
        }
    }
}
