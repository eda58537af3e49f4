//! Ranking aggregator server

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use ranking_aggregator::{config::Args, db, logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    logging::init(&args.log_level, args.log_format);

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let layout = args.store_layout();
    info!("======================================");
    info!("  Ranking Aggregator");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db: {})", args.mongodb_uri, args.mongodb_db);
    info!("Entity list: {} [{}]", layout.source_path(), layout.source_field);
    info!("Shards: {}/*/{}", layout.ratings_collection, layout.shards_subcollection);
    info!("Rankings: {}", layout.ranking_collection);
    info!(
        "Entity count: {:?} | sort: {} | concurrency: {}",
        args.pipeline_config().entity_count,
        args.sort_direction,
        args.fetch_concurrency
    );
    info!("======================================");

    let store = db::connect(&args).await?;
    let state = Arc::new(server::AppState::new(args, store));

    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
