//! RecordBot - Entry Point
//!
//! Modes:
//! - Default: Telegram bot backed by MongoDB
//! - --in-memory / -m: Telegram bot backed by an in-process store

use anyhow::Context;
use recordbot::{build_router, Config, MemoryRecordStore, MongoRecordStore, RecordStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let in_memory = args.iter().any(|a| a == "--in-memory" || a == "-m");
    let json_logs = args.iter().any(|a| a == "--json-logs" || a == "-j");
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");

    if help_mode {
        println!("RecordBot v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: recordbot [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --in-memory, -m    Keep records in process instead of MongoDB");
        println!("  --json-logs, -j    Log JSON lines to stderr");
        println!("  --help, -h         Show this help");
        println!();
        println!("Environment variables:");
        println!("  TELEGRAM_BOT_TOKEN                    Telegram bot token (or TELOXIDE_TOKEN)");
        println!("  MONGO_URI                             MongoDB connection string");
        println!("  MONGO_DATABASE                        Database name (default: mydatabase)");
        println!("  MONGO_COLLECTION                      Collection name (default: userdata)");
        println!("  MONGO_SERVER_SELECTION_TIMEOUT_SECS   Driver server selection timeout (default: 10)");
        println!("  RUST_LOG                              Log filter directives (default: info)");
        return Ok(());
    }

    recordbot::logging::init_tracing(json_logs)?;

    info!("RecordBot v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let store: Arc<dyn RecordStore> = if in_memory {
        info!("Using in-memory record store");
        Arc::new(MemoryRecordStore::new())
    } else {
        info!("Connecting to MongoDB...");
        Arc::new(
            MongoRecordStore::connect(&config)
                .await
                .context("Failed to connect to MongoDB")?,
        )
    };

    let router = build_router(Arc::clone(&store));
    let result = recordbot::telegram::run_telegram_bot(&config.telegram_bot_token, router).await;

    store.shutdown().await;
    result
}
