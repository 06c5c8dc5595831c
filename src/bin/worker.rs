// src/bin/worker.rs

//! The supervised pipeline process.
//!
//! Run with no arguments it loads the persisted watch configuration and
//! runs the pipeline until terminated. `-v` prints a version report and
//! exits; the supervisor uses this to verify the binary is launchable
//! before spawning it for real.

use minifyd::config::ConfigStore;
use minifyd::engine;
use minifyd::logging;

#[tokio::main]
async fn main() {
    if std::env::args().nth(1).as_deref() == Some("-v") {
        println!("v{}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(err) = run().await {
        eprintln!("minifyd-worker: {err}");
        std::process::exit(1);
    }
}

async fn run() -> minifyd::Result<()> {
    logging::init_logging(None)?;
    let store = ConfigStore::at_default_location()?;
    engine::run_pipeline(&store).await
}
