// src/main.rs

use clap::Parser;

use minifyd::cli::{Cli, run};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("minifyd: {err}");
        std::process::exit(1);
    }
}
