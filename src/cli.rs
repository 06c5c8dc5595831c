// src/cli.rs

//! Command line interface for `minifyd`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::{ConfigStore, SharedConfig};
use crate::errors::Result;
use crate::supervisor::{Supervisor, SupervisorState, check_runtime, resolve_worker};

#[derive(Debug, Parser)]
#[command(
    name = "minifyd",
    version,
    about = "Watches folders and minifies scripts and stylesheets on change"
)]
pub struct Cli {
    /// Path to the configuration file (defaults to the per-user record).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity (overrides MINIFYD_LOG).
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the supervised watcher until Ctrl-C.
    Run,
    /// Run the watch pipeline in this process (what the worker binary does).
    Watch,
    /// Add folders to the watch list.
    Add {
        /// Folder paths to watch recursively.
        #[arg(required = true)]
        folders: Vec<String>,
    },
    /// Remove folders from the watch list.
    Remove {
        #[arg(required = true)]
        folders: Vec<String>,
    },
    /// Print the current configuration.
    List,
    /// Remove every folder from the watch list.
    Clear,
    /// Enable or disable desktop notifications.
    Notify {
        #[arg(value_parser = clap::builder::BoolishValueParser::new())]
        enabled: bool,
    },
    /// Set (or clear) the runtime executable the supervisor launches.
    SetRuntime {
        /// Path to the executable; omit to fall back to the bundled worker.
        path: Option<String>,
    },
    /// Verify that the configured runtime is launchable.
    Check,
}

pub async fn run(cli: Cli) -> Result<()> {
    crate::logging::init_logging(cli.log_level)?;

    let store = match &cli.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::at_default_location()?,
    };

    match cli.command {
        Command::Run => run_supervised(store).await,
        Command::Watch => crate::engine::run_pipeline(&store).await,
        Command::Add { folders } => {
            let shared = SharedConfig::new(store)?;
            for folder in folders {
                let mut added = false;
                shared
                    .update(|config| {
                        added = config.add_folder(folder.clone());
                    })
                    .await?;
                if added {
                    println!("Added folder: {folder}");
                } else {
                    println!("Folder already in the watch list: {folder}");
                }
            }
            Ok(())
        }
        Command::Remove { folders } => {
            let shared = SharedConfig::new(store)?;
            for folder in folders {
                let mut removed = false;
                shared
                    .update(|config| {
                        removed = config.remove_folder(&folder);
                    })
                    .await?;
                if removed {
                    println!("Removed folder: {folder}");
                } else {
                    println!("Folder was not in the watch list: {folder}");
                }
            }
            Ok(())
        }
        Command::List => {
            let config = store.load()?;
            println!("Config file: {}", store.path().display());
            println!("Watching: {}", config.is_watching);
            println!("Notifications: {}", config.allow_notify);
            match config.runtime_path.trim() {
                "" => println!("Runtime: (bundled worker)"),
                path => println!("Runtime: {path}"),
            }
            if config.folders.is_empty() {
                println!("No folders configured.");
            } else {
                println!("Folders:");
                for folder in &config.folders {
                    println!("  {folder}");
                }
            }
            Ok(())
        }
        Command::Clear => {
            let shared = SharedConfig::new(store)?;
            let config = shared.update(|config| config.folders.clear()).await?;
            debug_assert!(config.folders.is_empty());
            println!("Cleared the watch list.");
            Ok(())
        }
        Command::Notify { enabled } => {
            let shared = SharedConfig::new(store)?;
            shared.update(|config| config.allow_notify = enabled).await?;
            println!(
                "Notifications {}.",
                if enabled { "enabled" } else { "disabled" }
            );
            Ok(())
        }
        Command::SetRuntime { path } => {
            let shared = SharedConfig::new(store)?;
            let path = path.unwrap_or_default();
            shared
                .update(|config| config.runtime_path = path.clone())
                .await?;
            match path.trim() {
                "" => println!("Runtime cleared; the bundled worker will be used."),
                path => println!("Runtime set to: {path}"),
            }
            Ok(())
        }
        Command::Check => {
            let config = store.load()?;
            let program = resolve_worker(&config)?;
            let version = check_runtime(&program).await?;
            println!("Runtime OK: {} ({version})", program.display());
            Ok(())
        }
    }
}

/// Supervise the worker, relaying its output, until Ctrl-C or the worker
/// dies on its own.
async fn run_supervised(store: ConfigStore) -> Result<()> {
    let shared = Arc::new(SharedConfig::new(store)?);
    let mut supervisor = Supervisor::new(shared.clone());

    let mut logs = supervisor.subscribe_logs();
    let printer = tokio::spawn(async move {
        loop {
            match logs.recv().await {
                Ok(line) => println!("{line}"),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "log output lagged; some lines were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    supervisor.start().await?;
    shared.update(|config| config.is_watching = true).await?;
    info!("watcher running; press Ctrl-C to stop");

    let mut state_rx = supervisor.subscribe_state();
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received; stopping worker");
        }
        _ = wait_until_stopped(&mut state_rx) => {
            warn!("worker exited on its own");
        }
    }

    supervisor.stop().await?;
    shared.update(|config| config.is_watching = false).await?;

    // Give the final outcome line a chance to be printed.
    tokio::task::yield_now().await;
    printer.abort();
    Ok(())
}

async fn wait_until_stopped(
    state_rx: &mut tokio::sync::watch::Receiver<SupervisorState>,
) {
    while state_rx.changed().await.is_ok() {
        if *state_rx.borrow() == SupervisorState::Stopped {
            return;
        }
    }
}
