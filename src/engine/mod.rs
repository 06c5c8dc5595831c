// src/engine/mod.rs

//! The watch-and-transform pipeline.
//!
//! [`dispatch`] consumes classified change events and drives transforms;
//! [`runtime`] wires config, watcher, and dispatch together into the
//! long-running worker process.

pub mod dispatch;
pub mod runtime;

pub use dispatch::run_dispatch;
pub use runtime::run_pipeline;
