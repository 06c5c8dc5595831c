// src/config/mod.rs

//! Persisted watch configuration.
//!
//! The configuration is a single JSON object stored at a fixed per-user
//! path. [`store`] handles (re)loading and overwriting it; [`shared`]
//! wraps a store in a single-writer handle that publishes every new
//! version to read-only subscribers.

pub mod model;
pub mod shared;
pub mod store;

pub use model::WatchConfig;
pub use shared::SharedConfig;
pub use store::ConfigStore;
