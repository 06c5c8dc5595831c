// src/lib.rs

//! `minifyd` watches folder trees and turns source files into deployable
//! artifacts on every change: JavaScript and TypeScript become minified
//! `.min.js` files, LESS/SCSS/SASS/Stylus become `.css` files, always next
//! to their source.
//!
//! The crate builds two binaries:
//!
//! - `minifyd`: the control CLI and process supervisor. Configuration
//!   commands edit the persisted watch record; `run` launches and
//!   supervises the worker.
//! - `minifyd-worker`: the long-running pipeline process. It speaks a
//!   line-tagged protocol on stdout ([`protocol`]) which the supervisor
//!   relays verbatim.

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod protocol;
pub mod supervisor;
pub mod transform;
pub mod watch;

pub use errors::{MinifydError, Result};
