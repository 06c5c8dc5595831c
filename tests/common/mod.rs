use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// Uses `with_test_writer()`, so logs are captured per-test and only
/// printed for failing tests (unless run with `-- --nocapture`).
/// Enable levels with e.g. `RUST_LOG=debug cargo test`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// A tempdir whose name has no leading dot, so nothing inside it is
/// classified as hidden.
#[allow(dead_code)]
pub fn visible_tempdir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("minifyd-test")
        .tempdir()
        .expect("failed to create tempdir")
}
