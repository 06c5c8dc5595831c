// src/supervisor/runtime_check.rs

use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{MinifydError, Result};

/// A version report: `v` followed by at least one digit.
static VERSION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d").expect("version pattern is valid"));

/// Verify that `program` is a launchable runtime before the supervisor
/// spawns it for real.
///
/// The check runs `<program> -v` and requires the first stdout line to be
/// a version report. Any failure (missing binary, non-zero exit, garbage
/// output) yields [`MinifydError::RuntimeNotInstalled`].
///
/// Returns the reported version line.
pub async fn check_runtime(program: &Path) -> Result<String> {
    let output = Command::new(program)
        .arg("-v")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|err| {
            MinifydError::RuntimeNotInstalled(format!("{}: {err}", program.display()))
        })?;

    if !output.status.success() {
        return Err(MinifydError::RuntimeNotInstalled(format!(
            "{}: exited with {}",
            program.display(),
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.lines().next().unwrap_or("").trim().to_string();
    if !VERSION_LINE.is_match(&version) {
        return Err(MinifydError::RuntimeNotInstalled(format!(
            "{}: unexpected version output {version:?}",
            program.display()
        )));
    }

    debug!(program = ?program, %version, "runtime check ok");
    Ok(version)
}
