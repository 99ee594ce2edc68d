//! Waiting for access request results written by the service's local storage.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::error::{PrivacyOpsError, Result};

/// How long to wait for a result file.
pub const RESULTS_DEADLINE: Duration = Duration::from_secs(5);

/// How often to check for it.
pub const RESULTS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Path of the result file for `request_id`.
#[must_use]
pub fn results_path(dir: &Path, request_id: &str) -> PathBuf {
    dir.join(format!("{request_id}.json"))
}

/// Poll for `{dir}/{request_id}.json` and parse it once it exists.
///
/// # Errors
///
/// Returns `ResultsTimeout` if the file never appears, `ResultsInvalid` if it
/// is not JSON, or `Io` if it exists but cannot be read.
pub async fn wait_for_results(
    dir: &Path,
    request_id: &str,
    deadline: Duration,
    interval: Duration,
) -> Result<Value> {
    let path = results_path(dir, request_id);
    let give_up = tokio::time::Instant::now() + deadline;

    loop {
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                return serde_json::from_slice(&bytes)
                    .map_err(|source| PrivacyOpsError::ResultsInvalid { path, source });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if tokio::time::Instant::now() >= give_up {
                    return Err(PrivacyOpsError::ResultsTimeout(path));
                }
                tokio::time::sleep(interval).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}
