//! Mercurial diff tool.
//!
//! Shells out to `hg diff --git` and captures stdout. Failures are soft:
//! a missing `hg` binary or a non-zero exit is logged and reported as an
//! error-indicating string so the agent loop can hand the degraded result
//! back to the model instead of aborting.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

const DIFF_TIMEOUT_SECS: u64 = 30;

/// Unified diff of the working directory against the last commit.
pub async fn diff(dir: &Path) -> String {
    let mut cmd = Command::new("hg");
    cmd.arg("diff")
        .arg("--git")
        .current_dir(dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let output = match tokio::time::timeout(Duration::from_secs(DIFF_TIMEOUT_SECS), cmd.output())
        .await
    {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "failed to run `hg diff --git`");
            return format!("error: could not run hg: {err}");
        }
        Err(_) => {
            tracing::warn!("`hg diff --git` timed out after {DIFF_TIMEOUT_SECS}s");
            return "error: hg diff timed out".to_string();
        }
    };

    if output.status.success() {
        String::from_utf8_lossy(&output.stdout).into_owned()
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(
            code = output.status.code().unwrap_or(-1),
            stderr = %stderr.trim(),
            "`hg diff --git` exited non-zero"
        );
        format!("error: hg diff failed: {}", stderr.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_repository_yields_string_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let payload = diff(dir.path()).await;
        // Without repository metadata (or without hg installed) the tool
        // degrades to an empty or error-indicating string.
        assert!(payload.is_empty() || payload.starts_with("error:"));
    }
}
