//! Git provenance capture.

use std::path::Path;
use std::process::Command;

/// Capture the short HEAD commit hash of the repository containing `dir`.
///
/// Provenance is best-effort: returns `None` when git is unavailable, the
/// directory is not inside a work tree, or the output is empty. Never an
/// error path — a run without a commit hash is still a valid run.
pub fn capture_commit_hash(dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if hash.is_empty() {
        None
    } else {
        Some(hash)
    }
}
