//! Platform-specific directory utilities
//!
//! Provides consistent directory paths across different operating systems,
//! following platform conventions for cache and data directories.

use anyhow::Result;
use std::path::PathBuf;

/// Environment variable overriding the log directory.
pub const LOG_DIR_ENV: &str = "ROTATION_LOG_DIR";

/// Get the platform-specific log directory
///
/// `ROTATION_LOG_DIR` wins when set. Otherwise follows platform conventions:
/// - macOS: `~/Library/Caches/rotation-sim/logs`
/// - Linux: `~/.cache/rotation-sim/logs` (or `$XDG_CACHE_HOME/rotation-sim/logs`)
/// - Windows: `%LOCALAPPDATA%\rotation-sim\logs`
/// - Fallback: `/tmp/rotation-sim/logs`
pub fn log_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(LOG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let base_dir = directories::ProjectDirs::from("", "", "rotation-sim")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/rotation-sim"));

    Ok(base_dir.join("logs"))
}
