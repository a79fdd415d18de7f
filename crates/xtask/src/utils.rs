//! Utility functions for xtask commands

use anyhow::{Context, Result};
use std::path::Path;

use rotation_core::Millis;
use rotation_runtime::{LoadWarning, SaveFile, SaveStore};

/// Format combat time as signed seconds with millisecond precision
pub fn format_time(time: Millis) -> String {
    format!("{:.3}s", time.as_secs_f64())
}

/// Parse fractional seconds from the command line
pub fn parse_secs(value: &str) -> Result<Millis, String> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number of seconds", value))?;
    Millis::try_from_secs_f64(secs).ok_or_else(|| format!("`{}` is out of range", value))
}

/// Read a save file, printing load warnings to stderr
///
/// A bare name that is not an existing file is looked up in the platform
/// save directory.
pub fn read_save(path: &Path) -> Result<SaveFile> {
    let (save, warnings) = if !path.exists() && path.extension().is_none() {
        let name = path.to_string_lossy();
        let store = SaveStore::in_data_dir().context("Failed to open save directory")?;
        store
            .load(&name)?
            .with_context(|| format!("No save named `{}` in {}", name, store.base_dir().display()))?
    } else {
        SaveFile::read(path)
            .with_context(|| format!("Failed to read save file: {}", path.display()))?
    };
    print_warnings(&warnings);
    Ok(save)
}

fn print_warnings(warnings: &[LoadWarning]) {
    for warning in warnings {
        eprintln!("{} {}", console::style("warning:").yellow().bold(), warning);
    }
}
