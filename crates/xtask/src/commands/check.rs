//! Validate a TOML preset or a save file
//!
//! Presets are parsed and opened as a session so that job-specific resource
//! overrides are checked too. Save files are replayed in full.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::{Path, PathBuf};

use rotation_content::ConfigLoader;
use rotation_runtime::Session;

use crate::utils::read_save;

/// Validate a TOML preset or a save file
#[derive(Parser)]
pub struct Check {
    /// `.toml` preset or `.json` save file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

impl Check {
    pub fn execute(self) -> Result<()> {
        let is_preset = self
            .file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_preset {
            check_preset(&self.file)
        } else {
            check_save(&self.file)
        }
    }
}

fn check_preset(path: &Path) -> Result<()> {
    let config = ConfigLoader::load(path)?;
    let job = config.job;
    let overrides = config.overrides.len();
    Session::new(config)
        .with_context(|| format!("Preset cannot start a session: {}", path.display()))?;

    println!(
        "{} {} ({}, {} override(s))",
        style("✓").green().bold(),
        path.display(),
        job,
        overrides
    );
    Ok(())
}

fn check_save(path: &Path) -> Result<()> {
    let save = read_save(path)?;
    let session = Session::restore(&save)
        .with_context(|| format!("Failed to replay save file: {}", path.display()))?;

    let view = session.view();
    let nodes: usize = view.slots.iter().map(|slot| slot.nodes.len()).sum();
    let invalid: usize = view
        .slots
        .iter()
        .map(|slot| slot.nodes.iter().filter(|node| !node.invalid.is_empty()).count())
        .sum();

    println!(
        "{} {} (version {}, {}, {} slot(s), {} node(s))",
        style("✓").green().bold(),
        path.display(),
        save.version,
        session.job(),
        view.slots.len(),
        nodes
    );
    if invalid > 0 {
        println!(
            "  {} {} node(s) cannot execute as placed",
            style("!").yellow().bold(),
            invalid
        );
    }
    Ok(())
}
