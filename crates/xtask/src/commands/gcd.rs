//! Print speed-adjusted recast times
//!
//! Mirrors the recast preview a configuration form shows next to the speed
//! stat: each base recast before and after the frame-rate tax.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use rotation_core::{LevelSync, timing::gcd_preview};

use crate::utils::format_time;

/// Print speed-adjusted recast times
#[derive(Parser)]
pub struct Gcd {
    /// Level bracket (70, 80, 90 or 100)
    #[arg(short, long, default_value_t = 100)]
    level: u32,

    /// Spell speed or skill speed
    #[arg(short, long)]
    speed: u32,

    /// Frame rate used for the latency tax
    #[arg(short, long, default_value_t = 60.0)]
    fps: f64,

    /// Inherent haste in percent
    #[arg(long)]
    haste: Option<u32>,
}

impl Gcd {
    pub fn execute(self) -> Result<()> {
        let level = LevelSync::try_from(self.level)
            .with_context(|| format!("Unsupported level: {}", self.level))?;
        if !self.fps.is_finite() || self.fps <= 0.0 {
            anyhow::bail!("Frame rate must be positive, got {}", self.fps);
        }

        println!(
            "{} level {}, speed {}, {} fps{}",
            style("GCD preview:").bold().cyan(),
            level,
            self.speed,
            self.fps,
            self.haste
                .map(|haste| format!(", {}% haste", haste))
                .unwrap_or_default()
        );
        println!();
        println!(
            "  {:>8}  {:>9}  {:>9}",
            style("base").bold(),
            style("speed").bold(),
            style("taxed").bold()
        );

        for row in gcd_preview(level, self.speed, self.fps, self.haste) {
            let cell = |value: Option<rotation_core::Millis>| {
                value.map(format_time).unwrap_or_else(|| "n/a".to_string())
            };
            println!(
                "  {:>8}  {:>9}  {:>9}",
                format_time(row.base),
                cell(row.pre_tax),
                cell(row.taxed)
            );
        }
        Ok(())
    }
}
