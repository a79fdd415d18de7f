//! Replay a save file and print the resulting timeline
//!
//! Rebuilds the session from its requested actions, so the output reflects
//! the current engine rather than whatever produced the file. With `--play`
//! the actions are placed one at a time under a playback clock, the way a UI
//! would drive the session frame by frame.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::time::Duration;

use rotation_runtime::{Intent, PlaybackClock, SaveFile, Session, SlotView, TickMode};

use crate::utils::{format_time, parse_secs, read_save};

/// Replay a save file
#[derive(Parser)]
pub struct Replay {
    /// Save file to replay, or the name of a stored save
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Scrub to this time (seconds) instead of the saved cursor
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_secs, allow_hyphen_values = true)]
    until: Option<rotation_core::Millis>,

    /// Only print this slot
    #[arg(short, long, value_name = "N")]
    slot: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Place the actions one by one under a playback clock
    #[arg(long, value_enum, value_name = "MODE")]
    play: Option<PlayMode>,

    /// Combat time per wall-clock time while playing
    #[arg(long, default_value_t = 2.0, requires = "play")]
    speed: f64,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum PlayMode {
    /// Play until the slot is free again, then stop
    AutoPause,
    /// Keep playing between actions
    RealTime,
    /// Jump straight to the next free moment
    Manual,
}

impl From<PlayMode> for TickMode {
    fn from(mode: PlayMode) -> Self {
        match mode {
            PlayMode::AutoPause => TickMode::RealTimeAutoPause,
            PlayMode::RealTime => TickMode::RealTime,
            PlayMode::Manual => TickMode::Manual,
        }
    }
}

/// Wall time of one frame at 60 fps.
const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Node table, resources and potency totals
    Summary,
    /// Full snapshot as JSON
    Json,
}

impl Replay {
    pub fn execute(self) -> Result<()> {
        let save = read_save(&self.file)?;
        let mut session = match self.play {
            Some(mode) => PlaybackClock::new(mode.into(), self.speed)
                .and_then(|clock| play(&save, clock)),
            None => Session::restore(&save),
        }
        .with_context(|| format!("Failed to replay save file: {}", self.file.display()))?;

        if let Some(until) = self.until {
            session.rebuild_up_to(until);
        }

        let view = session.view();
        let slots: Vec<&SlotView> = match self.slot {
            Some(index) => vec![view.slot(index).with_context(|| {
                format!("Slot {} not found (session has {})", index, view.slots.len())
            })?],
            None => view.slots.iter().collect(),
        };

        if let OutputFormat::Json = self.format {
            let json = serde_json::to_string_pretty(&slots)
                .context("Failed to serialize snapshot to JSON")?;
            println!("{}", json);
            return Ok(());
        }

        let config = session.config();
        println!("{} {}", style("Save File:").bold().cyan(), self.file.display());
        println!(
            "{} {} lvl {} @ {} fps, seed {:?}",
            style("Config:").bold().cyan(),
            config.job,
            config.level,
            config.fps,
            config.random_seed
        );
        println!("{} {}", style("Cursor:").bold().cyan(), format_time(view.cursor));
        println!("{} {}", style("Digest:").bold().cyan(), session.digest_hex());
        println!();

        for slot in slots {
            print_slot(slot);
        }
        Ok(())
    }
}

/// Places every saved action in requested order, ticking the clock between
/// them and printing where each press leaves the cursor.
fn play(save: &SaveFile, mut clock: PlaybackClock) -> rotation_runtime::Result<Session> {
    let mut empty = save.clone();
    empty.slots = vec![Vec::new(); save.slots.len()];
    empty.cursor = None;
    let mut session = Session::restore(&empty)?;

    let mut actions: Vec<_> = save
        .slots
        .iter()
        .enumerate()
        .flat_map(|(slot, nodes)| nodes.iter().map(move |node| (slot, node)))
        .collect();
    actions.sort_by_key(|(_, node)| node.at);

    println!("{}", style("Playback:").bold().yellow());
    for (slot, node) in actions {
        let mut frames = 0u32;
        while session.cursor() < node.at {
            let before = session.cursor();
            match session.tick(&mut clock, FRAME) {
                Some(cursor) if cursor > before => frames += 1,
                _ => break,
            }
        }

        let mut intent = Intent::new(node.skill.as_str())
            .on_slot(slot)
            .at(node.at)
            .targets(node.targets);
        if node.wait_for_ready {
            intent = intent.wait_for_ready();
        }
        let row = session.apply_playing(&intent, &mut clock)?;
        println!(
            "  slot {}  {:<14} start {:>9}  cursor {:>9}  after {} frame(s)",
            slot,
            row.skill,
            format_time(row.start),
            format_time(session.cursor()),
            frames
        );
    }
    println!();

    if let Some(cursor) = save.cursor {
        session.advance_to(cursor);
    }
    Ok(session)
}

fn print_slot(slot: &SlotView) {
    println!(
        "{}",
        style(format!("=== Slot {} ===", slot.index)).bold().green()
    );
    println!();

    println!("{}", style("Timeline:").bold().yellow());
    for node in &slot.nodes {
        let potency = node
            .potency
            .as_ref()
            .map(|p| format!("{:.1}", p.total_realized()))
            .unwrap_or_else(|| "-".to_string());
        let line = format!(
            "  {:>9}  {:<14} cast {:>6}  recast {:>6}  potency {:>7}",
            format_time(node.start),
            node.skill,
            format_time(node.cast),
            format_time(node.recast),
            potency
        );
        if node.invalid.is_empty() {
            println!("{}", line);
        } else {
            println!("{}  {}", style(line).red(), node.invalid.join(", "));
        }
        if !node.procs.is_empty() {
            println!("             procs: {}", node.procs.join(", "));
        }
    }
    println!();

    println!("{}", style("Resources:").bold().yellow());
    for row in &slot.resources {
        if row.amount == 0 && row.timer.as_millis() == 0 && row.available == row.max {
            continue;
        }
        println!(
            "  {:<14} {:>5}/{:<5} timer {}{}",
            row.name,
            row.available,
            row.max,
            format_time(row.timer),
            if row.enabled { "" } else { " (disabled)" }
        );
    }
    println!();

    if !slot.warnings.is_empty() {
        println!("{}", style("Warnings:").bold().yellow());
        for warning in &slot.warnings {
            println!("  {:>9}  {}", format_time(warning.at), warning.message);
        }
        println!();
    }

    let potency = &slot.potency;
    println!("{}", style("Potency:").bold().yellow());
    println!(
        "  Damage: {:.1} realized / {:.1} theoretical",
        potency.damage_realized, potency.damage_theoretical
    );
    println!("  Healing: {:.1}", potency.healing);
    println!(
        "  Nodes: {} counted, {} invalid, {} masked hits, {} limit breaks",
        potency.counted_nodes, potency.invalid_nodes, potency.masked_hits, potency.limit_breaks
    );
    println!();
}
