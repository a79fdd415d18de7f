//! Job-agnostic session facade.
//!
//! [`Session`] owns one [`GameState`] for the configured job and accepts
//! string-keyed [`Intent`]s, so callers never name a job's enums. Every
//! query returns owned data; nothing handed out aliases live engine state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use rotation_content::{Caster, Striker};
use rotation_core::{
    ActionIntent, GameConfig, GameState, Job, JobId, MarkerId, MarkerKind, Millis, NodeId,
    PotencyOptions, SkillId, SlotState, TaxModel,
};

use crate::error::{Result, RuntimeError};
use crate::intake::{RawConfig, ensure_seed};
use crate::playback::PlaybackClock;
use crate::save::{CURRENT_VERSION, FPS_TAX_VERSION, SaveFile, SavedMarker, SavedNode};
use crate::view::{NodeRow, SessionView, node_row};

/// A skill use addressed by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub skill: String,
    /// Defaults to the active slot.
    #[serde(default)]
    pub slot: Option<usize>,
    /// Defaults to the slot's next free moment.
    #[serde(default)]
    pub at: Option<Millis>,
    #[serde(default = "single_target")]
    pub targets: u8,
    #[serde(default)]
    pub wait_for_ready: bool,
}

fn single_target() -> u8 {
    1
}

impl Intent {
    pub fn new(skill: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            slot: None,
            at: None,
            targets: 1,
            wait_for_ready: false,
        }
    }

    pub fn on_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn at(mut self, at: Millis) -> Self {
        self.at = Some(at);
        self
    }

    pub fn targets(mut self, targets: u8) -> Self {
        self.targets = targets;
        self
    }

    pub fn wait_for_ready(mut self) -> Self {
        self.wait_for_ready = true;
        self
    }
}

enum Engine {
    Caster(GameState<Caster>),
    Striker(GameState<Striker>),
}

/// Runs `$body` with `$state` bound to the concrete [`GameState`].
macro_rules! with_engine {
    ($engine:expr, $state:ident => $body:expr) => {
        match $engine {
            Engine::Caster($state) => $body,
            Engine::Striker($state) => $body,
        }
    };
}

pub struct Session {
    engine: Engine,
    options: PotencyOptions,
}

impl Session {
    /// Opens a session, generating a seed if the configuration has none.
    pub fn new(mut config: GameConfig) -> Result<Self> {
        if let Some(seed) = ensure_seed(&mut config, &mut rand::thread_rng()) {
            tracing::info!("Generated random seed {} for new session", seed);
        }
        let job = config.job;
        let seed = config.random_seed.clone();
        let engine = match job {
            JobId::Caster => Engine::Caster(GameState::new(config)?),
            JobId::Striker => Engine::Striker(GameState::new(config)?),
        };
        tracing::info!("Session created for {} with seed {:?}", job, seed);
        Ok(Self {
            engine,
            options: PotencyOptions::default(),
        })
    }

    /// Parses form values and opens a session.
    pub fn from_raw(raw: &RawConfig) -> Result<Self> {
        let config = raw.parse().inspect_err(|err| {
            tracing::debug!("Rejected configuration: {}", err);
        })?;
        Self::new(config)
    }

    /// Rebuilds a session from a save file.
    pub fn restore(save: &SaveFile) -> Result<Self> {
        let mut session = Self::new(save.config.clone())?;
        for _ in 1..save.slots.len() {
            session.add_slot()?;
        }
        for marker in &save.markers {
            session.add_marker(marker.kind.clone(), marker.start, marker.duration);
        }
        for (slot, nodes) in save.slots.iter().enumerate() {
            for node in nodes {
                let mut intent = Intent::new(node.skill.clone())
                    .on_slot(slot)
                    .at(node.at)
                    .targets(node.targets);
                intent.wait_for_ready = node.wait_for_ready;
                session.apply(&intent)?;
            }
        }
        session.set_active_slot(save.active_slot)?;
        if let Some(cursor) = save.cursor {
            session.advance_to(cursor);
        }
        tracing::info!(
            "Restored {} session with {} slot(s), {} node(s)",
            session.job(),
            save.slots.len(),
            save.slots.iter().map(Vec::len).sum::<usize>()
        );
        Ok(session)
    }

    pub fn job(&self) -> JobId {
        with_engine!(&self.engine, state => state.config().job)
    }

    pub fn config(&self) -> &GameConfig {
        with_engine!(&self.engine, state => state.config())
    }

    /// Names of every skill of the session's job.
    pub fn skills(&self) -> Vec<String> {
        fn names<J: Job>() -> Vec<String> {
            J::Skill::ALL.iter().map(ToString::to_string).collect()
        }
        match self.engine {
            Engine::Caster(_) => names::<Caster>(),
            Engine::Striker(_) => names::<Striker>(),
        }
    }

    pub fn potency_options(&self) -> &PotencyOptions {
        &self.options
    }

    pub fn set_potency_options(&mut self, options: PotencyOptions) {
        self.options = options;
    }

    pub fn cursor(&self) -> Millis {
        with_engine!(&self.engine, state => state.cursor())
    }

    pub fn slot_count(&self) -> usize {
        with_engine!(&self.engine, state => state.slot_count())
    }

    pub fn active_slot(&self) -> usize {
        with_engine!(&self.engine, state => state.active_slot())
    }

    pub fn set_active_slot(&mut self, slot: usize) -> Result<()> {
        with_engine!(&mut self.engine, state => state.set_active_slot(slot))?;
        Ok(())
    }

    /// Earliest moment the slot could start another action.
    pub fn next_free(&self, slot: usize) -> Result<Millis> {
        with_engine!(&self.engine, state => next_free(state, slot))
    }

    /// Resolves a named skill use and records it.
    pub fn apply(&mut self, intent: &Intent) -> Result<NodeRow> {
        let options = self.options;
        with_engine!(&mut self.engine, state => apply(state, intent, &options))
    }

    pub fn advance_to(&mut self, time: Millis) {
        with_engine!(&mut self.engine, state => state.advance_to(time));
    }

    pub fn advance_by(&mut self, dt: Millis) {
        with_engine!(&mut self.engine, state => state.advance_by(dt));
    }

    /// Places an action and lets `clock` react to it, as a UI does on every
    /// press. Manual mode moves the cursor right away.
    pub fn apply_playing(
        &mut self,
        intent: &Intent,
        clock: &mut PlaybackClock,
    ) -> Result<NodeRow> {
        let row = self.apply(intent)?;
        let slot = intent.slot.unwrap_or_else(|| self.active_slot());
        if let Some(target) = clock.after_action(self.cursor(), self.next_free(slot)?) {
            self.advance_to(target);
        }
        Ok(row)
    }

    /// Feeds one frame of wall time through `clock`.
    ///
    /// Returns the new cursor, or `None` while the clock is paused.
    pub fn tick(&mut self, clock: &mut PlaybackClock, wall: Duration) -> Option<Millis> {
        let target = clock.tick(self.cursor(), wall)?;
        self.advance_to(target);
        Some(self.cursor())
    }

    /// Replays every slot and leaves the live state at `time`.
    pub fn rebuild_up_to(&mut self, time: Millis) {
        tracing::debug!("Rebuilding session state up to {}", time);
        with_engine!(&mut self.engine, state => state.rebuild_up_to(time));
    }

    pub fn delete_node(&mut self, slot: usize, node: NodeId) -> Result<()> {
        with_engine!(&mut self.engine, state => state.delete_node(slot, node).map(|_| ()))?;
        tracing::debug!("Deleted node {} from slot {}", node, slot);
        Ok(())
    }

    pub fn add_slot(&mut self) -> Result<usize> {
        Ok(with_engine!(&mut self.engine, state => state.add_slot())?)
    }

    pub fn clone_slot(&mut self, slot: usize) -> Result<usize> {
        Ok(with_engine!(&mut self.engine, state => state.clone_slot(slot))?)
    }

    pub fn remove_slot(&mut self, slot: usize) -> Result<()> {
        Ok(with_engine!(&mut self.engine, state => state.remove_slot(slot))?)
    }

    pub fn add_marker(&mut self, kind: MarkerKind, start: Millis, duration: Millis) -> MarkerId {
        with_engine!(&mut self.engine, state => state.add_marker(kind, start, duration))
    }

    pub fn remove_marker(&mut self, marker: MarkerId) -> Result<()> {
        Ok(with_engine!(&mut self.engine, state => state.remove_marker(marker))?)
    }

    /// Owned display snapshot of every slot.
    pub fn view(&self) -> SessionView {
        with_engine!(&self.engine, state => SessionView::from(state.snapshot(&self.options)))
    }

    /// Hex-encoded SHA-256 digest of the replayed state.
    pub fn digest_hex(&self) -> String {
        hex::encode(with_engine!(&self.engine, state => state.state_digest()))
    }

    /// Save file reproducing the timeline, markers and cursor.
    pub fn to_save(&self) -> SaveFile {
        with_engine!(&self.engine, state => to_save(state))
    }
}

fn next_free<J: Job>(state: &GameState<J>, slot: usize) -> Result<Millis> {
    let live: SlotState<J::Resource> = state.slot_state_snapshot(slot)?;
    Ok(live.next_free())
}

fn apply<J: Job>(
    state: &mut GameState<J>,
    intent: &Intent,
    options: &PotencyOptions,
) -> Result<NodeRow> {
    let skill = intent
        .skill
        .trim()
        .parse::<J::Skill>()
        .map_err(|_| RuntimeError::UnknownSkill {
            job: J::ID,
            skill: intent.skill.clone(),
        })?;
    let slot = intent.slot.unwrap_or_else(|| state.active_slot());

    let mut action = ActionIntent::new(skill).on_slot(slot).targets(intent.targets);
    action.at = intent.at;
    action.wait_for_ready = intent.wait_for_ready;

    let node = state.apply_action(action)?;
    tracing::debug!(
        "Applied {} on slot {} at {}: {}",
        node.skill,
        slot,
        node.display_time(),
        if node.is_valid() { "valid" } else { "invalid" }
    );
    let potency = state.potency(slot, node.id, options)?;
    let flags = node.flags();
    Ok(node_row(node, flags, potency))
}

fn to_save<J: Job>(state: &GameState<J>) -> SaveFile {
    let config = state.config().clone();
    let (version, caster_tax) = match config.tax_model {
        TaxModel::FpsTax => (CURRENT_VERSION, None),
        TaxModel::Legacy { caster_tax } => (FPS_TAX_VERSION - 1, Some(caster_tax)),
    };
    let slots = state
        .timeline()
        .slots()
        .iter()
        .map(|slot| {
            slot.nodes()
                .iter()
                .map(|node| SavedNode {
                    skill: node.skill.to_string(),
                    at: node.requested_at,
                    targets: node.targets,
                    wait_for_ready: node.wait_for_ready,
                })
                .collect()
        })
        .collect();
    let markers = state
        .timeline()
        .markers()
        .iter()
        .map(|marker| SavedMarker {
            kind: marker.kind.clone(),
            start: marker.start,
            duration: marker.duration,
        })
        .collect();

    SaveFile {
        version,
        config,
        caster_tax,
        active_slot: state.active_slot(),
        cursor: Some(state.cursor()),
        slots,
        markers,
    }
}
