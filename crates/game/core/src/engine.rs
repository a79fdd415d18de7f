//! Timeline replay engine.
//!
//! [`GameState`] owns the timeline and the live per-slot state at the
//! current cursor. Appending an action at or after a slot's clock resolves it
//! directly; every other edit (insertions in the past, deletions, slot and
//! marker changes, scrubbing backwards) rebuilds the live state by replaying
//! each slot from its starting resources. Both paths produce the same state.

mod resolve;
mod slot;
mod snapshot;
#[cfg(test)]
mod tests;

pub use slot::SlotState;
pub use snapshot::{NodeView, ResourceView, SessionSnapshot, SlotSnapshot};

use arrayvec::ArrayVec;

use crate::config::{GameConfig, MAX_SLOTS};
use crate::error::{ConfigError, EngineError};
use crate::job::Job;
use crate::node::{ActionNode, NodeId};
use crate::potency::{self, PotencyOptions, PotencyResult, PotencySummary};
use crate::resource::{ResourceStore, resolve_overrides};
use crate::rng::{ProcRoller, seed_from_token};
use crate::time::Millis;
use crate::timeline::{MarkerId, MarkerKind, Timeline};
use crate::timing::mp_regen_per_tick;

use resolve::{ReplayEnv, replay_node};

/// A request to use a skill on a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionIntent<S> {
    pub skill: S,
    /// Defaults to the active slot.
    pub slot: Option<usize>,
    /// Defaults to the slot's next free moment.
    pub at: Option<Millis>,
    pub targets: u8,
    /// Delay the start until the skill's cooldowns are ready.
    pub wait_for_ready: bool,
}

impl<S> ActionIntent<S> {
    pub fn new(skill: S) -> Self {
        Self {
            skill,
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

/// Timeline plus the live state of every slot at the cursor.
pub struct GameState<J: Job> {
    config: GameConfig,
    initial_store: ResourceStore<J::Resource>,
    seed: u64,
    mp_per_tick: u32,
    timeline: Timeline<J::Skill, J::Resource>,
    slots: ArrayVec<SlotState<J::Resource>, MAX_SLOTS>,
    cursor: Millis,
}

impl<J: Job> GameState<J> {
    /// Validates `config` and builds a session with one empty slot.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.job != J::ID {
            return Err(ConfigError::JobMismatch {
                config: config.job,
                session: J::ID,
            });
        }
        let overrides = resolve_overrides::<J::Resource>(&config.overrides)?;
        let initial_store = ResourceStore::with_overrides(&overrides, J::CONSISTENCY)?;
        let mp_per_tick = mp_regen_per_tick(config.level, config.stats.piety).ok_or_else(|| {
            ConfigError::InvalidField {
                field: "piety",
                value: config.stats.piety.to_string(),
            }
        })?;

        let mut state = Self {
            seed: seed_from_token(&config.random_seed),
            cursor: config.session_start(),
            config,
            initial_store,
            mp_per_tick,
            timeline: Timeline::new(),
            slots: ArrayVec::new(),
        };
        let fresh = state.fresh_slot();
        state.slots.push(fresh);
        Ok(state)
    }

    fn fresh_slot(&self) -> SlotState<J::Resource> {
        SlotState::new(
            self.initial_store.clone(),
            self.config.session_start(),
            self.config.time_till_first_mana_tick,
            ProcRoller::new(self.seed, self.config.proc_mode),
        )
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline<J::Skill, J::Resource> {
        &self.timeline
    }

    /// Time of the live state.
    pub fn cursor(&self) -> Millis {
        self.cursor
    }

    pub fn session_start(&self) -> Millis {
        self.config.session_start()
    }

    /// Latest moment any slot is busy until.
    pub fn session_end(&self) -> Millis {
        self.timeline
            .slots()
            .iter()
            .flat_map(|slot| slot.nodes())
            .filter_map(|node| node.resolution.as_ref())
            .map(|resolution| resolution.lock_end().max(resolution.applied_at))
            .fold(self.session_start(), Millis::max)
    }

    pub fn slot_count(&self) -> usize {
        self.timeline.slot_count()
    }

    pub fn active_slot(&self) -> usize {
        self.timeline.active_slot()
    }

    pub fn set_active_slot(&mut self, slot: usize) -> Result<(), EngineError> {
        self.timeline.set_active_slot(slot)
    }

    fn slot_state(&self, slot: usize) -> Result<&SlotState<J::Resource>, EngineError> {
        self.slots.get(slot).ok_or(EngineError::SlotOutOfRange {
            slot,
            count: self.slots.len(),
        })
    }

    /// Copy of a slot's live resources.
    pub fn resources(&self, slot: usize) -> Result<ResourceStore<J::Resource>, EngineError> {
        Ok(self.slot_state(slot)?.store.clone())
    }

    /// Copy of a slot's live state.
    pub fn slot_state_snapshot(&self, slot: usize) -> Result<SlotState<J::Resource>, EngineError> {
        self.slot_state(slot).cloned()
    }

    /// Resolves a skill use and records it on the timeline.
    ///
    /// The returned node is a copy; later edits may re-resolve it.
    pub fn apply_action(
        &mut self,
        intent: ActionIntent<J::Skill>,
    ) -> Result<ActionNode<J::Skill, J::Resource>, EngineError> {
        if intent.targets == 0 {
            return Err(EngineError::NoTargets);
        }
        let slot = intent.slot.unwrap_or_else(|| self.timeline.active_slot());
        let state = self.slot_state(slot)?;
        let requested = intent.at.unwrap_or_else(|| state.next_free());
        let appends = requested >= state.now
            && !self.has_pending_nodes()
            && self
                .timeline
                .slot(slot)?
                .last_requested()
                .is_none_or(|last| last <= requested);

        let spec = J::skill(intent.skill);
        let id = self.timeline.allocate_node_id();
        let mut node = ActionNode::proposed(id, intent.skill, spec.kind, spec.potency, requested);
        node.targets = intent.targets;
        node.wait_for_ready = intent.wait_for_ready;

        if appends {
            let (slot_timeline, markers) = self.timeline.slot_with_markers(slot)?;
            let env = ReplayEnv {
                config: &self.config,
                markers,
                mp_per_tick: self.mp_per_tick,
            };
            let state = &mut self.slots[slot];
            replay_node::<J>(state, &mut node, &env, &mut slot_timeline.warnings);
            slot_timeline.insert(node.clone());
            let reached = state.now;
            self.sync_to(self.cursor.max(reached));
            Ok(node)
        } else {
            self.timeline.slot_mut(slot)?.insert(node);
            self.rebuild_up_to(self.cursor.max(requested));
            let node = self
                .timeline
                .slot(slot)?
                .node(id)
                .cloned()
                .ok_or(EngineError::NodeNotFound { slot, node: id })?;
            if node.display_time() > self.cursor {
                self.advance_to(node.display_time());
            }
            Ok(node)
        }
    }

    /// Whether some node starts after the cursor and is not yet applied.
    fn has_pending_nodes(&self) -> bool {
        self.timeline
            .slots()
            .iter()
            .any(|slot| slot.last_start().is_some_and(|last| last > self.cursor))
    }

    /// Moves the cursor. Moving backwards, or across nodes that are not yet
    /// applied, rebuilds from the start.
    pub fn advance_to(&mut self, time: Millis) {
        if time < self.cursor || self.has_pending_nodes() {
            self.rebuild_up_to(time);
        } else {
            self.sync_to(time);
        }
    }

    pub fn advance_by(&mut self, dt: Millis) {
        self.advance_to(self.cursor + dt.non_negative());
    }

    /// Forward-only move of every slot to `time`.
    fn sync_to(&mut self, time: Millis) {
        let (slot_timelines, _) = self.timeline.all_slots_with_markers();
        for (state, slot_timeline) in self.slots.iter_mut().zip(slot_timelines.iter_mut()) {
            state.advance_to::<J>(time, self.mp_per_tick, &mut slot_timeline.warnings);
        }
        self.cursor = self.cursor.max(time);
    }

    /// Replays every slot from its starting state.
    ///
    /// All nodes are re-resolved, so results after `time` stay current for
    /// display; the live state is taken after the last node that starts at or
    /// before `time`, advanced to `time`. A node requested earlier but held
    /// past `time` by a lock is not part of it.
    pub fn rebuild_up_to(&mut self, time: Millis) {
        let time = time.max(self.session_start());
        let fresh = self.fresh_slot();
        let (slot_timelines, markers) = self.timeline.all_slots_with_markers();
        let env = ReplayEnv {
            config: &self.config,
            markers,
            mp_per_tick: self.mp_per_tick,
        };

        let mut lives = ArrayVec::new();
        for slot_timeline in slot_timelines.iter_mut() {
            slot_timeline.warnings.clear();
            let mut state = fresh.clone();
            let mut live = None;
            for node in slot_timeline.nodes.iter_mut() {
                // The start is only known once resolved, so keep the state
                // from before the node until it lands at or before `time`.
                let before = live.is_none().then(|| state.clone());
                replay_node::<J>(&mut state, node, &env, &mut slot_timeline.warnings);
                if let Some(mut snapshot) = before {
                    if node.display_time() > time {
                        snapshot.advance_to::<J>(time, env.mp_per_tick, &mut Vec::new());
                        live = Some(snapshot);
                    }
                }
            }
            let live = match live {
                Some(live) => live,
                None => {
                    state.advance_to::<J>(time, env.mp_per_tick, &mut slot_timeline.warnings);
                    state
                }
            };
            lives.push(live);
        }
        self.slots = lives;
        self.cursor = time;
    }

    /// Removes a node and rebuilds.
    pub fn delete_node(
        &mut self,
        slot: usize,
        id: NodeId,
    ) -> Result<ActionNode<J::Skill, J::Resource>, EngineError> {
        let removed = self
            .timeline
            .slot_mut(slot)?
            .remove(id)
            .ok_or(EngineError::NodeNotFound { slot, node: id })?;
        self.rebuild_up_to(self.cursor);
        Ok(removed)
    }

    pub fn add_slot(&mut self) -> Result<usize, EngineError> {
        let index = self.timeline.add_slot()?;
        self.rebuild_up_to(self.cursor);
        Ok(index)
    }

    pub fn clone_slot(&mut self, slot: usize) -> Result<usize, EngineError> {
        let index = self.timeline.clone_slot(slot)?;
        self.rebuild_up_to(self.cursor);
        Ok(index)
    }

    pub fn remove_slot(&mut self, slot: usize) -> Result<(), EngineError> {
        self.timeline.remove_slot(slot)?;
        self.rebuild_up_to(self.cursor);
        Ok(())
    }

    pub fn add_marker(&mut self, kind: MarkerKind, start: Millis, duration: Millis) -> MarkerId {
        let id = self.timeline.add_marker(kind, start, duration);
        self.rebuild_up_to(self.cursor);
        id
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> Result<(), EngineError> {
        self.timeline.remove_marker(id)?;
        self.rebuild_up_to(self.cursor);
        Ok(())
    }

    pub fn potency(
        &self,
        slot: usize,
        id: NodeId,
        options: &PotencyOptions,
    ) -> Result<Option<PotencyResult>, EngineError> {
        let node = self
            .timeline
            .slot(slot)?
            .node(id)
            .ok_or(EngineError::NodeNotFound { slot, node: id })?;
        Ok(potency::resolve(node, &self.timeline, options))
    }

    /// Potency totals of a slot, optionally only up to `until`.
    pub fn potency_summary(
        &self,
        slot: usize,
        options: &PotencyOptions,
        until: Option<Millis>,
    ) -> Result<PotencySummary, EngineError> {
        let nodes = self.timeline.slot(slot)?.nodes();
        Ok(potency::summarize(nodes, &self.timeline, options, until))
    }
}
