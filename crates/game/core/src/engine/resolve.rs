//! Resolution of one node against a slot's live state.
//!
//! Every node passes through the same stages, in order:
//!
//! 1. **start**: wait out the animation lock (and the cooldown, when the node
//!    asked to wait for it)
//! 2. **timing**: cast, recast, lock and snapshot times from speed and tax
//! 3. **validate**: cooldowns, prerequisites, costs and combo against the
//!    store as it is at the start
//! 4. **commit**: valid nodes only; costs, effects, proc checks, cooldown
//!    charges and the new animation lock
//!
//! Invalid nodes stop after stage 3 with their timings kept for display.

use crate::config::{GameConfig, TaxModel};
use crate::job::{Effect, Job, Requirement, SkillSpec};
use crate::node::{ActionNode, InvalidReason, Resolution};
use crate::resource::{ResourceId, ResourceStore};
use crate::time::Millis;
use crate::timeline::{Marker, WarningKind, WarningMark, party_buffs_at, tincture_at};
use crate::timing::{CASTER_TAX, after_fps_tax, cast_lock, pre_tax_gcd};

use super::slot::SlotState;

/// Read-only inputs shared by every node of a replay.
pub(crate) struct ReplayEnv<'a> {
    pub config: &'a GameConfig,
    pub markers: &'a [Marker],
    pub mp_per_tick: u32,
}

/// Stage 2 output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Timing<R> {
    pub cast: Millis,
    pub recast: Millis,
    pub lock: Millis,
    /// Resource spent to skip the cast.
    pub instant_via: Option<R>,
}

/// Replays `node` on `state`, writing its resolution and verdict.
pub(crate) fn replay_node<J: Job>(
    state: &mut SlotState<J::Resource>,
    node: &mut ActionNode<J::Skill, J::Resource>,
    env: &ReplayEnv<'_>,
    warnings: &mut Vec<WarningMark<J::Resource>>,
) {
    let spec = J::skill(node.skill);
    node.kind = spec.kind;
    node.potency = spec.potency;

    let start = resolve_start::<J>(state, node, &spec, env, warnings);
    let timing = resolve_timing::<J>(&spec, &state.store, env.config);
    let invalid = validate::<J>(&spec, &state.store);

    let snapshot_at = if timing.cast.is_positive() {
        start + timing.cast
    } else {
        start
    };
    let buffs = snapshot_buffs(&state.store, timing.cast);
    let mut resolution = Resolution {
        start,
        cast: timing.cast,
        recast: timing.recast,
        lock: timing.lock,
        snapshot_at,
        applied_at: snapshot_at + spec.application_delay,
        buffs,
        party_buffs: party_buffs_at(env.markers, snapshot_at),
        tincture: tincture_at(env.markers, snapshot_at),
        procs: Vec::new(),
    };

    if invalid.is_empty() {
        commit::<J>(state, &spec, &timing, &mut resolution, warnings);
    } else {
        for reason in &invalid {
            if let InvalidReason::BrokenCombo { expected } = reason {
                warnings.push(WarningMark {
                    at: start,
                    kind: WarningKind::ComboBreak(*expected),
                });
            }
        }
    }

    node.resolution = Some(resolution);
    node.invalid = invalid;
}

/// Stage 1: the earliest time the node may begin.
fn resolve_start<J: Job>(
    state: &mut SlotState<J::Resource>,
    node: &ActionNode<J::Skill, J::Resource>,
    spec: &SkillSpec<J::Resource>,
    env: &ReplayEnv<'_>,
    warnings: &mut Vec<WarningMark<J::Resource>>,
) -> Millis {
    let start = node.requested_at.max(state.next_free());
    state.advance_to::<J>(start, env.mp_per_tick, warnings);

    if node.wait_for_ready {
        let ready_in = cooldowns_of::<J>(spec)
            .map(|cooldown| state.store.ready_in(cooldown))
            .max()
            .unwrap_or_default();
        if ready_in.is_positive() {
            state.advance_to::<J>(start + ready_in, env.mp_per_tick, warnings);
            return start + ready_in;
        }
    }
    start
}

fn cooldowns_of<J: Job>(spec: &SkillSpec<J::Resource>) -> impl Iterator<Item = J::Resource> {
    let gcd = spec.kind.is_gcd().then_some(J::GCD);
    gcd.into_iter().chain(spec.cooldown)
}

/// Stage 2: speed-scaled and taxed durations.
pub(crate) fn resolve_timing<J: Job>(
    spec: &SkillSpec<J::Resource>,
    store: &ResourceStore<J::Resource>,
    config: &GameConfig,
) -> Timing<J::Resource> {
    let speed = config.stats.speed(J::SPEED_STAT);
    let scale = |base: Millis| {
        pre_tax_gcd(config.level, speed, base, J::INHERENT_HASTE).unwrap_or(base)
    };
    let frame_tax = |duration: Millis| match config.tax_model {
        TaxModel::FpsTax => after_fps_tax(config.fps, duration).unwrap_or(duration),
        TaxModel::Legacy { .. } => duration,
    };

    let instant_via = if spec.cast.is_positive() {
        spec.instant_with
            .iter()
            .copied()
            .find(|&resource| store.is_active(resource))
    } else {
        None
    };
    let cast = if spec.cast.is_positive() && instant_via.is_none() {
        scale(spec.cast)
    } else {
        Millis::ZERO
    };

    let recast = if spec.kind.is_gcd() {
        frame_tax((scale(spec.recast) + config.gcd_correction).non_negative())
    } else {
        Millis::ZERO
    };

    let lock = if cast.is_positive() {
        cast_lock(config.tax_model, config.fps, cast).unwrap_or(cast + CASTER_TAX)
    } else {
        frame_tax(spec.animation_lock.unwrap_or(config.animation_lock))
    };

    Timing {
        cast,
        recast,
        lock,
        instant_via,
    }
}

/// Stage 3: every reason the node cannot execute right now.
pub(crate) fn validate<J: Job>(
    spec: &SkillSpec<J::Resource>,
    store: &ResourceStore<J::Resource>,
) -> Vec<InvalidReason<J::Resource>> {
    let mut reasons = Vec::new();

    for cooldown in cooldowns_of::<J>(spec) {
        let ready_in = store.ready_in(cooldown);
        if ready_in.is_positive() {
            reasons.push(InvalidReason::OnCooldown {
                resource: cooldown,
                ready_in,
            });
        }
    }

    for requirement in spec.requires {
        match *requirement {
            Requirement::Active(resource) if !store.is_active(resource) => {
                reasons.push(InvalidReason::MissingPrerequisite { resource });
            }
            Requirement::AtLeast(resource, needed) if store.available(resource) < needed => {
                reasons.push(InvalidReason::ResourceUnavailable {
                    resource,
                    needed,
                    available: store.available(resource),
                });
            }
            Requirement::Absent(resource) if store.is_active(resource) => {
                reasons.push(InvalidReason::BlockedBy { resource });
            }
            _ => {}
        }
    }

    for &(resource, needed) in spec.costs {
        let available = store.amount(resource);
        if available < needed {
            reasons.push(InvalidReason::ResourceUnavailable {
                resource,
                needed,
                available,
            });
        }
    }

    if let Some(expected) = spec.combo {
        if !store.is_active(expected) {
            reasons.push(InvalidReason::BrokenCombo { expected });
        }
    }

    reasons
}

/// Job buffs contributing potency that are still up when the cast ends.
fn snapshot_buffs<R: ResourceId>(store: &ResourceStore<R>, cast: Millis) -> Vec<(R, u32)> {
    R::ALL
        .iter()
        .filter_map(|&resource| {
            let bonus = resource.descriptor().potency_bonus?;
            if !store.is_active(resource) {
                return None;
            }
            let timed = resource.descriptor().kind.is_timed();
            (!timed || store.timer(resource) > cast).then_some((resource, bonus))
        })
        .collect()
}

/// Stage 4: apply a valid node to the slot.
fn commit<J: Job>(
    state: &mut SlotState<J::Resource>,
    spec: &SkillSpec<J::Resource>,
    timing: &Timing<J::Resource>,
    resolution: &mut Resolution<J::Resource>,
    warnings: &mut Vec<WarningMark<J::Resource>>,
) {
    let at = resolution.start;
    let store = &mut state.store;
    let mut raised = Vec::new();

    if let Some(resource) = timing.instant_via {
        store.consume(resource, 1);
    }
    for &(resource, amount) in spec.costs {
        store.consume(resource, amount);
    }
    if let Some(marker) = spec.combo {
        store.clear(marker);
    }

    for (index, effect) in spec.effects.iter().enumerate() {
        match *effect {
            Effect::Gain(resource, amount) => raised.extend(store.gain(resource, amount)),
            Effect::Set(resource, amount) => raised.extend(store.set(resource, amount)),
            Effect::Consume(resource, amount) => {
                let held = store.amount(resource);
                store.consume(resource, amount.min(held));
            }
            Effect::Clear(resource) => store.clear(resource),
            Effect::Refresh(resource) => raised.extend(store.refresh(resource)),
            Effect::Proc {
                grant,
                chance_percent,
            } => {
                let context = u32::try_from(index).unwrap_or(u32::MAX);
                if state.roller.check(chance_percent, context) {
                    raised.extend(store.refresh(grant));
                    resolution.procs.push(grant);
                }
            }
        }
    }

    if spec.kind.is_gcd() {
        store.use_charge(J::GCD, Some(timing.recast));
    }
    if let Some(cooldown) = spec.cooldown {
        store.use_charge(cooldown, None);
    }

    state.lock_until = at + timing.lock;
    warnings.extend(raised.into_iter().map(|kind| WarningMark { at, kind }));
}
