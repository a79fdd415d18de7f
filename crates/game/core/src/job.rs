//! Job definitions.
//!
//! A job is a static table: a resource enum, a skill enum, and a
//! [`SkillSpec`] per skill describing timing, requirements and effects. The
//! engine is generic over [`Job`] and never names a concrete job.

use core::fmt;
use core::hash::Hash;
use core::str::FromStr;

use crate::config::{JobId, SpeedStat};
use crate::resource::{ConsistencyRule, ResourceId, ResourceStore};
use crate::time::Millis;

/// Identifier of one job skill.
pub trait SkillId:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + FromStr + Send + Sync + 'static
{
    const ALL: &'static [Self];
}

/// Timing class of a skill.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillKind {
    /// Global-cooldown skill that may have a cast time.
    Spell,
    /// Global-cooldown skill, always instant.
    Weaponskill,
    /// Off-global skill governed only by its own cooldown.
    Ability,
    /// Shared party gauge skill; carries no personal potency.
    LimitBreak,
}

impl SkillKind {
    pub const fn is_gcd(self) -> bool {
        matches!(self, Self::Spell | Self::Weaponskill)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PotencyKind {
    Damage,
    Healing,
}

/// Potency carried by a skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PotencySpec {
    pub kind: PotencyKind,
    pub base: u32,
    /// Percent of potency lost on every target after the first; `None` for
    /// single-target skills.
    pub falloff_percent: Option<u32>,
}

impl PotencySpec {
    pub const fn damage(base: u32) -> Self {
        Self {
            kind: PotencyKind::Damage,
            base,
            falloff_percent: None,
        }
    }

    pub const fn healing(base: u32) -> Self {
        Self {
            kind: PotencyKind::Healing,
            base,
            falloff_percent: None,
        }
    }

    pub const fn with_falloff(mut self, percent: u32) -> Self {
        self.falloff_percent = Some(percent);
        self
    }
}

/// Precondition checked against the resource store at the node's start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement<R> {
    Active(R),
    AtLeast(R, u32),
    Absent(R),
}

/// State change applied when a node commits, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect<R> {
    Gain(R, u32),
    Set(R, u32),
    /// Removes up to `n` stacks; never fails.
    Consume(R, u32),
    Clear(R),
    Refresh(R),
    /// Rolls `chance_percent`; on success refreshes `grant`.
    Proc { grant: R, chance_percent: u32 },
}

/// Static description of one skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillSpec<R: 'static> {
    pub kind: SkillKind,
    /// Base cast before speed scaling; zero for instants.
    pub cast: Millis,
    /// Base recast for global-cooldown skills.
    pub recast: Millis,
    /// Own cooldown resource, in addition to the global cooldown.
    pub cooldown: Option<R>,
    /// Replaces the configured animation lock for this skill.
    pub animation_lock: Option<Millis>,
    /// Delay between snapshot and the effect landing.
    pub application_delay: Millis,
    pub potency: Option<PotencySpec>,
    pub requires: &'static [Requirement<R>],
    pub costs: &'static [(R, u32)],
    pub effects: &'static [Effect<R>],
    /// Any active resource here makes the cast instant and loses one stack.
    pub instant_with: &'static [R],
    /// Combo marker that must be active; it is consumed on use.
    pub combo: Option<R>,
}

impl<R: 'static> SkillSpec<R> {
    const fn base(kind: SkillKind) -> Self {
        Self {
            kind,
            cast: Millis::ZERO,
            recast: Millis::ZERO,
            cooldown: None,
            animation_lock: None,
            application_delay: Millis::ZERO,
            potency: None,
            requires: &[],
            costs: &[],
            effects: &[],
            instant_with: &[],
            combo: None,
        }
    }

    pub const fn spell(cast: Millis, recast: Millis) -> Self {
        let mut spec = Self::base(SkillKind::Spell);
        spec.cast = cast;
        spec.recast = recast;
        spec
    }

    pub const fn weaponskill(recast: Millis) -> Self {
        let mut spec = Self::base(SkillKind::Weaponskill);
        spec.recast = recast;
        spec
    }

    pub fn ability(cooldown: R) -> Self {
        let mut spec = Self::base(SkillKind::Ability);
        spec.cooldown = Some(cooldown);
        spec
    }

    pub const fn limit_break(lock: Millis) -> Self {
        let mut spec = Self::base(SkillKind::LimitBreak);
        spec.animation_lock = Some(lock);
        spec
    }

    pub const fn potency(mut self, potency: PotencySpec) -> Self {
        self.potency = Some(potency);
        self
    }

    pub fn cooldown(mut self, cooldown: R) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    pub const fn lock(mut self, lock: Millis) -> Self {
        self.animation_lock = Some(lock);
        self
    }

    pub const fn delay(mut self, delay: Millis) -> Self {
        self.application_delay = delay;
        self
    }

    pub const fn requires(mut self, requires: &'static [Requirement<R>]) -> Self {
        self.requires = requires;
        self
    }

    pub const fn costs(mut self, costs: &'static [(R, u32)]) -> Self {
        self.costs = costs;
        self
    }

    pub const fn effects(mut self, effects: &'static [Effect<R>]) -> Self {
        self.effects = effects;
        self
    }

    pub const fn instant_with(mut self, resources: &'static [R]) -> Self {
        self.instant_with = resources;
        self
    }

    pub fn combo(mut self, marker: R) -> Self {
        self.combo = Some(marker);
        self
    }
}

/// A playable job.
pub trait Job: Send + Sync + 'static {
    type Resource: ResourceId;
    type Skill: SkillId;

    const ID: JobId;
    const SPEED_STAT: SpeedStat;

    /// Cooldown resource shared by every global-cooldown skill.
    const GCD: Self::Resource;

    /// Gauge refilled by natural mana ticks, if the job has one.
    const MANA: Option<Self::Resource> = None;

    /// Percentage haste the job always has.
    const INHERENT_HASTE: Option<u32> = None;

    const CONSISTENCY: &'static [ConsistencyRule<Self::Resource>] = &[];

    fn skill(skill: Self::Skill) -> SkillSpec<Self::Resource>;

    /// Whether natural mana ticks restore mana in this state.
    fn regenerates_mana(_store: &ResourceStore<Self::Resource>) -> bool {
        true
    }
}
