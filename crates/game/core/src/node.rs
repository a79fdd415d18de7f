//! Action nodes: one requested skill use on a slot's timeline.
//!
//! A node starts out proposed (skill and requested time only). Replay gives it
//! a [`Resolution`] and a verdict; invalid nodes keep their timings for
//! display but never change resources or the animation lock.

use core::fmt;

use bitflags::bitflags;

use crate::job::{PotencySpec, SkillKind};
use crate::time::Millis;
use crate::timeline::PartyBuff;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle position of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeStatus {
    Proposed,
    Valid,
    Invalid,
}

/// Why a node could not execute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidReason<R> {
    OnCooldown { resource: R, ready_in: Millis },
    ResourceUnavailable { resource: R, needed: u32, available: u32 },
    MissingPrerequisite { resource: R },
    BlockedBy { resource: R },
    BrokenCombo { expected: R },
}

impl<R: fmt::Display> fmt::Display for InvalidReason<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnCooldown { resource, ready_in } => {
                write!(f, "{resource} ready in {ready_in}")
            }
            Self::ResourceUnavailable {
                resource,
                needed,
                available,
            } => write!(f, "needs {needed} {resource}, has {available}"),
            Self::MissingPrerequisite { resource } => write!(f, "requires {resource}"),
            Self::BlockedBy { resource } => write!(f, "blocked by {resource}"),
            Self::BrokenCombo { expected } => write!(f, "combo broken, expected {expected}"),
        }
    }
}

/// Timings and snapshots fixed when a node is replayed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution<R> {
    /// When the skill actually starts, after lock and cooldown delays.
    pub start: Millis,
    /// Speed-scaled cast; zero for instants.
    pub cast: Millis,
    /// Global-cooldown recast charged, or zero for off-global skills.
    pub recast: Millis,
    /// How long the slot is locked out of further actions.
    pub lock: Millis,
    pub snapshot_at: Millis,
    pub applied_at: Millis,
    /// Job buffs that contribute potency, with their percentage bonus.
    pub buffs: Vec<(R, u32)>,
    pub party_buffs: Vec<PartyBuff>,
    pub tincture: bool,
    /// Resources granted by successful proc checks.
    pub procs: Vec<R>,
}

impl<R> Resolution<R> {
    pub fn lock_end(&self) -> Millis {
        self.start + self.lock
    }
}

bitflags! {
    /// Compact per-node summary for renderers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct NodeFlags: u8 {
        const VALID       = 1 << 0;
        const HARD_CAST   = 1 << 1;
        const LIMIT_BREAK = 1 << 2;
        const PROCCED     = 1 << 3;
        const SPLASH      = 1 << 4;
        const DELAYED     = 1 << 5;
    }
}

/// One skill use on a slot's timeline.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionNode<S, R> {
    pub id: NodeId,
    pub skill: S,
    pub kind: SkillKind,
    pub potency: Option<PotencySpec>,
    pub requested_at: Millis,
    pub targets: u8,
    pub wait_for_ready: bool,
    pub resolution: Option<Resolution<R>>,
    pub invalid: Vec<InvalidReason<R>>,
}

impl<S, R> ActionNode<S, R> {
    pub fn proposed(
        id: NodeId,
        skill: S,
        kind: SkillKind,
        potency: Option<PotencySpec>,
        requested_at: Millis,
    ) -> Self {
        Self {
            id,
            skill,
            kind,
            potency,
            requested_at,
            targets: 1,
            wait_for_ready: false,
            resolution: None,
            invalid: Vec::new(),
        }
    }

    pub fn status(&self) -> NodeStatus {
        match (&self.resolution, self.invalid.is_empty()) {
            (None, _) => NodeStatus::Proposed,
            (Some(_), true) => NodeStatus::Valid,
            (Some(_), false) => NodeStatus::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status() == NodeStatus::Valid
    }

    /// Start time if resolved, otherwise the requested time.
    pub fn display_time(&self) -> Millis {
        self.resolution
            .as_ref()
            .map_or(self.requested_at, |resolution| resolution.start)
    }

    pub fn flags(&self) -> NodeFlags {
        let mut flags = NodeFlags::empty();
        if self.is_valid() {
            flags |= NodeFlags::VALID;
        }
        if self.kind == SkillKind::LimitBreak {
            flags |= NodeFlags::LIMIT_BREAK;
        }
        if self.targets > 1 {
            flags |= NodeFlags::SPLASH;
        }
        if let Some(resolution) = &self.resolution {
            if resolution.cast.is_positive() {
                flags |= NodeFlags::HARD_CAST;
            }
            if !resolution.procs.is_empty() {
                flags |= NodeFlags::PROCCED;
            }
            if resolution.start > self.requested_at {
                flags |= NodeFlags::DELAYED;
            }
        }
        flags
    }
}
