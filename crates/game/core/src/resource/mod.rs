//! Job resources: gauges, buffs, stack timers, cooldowns.
//!
//! Each job declares its resources as a fieldless enum implementing
//! [`ResourceId`]; the static [`ResourceDescriptor`] table tells the
//! [`ResourceStore`] how each one behaves over time.

mod overrides;
mod rules;
mod store;

pub use overrides::{ResourceOverride, ResourceOverrideData, resolve_overrides};
pub use rules::ConsistencyRule;
pub use store::ResourceStore;

use core::fmt;
use core::hash::Hash;
use core::str::FromStr;

use crate::time::Millis;

/// Identifier of one job resource.
///
/// Implemented by plain enums; `ALL` lists every variant and fixes the store
/// layout and digest order.
pub trait ResourceId:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + FromStr + Send + Sync + 'static
{
    const ALL: &'static [Self];

    fn descriptor(self) -> ResourceDescriptor<Self>;

    /// Position of this resource within [`ResourceId::ALL`].
    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|candidate| *candidate == self)
            .unwrap_or_default()
    }
}

/// What happens when a timed resource's timer runs out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expiry {
    /// All stacks are lost.
    Drop,
    /// One stack is gained and the timer restarts.
    Accrue,
}

/// Behaviour class of a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    /// Plain counter, no timer.
    Gauge,
    /// Timed effect; re-applying it while active is an overwrite.
    Buff,
    /// Stacks governed by a single timer.
    StackTimer(Expiry),
    /// Charges recovered over time. The timer counts down to full charges.
    Cooldown,
    /// Computed from other resources, never set directly.
    Derived,
}

impl ResourceKind {
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::Buff | Self::StackTimer(_))
    }

    pub const fn drops_on_expiry(self) -> bool {
        matches!(self, Self::Buff | Self::StackTimer(Expiry::Drop))
    }
}

/// Static description of one resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceDescriptor<R: 'static> {
    pub kind: ResourceKind,
    /// Maximum stacks, gauge value or charges.
    pub max: u32,
    pub default_amount: u32,
    /// Buff or stack lifetime, accrual interval, or recast per charge.
    pub duration: Option<Millis>,
    /// An accruing timer only runs while this resource is active.
    pub gated_by: Option<R>,
    pub derived_from: &'static [R],
    /// Percentage added to potency while active.
    pub potency_bonus: Option<u32>,
    pub warn_on_timeout: bool,
}

impl<R: 'static> ResourceDescriptor<R> {
    const fn base(kind: ResourceKind, max: u32, duration: Option<Millis>) -> Self {
        Self {
            kind,
            max,
            default_amount: 0,
            duration,
            gated_by: None,
            derived_from: &[],
            potency_bonus: None,
            warn_on_timeout: false,
        }
    }

    pub const fn gauge(max: u32) -> Self {
        Self::base(ResourceKind::Gauge, max, None)
    }

    pub const fn buff(duration: Millis) -> Self {
        Self::base(ResourceKind::Buff, 1, Some(duration))
    }

    pub const fn stack_timer(max: u32, duration: Millis) -> Self {
        Self::base(ResourceKind::StackTimer(Expiry::Drop), max, Some(duration))
    }

    pub const fn accruing(max: u32, interval: Millis) -> Self {
        Self::base(ResourceKind::StackTimer(Expiry::Accrue), max, Some(interval))
    }

    pub const fn cooldown(charges: u32, per_charge: Millis) -> Self {
        Self::base(ResourceKind::Cooldown, charges, Some(per_charge))
    }

    pub const fn derived(from: &'static [R]) -> Self {
        let mut descriptor = Self::base(ResourceKind::Derived, 1, None);
        descriptor.derived_from = from;
        descriptor
    }

    pub const fn with_default(mut self, amount: u32) -> Self {
        self.default_amount = amount;
        self
    }

    pub fn gated_by(mut self, gate: R) -> Self {
        self.gated_by = Some(gate);
        self
    }

    pub const fn with_potency_bonus(mut self, percent: u32) -> Self {
        self.potency_bonus = Some(percent);
        self
    }

    pub const fn warn_on_timeout(mut self) -> Self {
        self.warn_on_timeout = true;
        self
    }

    /// Longest timer an override may specify.
    pub const fn max_timer(&self) -> Millis {
        match (self.kind, self.duration) {
            (ResourceKind::Cooldown, Some(per_charge)) => Millis(per_charge.0 * self.max as i64),
            (_, Some(duration)) => duration,
            (_, None) => Millis::ZERO,
        }
    }
}

/// Current value of one resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceValue {
    pub amount: u32,
    /// Remaining lifetime, time to next accrual, or time to full charges.
    pub timer: Millis,
    /// Present-but-suppressed effects keep ticking with `enabled == false`.
    pub enabled: bool,
}
