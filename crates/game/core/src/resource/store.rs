//! Per-slot resource state.

use super::{
    ConsistencyRule, Expiry, ResourceDescriptor, ResourceId, ResourceKind, ResourceOverride,
    ResourceValue,
};
use crate::error::ConsistencyError;
use crate::time::Millis;
use crate::timeline::WarningKind;

/// Values of every resource of one job, indexed by [`ResourceId::index`].
///
/// Time only moves forward through [`ResourceStore::advance`], which stops
/// at every expiry and accrual boundary. Advancing by `a` then `b` therefore
/// yields the same state as advancing by `a + b`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceStore<R: ResourceId> {
    values: Vec<ResourceValue>,
    _marker: core::marker::PhantomData<R>,
}

impl<R: ResourceId> Default for ResourceStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ResourceId> ResourceStore<R> {
    /// Store with every resource at its declared default.
    pub fn new() -> Self {
        let values = R::ALL
            .iter()
            .map(|id| {
                let descriptor = id.descriptor();
                ResourceValue {
                    amount: descriptor.default_amount.min(descriptor.max),
                    timer: Millis::ZERO,
                    enabled: true,
                }
            })
            .collect();
        let mut store = Self {
            values,
            _marker: core::marker::PhantomData,
        };
        store.normalize();
        store
    }

    /// Default store with `overrides` applied, checked against `rules`.
    ///
    /// Rules see the overrides exactly as given (with derived resources
    /// recomputed), before accrual gates are applied.
    pub fn with_overrides(
        overrides: &[ResourceOverride<R>],
        rules: &[ConsistencyRule<R>],
    ) -> Result<Self, ConsistencyError> {
        let mut store = Self::new();
        for entry in overrides {
            store.apply_override(entry);
        }
        store.recompute_derived();
        for rule in rules {
            rule.check(&store)?;
        }
        store.normalize();
        Ok(store)
    }

    fn apply_override(&mut self, entry: &ResourceOverride<R>) {
        let descriptor = entry.resource.descriptor();
        let value = self.slot_mut(entry.resource);
        match descriptor.kind {
            ResourceKind::Cooldown => {
                value.timer = entry.timer;
            }
            ResourceKind::Derived => {}
            kind => {
                value.amount = entry.amount.min(descriptor.max);
                value.timer = entry.timer;
                value.enabled = entry.enabled;
                // A dropping effect with stacks but no timer starts fresh.
                if kind.drops_on_expiry() && value.amount > 0 && !value.timer.is_positive() {
                    value.timer = descriptor.duration.unwrap_or_default();
                }
            }
        }
    }

    fn slot_mut(&mut self, id: R) -> &mut ResourceValue {
        let index = id.index();
        &mut self.values[index]
    }

    pub fn value(&self, id: R) -> ResourceValue {
        self.values[id.index()]
    }

    pub fn amount(&self, id: R) -> u32 {
        self.value(id).amount
    }

    pub fn timer(&self, id: R) -> Millis {
        self.value(id).timer
    }

    /// Present with at least one stack and not suppressed.
    pub fn is_active(&self, id: R) -> bool {
        let value = self.value(id);
        match id.descriptor().kind {
            ResourceKind::Cooldown => self.available(id) > 0,
            _ => value.amount > 0 && value.enabled,
        }
    }

    /// Usable amount: charges for cooldowns, stacks otherwise.
    pub fn available(&self, id: R) -> u32 {
        let descriptor = id.descriptor();
        let value = self.value(id);
        match (descriptor.kind, descriptor.duration) {
            (ResourceKind::Cooldown, Some(per_charge)) if per_charge.is_positive() => {
                descriptor.max.saturating_sub(charges_missing(value.timer, per_charge))
            }
            (ResourceKind::Cooldown, _) => descriptor.max,
            _ => value.amount,
        }
    }

    /// Time until a cooldown has a charge available; zero for other kinds.
    pub fn ready_in(&self, id: R) -> Millis {
        let descriptor = id.descriptor();
        if descriptor.kind != ResourceKind::Cooldown {
            return Millis::ZERO;
        }
        let per_charge = descriptor.duration.unwrap_or_default();
        let spare = Millis(per_charge.as_millis() * i64::from(descriptor.max.saturating_sub(1)));
        (self.timer(id) - spare).non_negative()
    }

    /// Adds `amount` stacks, restarting a dropping timer.
    pub fn gain(&mut self, id: R, amount: u32) -> Option<WarningKind<R>> {
        let descriptor = id.descriptor();
        if matches!(descriptor.kind, ResourceKind::Derived | ResourceKind::Cooldown) {
            return None;
        }
        let was_active = self.is_active(id);
        let value = self.slot_mut(id);
        let wanted = value.amount.saturating_add(amount);
        value.amount = wanted.min(descriptor.max);
        value.enabled = true;
        if descriptor.kind.drops_on_expiry() && value.amount > 0 {
            value.timer = descriptor.duration.unwrap_or_default();
        }
        let warning = if descriptor.kind == ResourceKind::Buff && was_active {
            Some(WarningKind::Overwrite(id))
        } else if wanted > descriptor.max {
            Some(WarningKind::Overcap(id))
        } else {
            None
        };
        self.normalize();
        warning
    }

    /// Sets the amount exactly, clamped to the maximum.
    pub fn set(&mut self, id: R, amount: u32) -> Option<WarningKind<R>> {
        let descriptor = id.descriptor();
        if matches!(descriptor.kind, ResourceKind::Derived | ResourceKind::Cooldown) {
            return None;
        }
        let value = self.slot_mut(id);
        value.amount = amount.min(descriptor.max);
        if descriptor.kind.drops_on_expiry() {
            value.timer = if value.amount > 0 {
                descriptor.duration.unwrap_or_default()
            } else {
                Millis::ZERO
            };
            value.enabled = true;
        }
        self.normalize();
        (amount > descriptor.max).then_some(WarningKind::Overcap(id))
    }

    /// Removes `amount` stacks. Fails without changing anything if short.
    pub fn consume(&mut self, id: R, amount: u32) -> bool {
        let descriptor = id.descriptor();
        if self.amount(id) < amount {
            return false;
        }
        let value = self.slot_mut(id);
        value.amount -= amount;
        if descriptor.kind.drops_on_expiry() && value.amount == 0 {
            value.timer = Millis::ZERO;
            value.enabled = true;
        }
        self.normalize();
        true
    }

    /// Removes every stack.
    pub fn clear(&mut self, id: R) {
        let amount = self.amount(id);
        self.consume(id, amount);
    }

    /// Restarts the timer of a timed resource, granting one stack if absent.
    pub fn refresh(&mut self, id: R) -> Option<WarningKind<R>> {
        let descriptor = id.descriptor();
        if !descriptor.kind.is_timed() {
            return None;
        }
        if self.amount(id) == 0 {
            return self.gain(id, 1);
        }
        let was_active = self.is_active(id);
        let value = self.slot_mut(id);
        value.timer = descriptor.duration.unwrap_or_default();
        value.enabled = true;
        self.normalize();
        (descriptor.kind == ResourceKind::Buff && was_active).then_some(WarningKind::Overwrite(id))
    }

    /// Spends a cooldown charge; `recast` replaces the per-charge recast.
    pub fn use_charge(&mut self, id: R, recast: Option<Millis>) {
        let descriptor = id.descriptor();
        if descriptor.kind != ResourceKind::Cooldown {
            return;
        }
        let spent = recast.or(descriptor.duration).unwrap_or_default();
        let value = self.slot_mut(id);
        value.timer += spent.non_negative();
    }

    /// Suppresses or restores a present effect without touching its timer.
    pub fn set_enabled(&mut self, id: R, enabled: bool) {
        self.slot_mut(id).enabled = enabled;
        self.normalize();
    }

    /// Time until the next expiry or accrual, if any timer is running.
    pub fn next_event_in(&self) -> Option<Millis> {
        R::ALL
            .iter()
            .filter_map(|&id| {
                let value = self.value(id);
                if !value.timer.is_positive() {
                    return None;
                }
                match id.descriptor().kind {
                    ResourceKind::Buff | ResourceKind::StackTimer(Expiry::Drop)
                        if value.amount > 0 =>
                    {
                        Some(value.timer)
                    }
                    ResourceKind::StackTimer(Expiry::Accrue) => Some(value.timer),
                    _ => None,
                }
            })
            .min()
    }

    /// Moves the store forward by `dt`, collecting expiry and overcap warnings.
    pub fn advance(&mut self, dt: Millis) -> Vec<WarningKind<R>> {
        let mut warnings = Vec::new();
        let mut remaining = dt;
        while remaining.is_positive() {
            let step = match self.next_event_in() {
                Some(next) if next < remaining => next,
                _ => remaining,
            };
            self.tick(step, &mut warnings);
            remaining -= step;
        }
        warnings
    }

    fn tick(&mut self, dt: Millis, warnings: &mut Vec<WarningKind<R>>) {
        for &id in R::ALL {
            let descriptor = id.descriptor();
            let value = self.slot_mut(id);
            match descriptor.kind {
                ResourceKind::Gauge | ResourceKind::Derived => {}
                ResourceKind::Cooldown => {
                    value.timer = (value.timer - dt).non_negative();
                }
                ResourceKind::Buff | ResourceKind::StackTimer(Expiry::Drop) => {
                    if value.amount == 0 || !value.timer.is_positive() {
                        continue;
                    }
                    value.timer -= dt;
                    if !value.timer.is_positive() {
                        value.amount = 0;
                        value.timer = Millis::ZERO;
                        value.enabled = true;
                        if descriptor.warn_on_timeout {
                            warnings.push(WarningKind::Timeout(id));
                        }
                    }
                }
                ResourceKind::StackTimer(Expiry::Accrue) => {
                    if !value.timer.is_positive() {
                        continue;
                    }
                    value.timer -= dt;
                    if !value.timer.is_positive() {
                        value.timer += descriptor.duration.unwrap_or_default();
                        if value.amount >= descriptor.max {
                            warnings.push(WarningKind::Overcap(id));
                        } else {
                            value.amount += 1;
                        }
                    }
                }
            }
        }
        self.normalize();
    }

    /// Recomputes derived resources from their sources.
    fn recompute_derived(&mut self) {
        for &id in R::ALL {
            let descriptor = id.descriptor();
            if descriptor.kind != ResourceKind::Derived {
                continue;
            }
            let active = descriptor
                .derived_from
                .iter()
                .any(|&source| self.is_active(source));
            let value = self.slot_mut(id);
            value.amount = u32::from(active);
            value.enabled = true;
        }
    }

    /// Re-establishes derived values and accrual gates after a mutation.
    fn normalize(&mut self) {
        self.recompute_derived();
        for &id in R::ALL {
            let descriptor: ResourceDescriptor<R> = id.descriptor();
            if descriptor.kind != ResourceKind::StackTimer(Expiry::Accrue) {
                continue;
            }
            let running = descriptor.gated_by.is_none_or(|gate| self.is_active(gate));
            let value = self.slot_mut(id);
            if !running {
                value.timer = Millis::ZERO;
            } else if !value.timer.is_positive() {
                value.timer = descriptor.duration.unwrap_or_default();
            }
        }
    }

    /// Every resource with its current value, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (R, ResourceValue)> + '_ {
        R::ALL.iter().map(|&id| (id, self.value(id)))
    }
}

/// Charges still recharging when `timer` remains until full.
pub(super) fn charges_missing(timer: Millis, per_charge: Millis) -> u32 {
    if !timer.is_positive() {
        return 0;
    }
    let missing = (timer.as_millis() + per_charge.as_millis() - 1) / per_charge.as_millis();
    u32::try_from(missing).unwrap_or(u32::MAX)
}
