//! Starting-state overrides supplied with a configuration.

use std::collections::BTreeSet;

use super::store::charges_missing;
use super::{ResourceId, ResourceKind};
use crate::error::ConfigError;
use crate::time::Millis;

/// One override as written in a configuration, keyed by resource name.
///
/// For cooldowns `timer` is the time until every charge is back, and the
/// charge count follows from it. `amount` may be left at 0 or repeat that
/// count; anything else is rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceOverrideData {
    pub resource: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub amount: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub timer: Millis,
    #[cfg_attr(feature = "serde", serde(default = "enabled_by_default"))]
    pub enabled: bool,
}

#[cfg(feature = "serde")]
fn enabled_by_default() -> bool {
    true
}

impl ResourceOverrideData {
    pub fn new(resource: impl Into<String>, amount: u32, timer: Millis) -> Self {
        Self {
            resource: resource.into(),
            amount,
            timer,
            enabled: true,
        }
    }
}

/// An override resolved against a job's resource table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceOverride<R> {
    pub resource: R,
    pub amount: u32,
    pub timer: Millis,
    pub enabled: bool,
}

/// Parses names and checks each override against its descriptor's ranges.
///
/// Cross-resource rules are checked separately, when the store is built.
pub fn resolve_overrides<R: ResourceId>(
    data: &[ResourceOverrideData],
) -> Result<Vec<ResourceOverride<R>>, ConfigError> {
    let mut seen = BTreeSet::new();
    data.iter()
        .map(|entry| {
            let resource: R = entry
                .resource
                .parse()
                .map_err(|_| ConfigError::UnknownResource(entry.resource.clone()))?;
            if !seen.insert(resource) {
                return Err(ConfigError::DuplicateOverride(resource.to_string()));
            }

            let descriptor = resource.descriptor();
            if descriptor.kind == ResourceKind::Derived {
                return Err(ConfigError::DerivedOverride(resource.to_string()));
            }
            if descriptor.kind != ResourceKind::Cooldown && entry.amount > descriptor.max {
                return Err(ConfigError::AmountOutOfRange {
                    resource: resource.to_string(),
                    amount: entry.amount,
                    max: descriptor.max,
                });
            }
            let max_timer = descriptor.max_timer();
            if entry.timer.is_negative() || entry.timer > max_timer {
                return Err(ConfigError::TimerOutOfRange {
                    resource: resource.to_string(),
                    timer: entry.timer,
                    max: max_timer,
                });
            }

            if descriptor.kind == ResourceKind::Cooldown && entry.amount != 0 {
                let charges = match descriptor.duration {
                    Some(per_charge) if per_charge.is_positive() => descriptor
                        .max
                        .saturating_sub(charges_missing(entry.timer, per_charge)),
                    _ => descriptor.max,
                };
                if entry.amount != charges {
                    return Err(ConfigError::ChargesMismatch {
                        resource: resource.to_string(),
                        amount: entry.amount,
                        charges,
                    });
                }
            }

            Ok(ResourceOverride {
                resource,
                amount: entry.amount,
                timer: entry.timer,
                enabled: entry.enabled,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::store::tests::TestRes;

    #[test]
    fn resolves_names_and_ranges() {
        let resolved = resolve_overrides::<TestRes>(&[
            ResourceOverrideData::new("fire", 3, Millis(12_000)),
            ResourceOverrideData::new("dash", 0, Millis(60_000)),
        ])
        .unwrap();
        assert_eq!(resolved[0].resource, TestRes::Fire);
        assert_eq!(resolved[1].timer, Millis(60_000));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let too_many = resolve_overrides::<TestRes>(&[ResourceOverrideData::new(
            "fire",
            4,
            Millis::ZERO,
        )]);
        assert!(matches!(too_many, Err(ConfigError::AmountOutOfRange { max: 3, .. })));

        let long_cooldown = resolve_overrides::<TestRes>(&[ResourceOverrideData::new(
            "dash",
            0,
            Millis(60_001),
        )]);
        assert!(matches!(long_cooldown, Err(ConfigError::TimerOutOfRange { .. })));

        let gauge_timer = resolve_overrides::<TestRes>(&[ResourceOverrideData::new(
            "mana",
            100,
            Millis(1),
        )]);
        assert!(matches!(gauge_timer, Err(ConfigError::TimerOutOfRange { .. })));
    }

    #[test]
    fn cooldown_amount_must_agree_with_the_timer() {
        let full = resolve_overrides::<TestRes>(&[ResourceOverrideData::new(
            "dash",
            2,
            Millis::ZERO,
        )]);
        assert!(full.is_ok());
        let one_left = resolve_overrides::<TestRes>(&[ResourceOverrideData::new(
            "dash",
            1,
            Millis(20_000),
        )]);
        assert!(one_left.is_ok());

        let mismatch = resolve_overrides::<TestRes>(&[ResourceOverrideData::new(
            "dash",
            2,
            Millis(45_000),
        )]);
        assert_eq!(
            mismatch,
            Err(ConfigError::ChargesMismatch {
                resource: "dash".into(),
                amount: 2,
                charges: 0,
            })
        );
    }

    #[test]
    fn rejects_unknown_derived_and_duplicate_entries() {
        assert_eq!(
            resolve_overrides::<TestRes>(&[ResourceOverrideData::new("lightning", 1, Millis::ZERO)]),
            Err(ConfigError::UnknownResource("lightning".into()))
        );
        assert_eq!(
            resolve_overrides::<TestRes>(&[ResourceOverrideData::new("attuned", 1, Millis::ZERO)]),
            Err(ConfigError::DerivedOverride("attuned".into()))
        );
        assert_eq!(
            resolve_overrides::<TestRes>(&[
                ResourceOverrideData::new("mana", 1, Millis::ZERO),
                ResourceOverrideData::new("mana", 2, Millis::ZERO),
            ]),
            Err(ConfigError::DuplicateOverride("mana".into()))
        );
    }
}
