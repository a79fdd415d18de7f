//! Potency accounting over resolved nodes.
//!
//! Potency is computed from what a node captured at its snapshot (job buffs,
//! party buffs, tincture) plus the target count. Untargetable windows are
//! looked up through [`Targetability`] at the moment damage lands.

use crate::job::{PotencyKind, SkillKind};
use crate::node::ActionNode;
use crate::time::Millis;

/// Answers whether the primary target can be hit at a given time.
pub trait Targetability {
    fn is_untargetable(&self, at: Millis) -> bool;
}

/// Display and accounting switches.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PotencyOptions {
    /// Multiplier applied while a tincture marker covers the snapshot.
    pub tincture_multiplier: f64,
    pub include_party_buffs: bool,
    /// Zero out realized damage landing inside untargetable windows.
    pub mask_untargetable: bool,
}

impl Default for PotencyOptions {
    fn default() -> Self {
        Self {
            tincture_multiplier: 1.0,
            include_party_buffs: true,
            mask_untargetable: true,
        }
    }
}

/// Potency dealt to each target after the first.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplashPotency {
    pub per_target: f64,
    pub targets: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PotencyResult {
    pub kind: PotencyKind,
    pub base: u32,
    pub multiplier: f64,
    /// Primary-target potency as if the target were always hittable.
    pub theoretical: f64,
    /// Primary-target potency after untargetable masking.
    pub realized: f64,
    pub splash: Option<SplashPotency>,
    pub limit_break: bool,
    pub untargetable: bool,
}

impl PotencyResult {
    fn splash_total(&self) -> f64 {
        self.splash
            .map_or(0.0, |splash| splash.per_target * f64::from(splash.targets))
    }

    pub fn total_theoretical(&self) -> f64 {
        self.theoretical + self.splash_total()
    }

    /// Realized total; splash is lost together with the primary target.
    pub fn total_realized(&self) -> f64 {
        if self.realized == 0.0 && self.theoretical > 0.0 {
            0.0
        } else {
            self.realized + self.splash_total()
        }
    }
}

/// Potency of one node, or `None` if it is unresolved, invalid or carries none.
pub fn resolve<S, R>(
    node: &ActionNode<S, R>,
    targets: &impl Targetability,
    options: &PotencyOptions,
) -> Option<PotencyResult> {
    if !node.is_valid() {
        return None;
    }
    let resolution = node.resolution.as_ref()?;

    if node.kind == SkillKind::LimitBreak {
        return Some(PotencyResult {
            kind: PotencyKind::Damage,
            base: node.potency.map_or(0, |spec| spec.base),
            multiplier: 1.0,
            theoretical: 0.0,
            realized: 0.0,
            splash: None,
            limit_break: true,
            untargetable: false,
        });
    }

    let spec = node.potency?;
    let mut multiplier: f64 = resolution
        .buffs
        .iter()
        .map(|(_, bonus)| 1.0 + f64::from(*bonus) / 100.0)
        .product();
    if options.include_party_buffs {
        multiplier *= resolution
            .party_buffs
            .iter()
            .map(|buff| 1.0 + f64::from(buff.bonus_percent) / 100.0)
            .product::<f64>();
    }
    if resolution.tincture {
        multiplier *= options.tincture_multiplier;
    }

    let theoretical = f64::from(spec.base) * multiplier;
    let untargetable =
        spec.kind == PotencyKind::Damage && targets.is_untargetable(resolution.applied_at);
    let realized = if untargetable && options.mask_untargetable {
        0.0
    } else {
        theoretical
    };
    // No falloff means single target.
    let splash = spec
        .falloff_percent
        .filter(|_| node.targets > 1)
        .map(|falloff| SplashPotency {
            per_target: theoretical * (1.0 - f64::from(falloff.min(100)) / 100.0),
            targets: node.targets - 1,
        });

    Some(PotencyResult {
        kind: spec.kind,
        base: spec.base,
        multiplier,
        theoretical,
        realized,
        splash,
        limit_break: false,
        untargetable,
    })
}

/// Totals over a slot's nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PotencySummary {
    pub damage_theoretical: f64,
    pub damage_realized: f64,
    pub healing: f64,
    pub limit_breaks: u32,
    /// Damage hits that landed while the target was untargetable.
    pub masked_hits: u32,
    pub counted_nodes: u32,
    pub invalid_nodes: u32,
}

/// Sums potency of nodes whose effect lands at or before `until`.
pub fn summarize<'a, S: 'a, R: 'a>(
    nodes: impl IntoIterator<Item = &'a ActionNode<S, R>>,
    targets: &impl Targetability,
    options: &PotencyOptions,
    until: Option<Millis>,
) -> PotencySummary {
    let mut summary = PotencySummary::default();
    for node in nodes {
        if let Some(resolution) = &node.resolution {
            if until.is_some_and(|until| resolution.applied_at > until) {
                continue;
            }
        }
        if !node.is_valid() {
            summary.invalid_nodes += u32::from(node.resolution.is_some());
            continue;
        }
        let Some(result) = resolve(node, targets, options) else {
            continue;
        };
        summary.counted_nodes += 1;
        if result.limit_break {
            summary.limit_breaks += 1;
            continue;
        }
        match result.kind {
            PotencyKind::Damage => {
                summary.masked_hits += u32::from(result.untargetable);
                summary.damage_theoretical += result.total_theoretical();
                summary.damage_realized += result.total_realized();
            }
            PotencyKind::Healing => summary.healing += result.total_theoretical(),
        }
    }
    summary
}
