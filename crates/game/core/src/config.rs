//! Session configuration.
//!
//! [`GameConfig`] is the validated, typed form of everything a session needs
//! before the first action: job, level, substats, latency model and the
//! optional starting resource overrides. Parsing user input into this shape
//! is the runtime's job; this module only checks the ranges the engine
//! relies on.

use crate::error::ConfigError;
use crate::resource::ResourceOverrideData;
use crate::rng::ProcMode;
use crate::time::Millis;
use crate::timing::{LevelSync, MANA_TICK_INTERVAL};

/// Maximum number of parallel timeline slots in one session.
pub const MAX_SLOTS: usize = 4;

/// Jobs the simulator knows how to run.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum JobId {
    Caster,
    Striker,
}

/// Which speed substat shortens a job's recasts and casts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpeedStat {
    SpellSpeed,
    SkillSpeed,
}

/// Secondary stats that feed timing and regeneration.
///
/// Critical hit, direct hit and determination are carried so that saved
/// sessions round-trip; the engine itself does not read them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Substats {
    pub spell_speed: u32,
    pub skill_speed: u32,
    pub critical_hit: u32,
    pub direct_hit: u32,
    pub determination: u32,
    pub piety: u32,
}

impl Substats {
    /// Every substat at the level baseline.
    pub const fn baseline(level: LevelSync) -> Self {
        let base = level.substat_base();
        Self {
            spell_speed: base,
            skill_speed: base,
            critical_hit: base,
            direct_hit: base,
            determination: base,
            piety: base,
        }
    }

    pub const fn speed(&self, stat: SpeedStat) -> u32 {
        match stat {
            SpeedStat::SpellSpeed => self.spell_speed,
            SpeedStat::SkillSpeed => self.skill_speed,
        }
    }
}

/// How client-side latency is added to casts and animation locks.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "model", rename_all = "snake_case"))]
pub enum TaxModel {
    /// A fixed caster tax plus alignment to whole frames.
    #[default]
    FpsTax,
    /// Older saves: a flat tax added to casts, no frame alignment.
    Legacy { caster_tax: Millis },
}

/// Validated session configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    pub job: JobId,
    pub level: LevelSync,
    pub stats: Substats,
    /// Lock applied after instant actions.
    pub animation_lock: Millis,
    pub fps: f64,
    /// Added to every speed-scaled GCD recast, may be negative.
    pub gcd_correction: Millis,
    /// Offset of the first natural mana tick after the pull.
    pub time_till_first_mana_tick: Millis,
    /// Length of the pre-pull countdown; the session starts at `-countdown`.
    pub countdown: Millis,
    #[cfg_attr(feature = "serde", serde(default))]
    pub random_seed: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub proc_mode: ProcMode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tax_model: TaxModel,
    #[cfg_attr(feature = "serde", serde(default))]
    pub overrides: Vec<ResourceOverrideData>,
}

impl GameConfig {
    pub const DEFAULT_ANIMATION_LOCK: Millis = Millis(700);
    pub const DEFAULT_FPS: f64 = 60.0;
    pub const DEFAULT_COUNTDOWN: Millis = Millis(5_000);
    pub const DEFAULT_FIRST_MANA_TICK: Millis = Millis(300);
    /// Upper bound for the lock, the countdown, the GCD correction and the
    /// legacy tax.
    pub const MAX_SPAN: Millis = Millis(300_000);

    /// Baseline configuration for `job` at level 100.
    pub fn new(job: JobId) -> Self {
        let level = LevelSync::default();
        Self {
            job,
            level,
            stats: Substats::baseline(level),
            animation_lock: Self::DEFAULT_ANIMATION_LOCK,
            fps: Self::DEFAULT_FPS,
            gcd_correction: Millis::ZERO,
            time_till_first_mana_tick: Self::DEFAULT_FIRST_MANA_TICK,
            countdown: Self::DEFAULT_COUNTDOWN,
            random_seed: String::new(),
            proc_mode: ProcMode::default(),
            tax_model: TaxModel::default(),
            overrides: Vec::new(),
        }
    }

    /// First instant of the session clock.
    pub fn session_start(&self) -> Millis {
        -self.countdown
    }

    /// Checks the numeric ranges the engine depends on.
    ///
    /// Resource overrides are checked later, against the job's resource table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(invalid("fps", self.fps));
        }
        if self.stats.piety < self.level.substat_base() {
            return Err(invalid("piety", self.stats.piety));
        }
        let in_span = |value: Millis| !value.is_negative() && value <= Self::MAX_SPAN;
        if !in_span(self.animation_lock) {
            return Err(invalid("animation_lock", self.animation_lock));
        }
        if !in_span(self.countdown) {
            return Err(invalid("countdown", self.countdown));
        }
        if self.gcd_correction < -Self::MAX_SPAN || self.gcd_correction > Self::MAX_SPAN {
            return Err(invalid("gcd_correction", self.gcd_correction));
        }
        if self.time_till_first_mana_tick.is_negative()
            || self.time_till_first_mana_tick > MANA_TICK_INTERVAL
        {
            return Err(invalid(
                "time_till_first_mana_tick",
                self.time_till_first_mana_tick,
            ));
        }
        if let TaxModel::Legacy { caster_tax } = self.tax_model {
            if !in_span(caster_tax) {
                return Err(invalid("caster_tax", caster_tax));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, value: impl core::fmt::Display) -> ConfigError {
    ConfigError::InvalidField {
        field,
        value: value.to_string(),
    }
}
