//! Configuration intake from form values.
//!
//! A UI hands over every field as the string the user typed. [`RawConfig`]
//! converts the whole object at once: the first unparsable field rejects it
//! with a single [`ConfigError`], and nothing is partially applied.
//! Durations are entered in seconds and stored as whole milliseconds.

use rand::Rng;
use serde::{Deserialize, Serialize};

use rotation_core::{
    ConfigError, GameConfig, JobId, LevelSync, Millis, ProcMode, ResourceOverrideData, Substats,
    TaxModel,
};

/// Number of digits in an auto-generated seed.
const SEED_DIGITS: u32 = 4;

/// A starting resource value as entered in the form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOverride {
    pub resource: String,
    pub amount: String,
    /// Seconds.
    pub timer: String,
    pub enabled: bool,
}

impl Default for RawOverride {
    fn default() -> Self {
        Self {
            resource: String::new(),
            amount: "0".into(),
            timer: "0".into(),
            enabled: true,
        }
    }
}

/// Session configuration exactly as typed into the form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub job: String,
    pub level: String,
    pub spell_speed: String,
    pub skill_speed: String,
    pub critical_hit: String,
    pub direct_hit: String,
    pub determination: String,
    pub piety: String,
    pub animation_lock: String,
    pub fps: String,
    pub gcd_correction: String,
    pub time_till_first_mana_tick: String,
    pub countdown: String,
    pub random_seed: String,
    pub proc_mode: String,
    pub overrides: Vec<RawOverride>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self::from_config(&GameConfig::new(JobId::Caster))
    }
}

impl RawConfig {
    /// Form values that reproduce `config`.
    ///
    /// The tax model is not a form field; legacy sessions only come from
    /// save files.
    pub fn from_config(config: &GameConfig) -> Self {
        let stats = &config.stats;
        Self {
            job: config.job.to_string(),
            level: config.level.to_string(),
            spell_speed: stats.spell_speed.to_string(),
            skill_speed: stats.skill_speed.to_string(),
            critical_hit: stats.critical_hit.to_string(),
            direct_hit: stats.direct_hit.to_string(),
            determination: stats.determination.to_string(),
            piety: stats.piety.to_string(),
            animation_lock: secs(config.animation_lock),
            fps: config.fps.to_string(),
            gcd_correction: secs(config.gcd_correction),
            time_till_first_mana_tick: secs(config.time_till_first_mana_tick),
            countdown: secs(config.countdown),
            random_seed: config.random_seed.clone(),
            proc_mode: config.proc_mode.to_string(),
            overrides: config
                .overrides
                .iter()
                .map(|entry| RawOverride {
                    resource: entry.resource.clone(),
                    amount: entry.amount.to_string(),
                    timer: secs(entry.timer),
                    enabled: entry.enabled,
                })
                .collect(),
        }
    }

    /// Parses and range-checks every field.
    ///
    /// Resource names in overrides are checked later, when the session for
    /// the job is created.
    pub fn parse(&self) -> Result<GameConfig, ConfigError> {
        let job = self
            .job
            .trim()
            .parse::<JobId>()
            .map_err(|_| ConfigError::UnknownJob(self.job.clone()))?;
        let level = LevelSync::try_from(parse_u32("level", &self.level)?)?;
        let stats = Substats {
            spell_speed: parse_u32("spell_speed", &self.spell_speed)?,
            skill_speed: parse_u32("skill_speed", &self.skill_speed)?,
            critical_hit: parse_u32("critical_hit", &self.critical_hit)?,
            direct_hit: parse_u32("direct_hit", &self.direct_hit)?,
            determination: parse_u32("determination", &self.determination)?,
            piety: parse_u32("piety", &self.piety)?,
        };
        let proc_mode = match self.proc_mode.trim() {
            "" => ProcMode::default(),
            mode => mode
                .parse::<ProcMode>()
                .map_err(|_| invalid("proc_mode", mode))?,
        };
        let overrides = self
            .overrides
            .iter()
            .map(|entry| {
                Ok(ResourceOverrideData {
                    resource: entry.resource.trim().to_string(),
                    amount: parse_u32("override.amount", &entry.amount)?,
                    timer: parse_secs("override.timer", &entry.timer)?,
                    enabled: entry.enabled,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let config = GameConfig {
            job,
            level,
            stats,
            animation_lock: parse_secs("animation_lock", &self.animation_lock)?,
            fps: parse_f64("fps", &self.fps)?,
            gcd_correction: parse_secs("gcd_correction", &self.gcd_correction)?,
            time_till_first_mana_tick: parse_secs(
                "time_till_first_mana_tick",
                &self.time_till_first_mana_tick,
            )?,
            countdown: parse_secs("countdown", &self.countdown)?,
            random_seed: self.random_seed.trim().to_string(),
            proc_mode,
            tax_model: TaxModel::FpsTax,
            overrides,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Fills an empty seed with random digits. Returns the new seed, if any.
pub fn ensure_seed(config: &mut GameConfig, rng: &mut impl Rng) -> Option<String> {
    if !config.random_seed.trim().is_empty() {
        return None;
    }
    let seed = format!(
        "{:0width$}",
        rng.gen_range(0..10u32.pow(SEED_DIGITS)),
        width = SEED_DIGITS as usize
    );
    config.random_seed = seed.clone();
    Some(seed)
}

fn secs(value: Millis) -> String {
    value.as_secs_f64().to_string()
}

fn invalid(field: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidField {
        field,
        value: value.to_string(),
    }
}

fn parse_u32(field: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| invalid(field, value))
}

fn parse_f64(field: &'static str, value: &str) -> Result<f64, ConfigError> {
    let parsed: f64 = value.trim().parse().map_err(|_| invalid(field, value))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(invalid(field, value))
    }
}

fn parse_secs(field: &'static str, value: &str) -> Result<Millis, ConfigError> {
    Millis::try_from_secs_f64(parse_f64(field, value)?).ok_or_else(|| invalid(field, value))
}
