//! Speed, recast and tax arithmetic.
//!
//! Every function here is pure. Inputs that fall outside the supported domain
//! (speed below the level floor, non-positive frame rates, unsupported
//! levels) produce `None`, which callers render as "n/a".
//!
//! All rounding happens on integer centiseconds or milliseconds, mirroring
//! the game's own truncation steps so that results agree to the millisecond.

use crate::config::TaxModel;
use crate::time::Millis;

/// Lowest speed substat the recast formula is defined for.
pub const MIN_SPEED_SUBSTAT: u32 = 400;

/// Minimum delay an action loses to frame alignment, before rounding up to a
/// whole frame.
pub const MIN_FPS_TAX: Millis = Millis(10);

/// Fixed server-side tax added to every hard cast under the frame-rate model.
pub const CASTER_TAX: Millis = Millis(100);

/// Interval between natural mana ticks.
pub const MANA_TICK_INTERVAL: Millis = Millis(3_000);

/// Base recasts listed by [`gcd_preview`].
pub const PREVIEW_RECASTS: [Millis; 4] = [Millis(2_500), Millis(3_000), Millis(3_500), Millis(4_000)];

/// Level brackets with distinct substat tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub enum LevelSync {
    Lvl70,
    Lvl80,
    Lvl90,
    #[default]
    Lvl100,
}

impl LevelSync {
    pub const fn from_level(level: u32) -> Option<Self> {
        match level {
            70 => Some(Self::Lvl70),
            80 => Some(Self::Lvl80),
            90 => Some(Self::Lvl90),
            100 => Some(Self::Lvl100),
            _ => None,
        }
    }

    pub const fn level(self) -> u32 {
        match self {
            Self::Lvl70 => 70,
            Self::Lvl80 => 80,
            Self::Lvl90 => 90,
            Self::Lvl100 => 100,
        }
    }

    /// Baseline value of a secondary substat at this level.
    pub const fn substat_base(self) -> u32 {
        match self {
            Self::Lvl70 => 364,
            Self::Lvl80 => 380,
            Self::Lvl90 => 400,
            Self::Lvl100 => 420,
        }
    }

    /// Level modifier used as the divisor in substat formulas.
    pub const fn level_div(self) -> u32 {
        match self {
            Self::Lvl70 => 900,
            Self::Lvl80 => 1300,
            Self::Lvl90 => 1900,
            Self::Lvl100 => 2780,
        }
    }
}

impl TryFrom<u32> for LevelSync {
    type Error = crate::error::ConfigError;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        Self::from_level(level).ok_or(crate::error::ConfigError::UnsupportedLevel(level))
    }
}

impl From<LevelSync> for u32 {
    fn from(level: LevelSync) -> Self {
        level.level()
    }
}

impl core::fmt::Display for LevelSync {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Integer division rounding toward positive infinity, for either sign.
fn div_ceil_signed(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator.div_euclid(denominator);
    if numerator.rem_euclid(denominator) == 0 {
        quotient
    } else {
        quotient + 1
    }
}

/// Recast or cast time after speed and haste, before any frame tax.
///
/// `haste` is a percentage reduction (e.g. `Some(10)` for 10%). Faster speed
/// never produces a longer result.
///
/// Returns `None` when `speed` is below [`MIN_SPEED_SUBSTAT`], when `base`
/// is not positive, or when haste would remove the whole duration.
pub fn pre_tax_gcd(level: LevelSync, speed: u32, base: Millis, haste: Option<u32>) -> Option<Millis> {
    if speed < MIN_SPEED_SUBSTAT || !base.is_positive() {
        return None;
    }
    let haste = i64::from(haste.unwrap_or(0));
    if haste >= 100 {
        return None;
    }

    let sub = i64::from(level.substat_base());
    let div = i64::from(level.level_div());
    let speed_term = div_ceil_signed(130 * (sub - i64::from(speed)), div);
    let factor = (1000 + speed_term).max(1);

    // floor(factor * base / 1000) in milliseconds, then haste in centiseconds
    let scaled_ms = factor * base.as_millis() / 1000;
    let centis = (100 - haste) * scaled_ms / 1000;
    Some(Millis(centis * 10))
}

/// Duration after alignment to whole frames at `fps`.
///
/// The result is the smallest whole number of frames covering at least
/// `duration + MIN_FPS_TAX`, rounded up to the millisecond. It never decreases
/// as `duration` grows.
///
/// Returns `None` when `fps` is not a positive finite number.
pub fn after_fps_tax(fps: f64, duration: Millis) -> Option<Millis> {
    if !fps.is_finite() || fps <= 0.0 {
        return None;
    }
    let target = (duration.non_negative() + MIN_FPS_TAX).as_secs_f64();
    let frames = (target * fps - 1e-9).ceil();
    let aligned_ms = (frames / fps * 1000.0 - 1e-6).ceil();
    Some(Millis(aligned_ms as i64))
}

/// Animation lock of a hard cast lasting `cast`.
///
/// The frame-rate model adds [`CASTER_TAX`] and aligns the sum to whole
/// frames; the legacy model adds its stored tax verbatim.
pub fn cast_lock(model: TaxModel, fps: f64, cast: Millis) -> Option<Millis> {
    match model {
        TaxModel::FpsTax => after_fps_tax(fps, cast + CASTER_TAX),
        TaxModel::Legacy { caster_tax } => Some(cast + caster_tax),
    }
}

/// Mana restored by one natural tick at the given piety.
///
/// Returns `None` if piety is below the level baseline.
pub fn mp_regen_per_tick(level: LevelSync, piety: u32) -> Option<u32> {
    let sub = level.substat_base();
    if piety < sub {
        return None;
    }
    let bonus = 150 * u64::from(piety - sub) / u64::from(level.level_div());
    u32::try_from(200 + bonus).ok()
}

/// One row of a recast preview table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GcdPreview {
    pub base: Millis,
    pub pre_tax: Option<Millis>,
    pub taxed: Option<Millis>,
}

/// Speed-adjusted and frame-taxed recasts for each of [`PREVIEW_RECASTS`].
pub fn gcd_preview(level: LevelSync, speed: u32, fps: f64, haste: Option<u32>) -> Vec<GcdPreview> {
    PREVIEW_RECASTS
        .iter()
        .map(|&base| {
            let pre_tax = pre_tax_gcd(level, speed, base, haste);
            GcdPreview {
                base,
                pre_tax,
                taxed: pre_tax.and_then(|gcd| after_fps_tax(fps, gcd)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_speed_keeps_base_recast() {
        let gcd = pre_tax_gcd(LevelSync::Lvl100, 420, Millis(2_500), None);
        assert_eq!(gcd, Some(Millis(2_500)));
    }

    #[test]
    fn floor_speed_at_level_100_is_still_two_and_a_half() {
        // 130 * 20 / 2780 rounds up to 1, which the truncation steps absorb.
        let gcd = pre_tax_gcd(LevelSync::Lvl100, MIN_SPEED_SUBSTAT, Millis(2_500), None);
        assert_eq!(gcd, Some(Millis(2_500)));
    }

    #[test]
    fn speed_below_floor_is_not_available() {
        assert_eq!(pre_tax_gcd(LevelSync::Lvl100, 399, Millis(2_500), None), None);
        assert!(
            gcd_preview(LevelSync::Lvl100, 200, 60.0, None)
                .iter()
                .all(|row| row.pre_tax.is_none() && row.taxed.is_none())
        );
    }

    #[test]
    fn known_speed_breakpoint() {
        // Level 90 with 1000 speed: ceil(130 * -600 / 1900) = -41.
        // floor(959 * 2500 / 1000) = 2397, floor(100 * 2397 / 1000) = 239cs.
        let gcd = pre_tax_gcd(LevelSync::Lvl90, 1_000, Millis(2_500), None);
        assert_eq!(gcd, Some(Millis(2_390)));
    }

    #[test]
    fn haste_shortens_recast() {
        let plain = pre_tax_gcd(LevelSync::Lvl100, 420, Millis(2_500), None).unwrap();
        let hasted = pre_tax_gcd(LevelSync::Lvl100, 420, Millis(2_500), Some(10)).unwrap();
        assert_eq!(hasted, Millis(2_250));
        assert!(hasted < plain);
        assert_eq!(pre_tax_gcd(LevelSync::Lvl100, 420, Millis(2_500), Some(100)), None);
    }

    #[test]
    fn recast_never_grows_with_speed() {
        for level in [LevelSync::Lvl70, LevelSync::Lvl80, LevelSync::Lvl90, LevelSync::Lvl100] {
            let mut previous = None;
            for speed in (MIN_SPEED_SUBSTAT..4_000).step_by(7) {
                let gcd = pre_tax_gcd(level, speed, Millis(2_500), None).unwrap();
                if let Some(prev) = previous {
                    assert!(gcd <= prev, "level {level}: {speed} gave {gcd} after {prev}");
                }
                previous = Some(gcd);
            }
        }
    }

    #[test]
    fn fps_tax_rounds_up_to_whole_frames() {
        let taxed = after_fps_tax(60.0, Millis(2_500)).unwrap();
        // 2.51s at 60fps is 150.6 frames, so 151 frames.
        assert_eq!(taxed, Millis(2_517));

        let exact = after_fps_tax(100.0, Millis(2_490)).unwrap();
        assert_eq!(exact, Millis(2_500));
    }

    #[test]
    fn fps_tax_is_bounded_by_one_frame() {
        for fps in [30.0, 59.94, 60.0, 120.0, 144.0] {
            for ms in (0..5_000).step_by(37) {
                let base = Millis(ms);
                let taxed = after_fps_tax(fps, base).unwrap();
                let frame_ms = (1000.0 / fps).ceil() as i64 + 1;
                assert!(taxed >= base + MIN_FPS_TAX, "{fps} {base}: {taxed}");
                assert!(taxed.as_millis() <= ms + MIN_FPS_TAX.as_millis() + frame_ms);
            }
        }
    }

    #[test]
    fn fps_tax_never_shrinks_with_duration() {
        let mut previous = Millis::ZERO;
        for ms in 0..3_000 {
            let taxed = after_fps_tax(59.94, Millis(ms)).unwrap();
            assert!(taxed >= previous);
            previous = taxed;
        }
    }

    #[test]
    fn fps_tax_rejects_degenerate_frame_rates() {
        assert_eq!(after_fps_tax(0.0, Millis(2_500)), None);
        assert_eq!(after_fps_tax(-30.0, Millis(2_500)), None);
        assert_eq!(after_fps_tax(f64::NAN, Millis(2_500)), None);
        assert_eq!(after_fps_tax(f64::INFINITY, Millis(2_500)), None);
    }

    #[test]
    fn mana_regen_scales_with_piety() {
        assert_eq!(mp_regen_per_tick(LevelSync::Lvl100, 420), Some(200));
        // 150 * 2780 / 2780 = 150
        assert_eq!(mp_regen_per_tick(LevelSync::Lvl100, 3_200), Some(350));
        assert_eq!(mp_regen_per_tick(LevelSync::Lvl100, 300), None);
    }

    #[test]
    fn preview_lists_each_base_recast() {
        let rows = gcd_preview(LevelSync::Lvl100, 420, 60.0, None);
        let bases: Vec<_> = rows.iter().map(|row| row.base).collect();
        assert_eq!(bases, PREVIEW_RECASTS.to_vec());
        assert_eq!(rows[0].pre_tax, Some(Millis(2_500)));
        assert_eq!(rows[0].taxed, Some(Millis(2_517)));
    }

    #[test]
    fn level_sync_parses_supported_levels_only() {
        assert_eq!(LevelSync::try_from(90), Ok(LevelSync::Lvl90));
        assert!(LevelSync::try_from(85).is_err());
    }

    #[test]
    fn cast_lock_follows_the_tax_model() {
        assert_eq!(
            cast_lock(TaxModel::FpsTax, 60.0, Millis(2_500)),
            Some(Millis(2_617))
        );
        let legacy = TaxModel::Legacy {
            caster_tax: Millis(100),
        };
        assert_eq!(cast_lock(legacy, 60.0, Millis(2_500)), Some(Millis(2_600)));
        assert_eq!(cast_lock(TaxModel::FpsTax, 0.0, Millis(2_500)), None);
    }
}
