//! Deterministic proc rolls.
//!
//! A session is seeded from a user-facing token. Each timeline slot owns a
//! [`ProcRoller`] whose draw counter advances on every proc check, whatever
//! the [`ProcMode`], so forcing procs on or off never shifts later rolls.
//! Every slot starts from the same stream, so a cloned slot sees the same
//! procs as its source until the two diverge.

use sha2::{Digest, Sha256};

/// How proc checks are resolved.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProcMode {
    /// Every proc check succeeds.
    Always,
    /// Every proc check fails.
    Never,
    /// Checks succeed with their listed chance, drawn from the seeded stream.
    #[default]
    #[strum(to_string = "rng", serialize = "weighted", serialize = "random")]
    #[cfg_attr(feature = "serde", serde(alias = "weighted", alias = "random"))]
    Rng,
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// Stateless: each call derives its output from the supplied seed, which the
/// caller builds with [`compute_seed`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }

    /// Roll in `0..100`.
    pub fn roll_percent(seed: u64) -> u32 {
        Self::next_u32(seed) % 100
    }
}

/// Mixes the session seed with the draw position into a per-roll seed.
///
/// * `draw` - how many checks the stream has already made
/// * `context` - distinguishes several checks made by one action
pub fn compute_seed(game_seed: u64, draw: u64, context: u32) -> u64 {
    let mut hash = game_seed;
    hash ^= draw.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(context).wrapping_mul(0x517cc1b727220a95);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Hashes a seed token (any string, including the empty one) to a session seed.
pub fn seed_from_token(token: &str) -> u64 {
    let digest = Sha256::digest(token.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Per-slot proc stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcRoller {
    game_seed: u64,
    mode: ProcMode,
    draws: u64,
}

impl ProcRoller {
    pub fn new(game_seed: u64, mode: ProcMode) -> Self {
        Self {
            game_seed,
            mode,
            draws: 0,
        }
    }

    /// Resolves one proc check with `chance_percent` in `0..=100`.
    pub fn check(&mut self, chance_percent: u32, context: u32) -> bool {
        let seed = compute_seed(self.game_seed, self.draws, context);
        self.draws += 1;
        match self.mode {
            ProcMode::Always => true,
            ProcMode::Never => false,
            ProcMode::Rng => PcgRng::roll_percent(seed) < chance_percent,
        }
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn mode(&self) -> ProcMode {
        self.mode
    }
}
