//! Job content for the rotation simulator.
//!
//! Ships two jobs built on [`rotation_core::Job`]:
//! - [`Caster`]: stance-swapping spellcaster with mana, casts and Glyphs
//! - [`Striker`]: melee combo job with Fury and inherent haste
//!
//! With the `loaders` feature (on by default), [`loaders::ConfigLoader`]
//! reads session presets from TOML files.
pub mod jobs;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use jobs::{Caster, CasterResource, CasterSkill, Striker, StrikerResource, StrikerSkill};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult};
