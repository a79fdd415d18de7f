//! Playable job tables.
//!
//! Each job is a unit struct implementing [`rotation_core::Job`] over a
//! resource enum and a skill enum. Everything here is `const` data; the
//! engine reads it through `descriptor()` and `skill()`.

mod caster;
mod striker;

pub use caster::{Caster, CasterResource, CasterSkill};
pub use striker::{Striker, StrikerResource, StrikerSkill};
