//! Deterministic rotation simulator core.
//!
//! `rotation-core` models a combat timeline for one job: per-slot resource
//! stores, action nodes resolved against speed, latency and cooldowns, and
//! potency accounting over the result. It performs no I/O. All state
//! mutation flows through [`engine::GameState`]; jobs plug in through the
//! [`job::Job`] trait.
pub mod config;
pub mod engine;
pub mod error;
pub mod job;
pub mod node;
pub mod potency;
pub mod resource;
pub mod rng;
pub mod time;
pub mod timeline;
pub mod timing;

pub use config::{GameConfig, JobId, MAX_SLOTS, SpeedStat, Substats, TaxModel};
pub use engine::{
    ActionIntent, GameState, NodeView, ResourceView, SessionSnapshot, SlotSnapshot, SlotState,
};
pub use error::{ConfigError, ConsistencyError, EngineError, ErrorSeverity, SimError};
pub use job::{
    Effect, Job, PotencyKind, PotencySpec, Requirement, SkillId, SkillKind, SkillSpec,
};
pub use node::{ActionNode, InvalidReason, NodeFlags, NodeId, NodeStatus, Resolution};
pub use potency::{PotencyOptions, PotencyResult, PotencySummary, SplashPotency, Targetability};
pub use resource::{
    ConsistencyRule, Expiry, ResourceDescriptor, ResourceId, ResourceKind, ResourceOverride,
    ResourceOverrideData, ResourceStore, ResourceValue,
};
pub use rng::{ProcMode, ProcRoller, seed_from_token};
pub use time::Millis;
pub use timeline::{
    Marker, MarkerId, MarkerKind, PartyBuff, SlotTimeline, Timeline, WarningKind, WarningMark,
};
pub use timing::{GcdPreview, LevelSync};
