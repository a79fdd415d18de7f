//! Session layer for the rotation simulator.
//!
//! Embeds [`rotation_core::GameState`] behind a job-agnostic [`Session`] that
//! a UI can drive with string-typed input. Modules are organized by
//! responsibility:
//! - [`intake`] turns form values into a validated [`rotation_core::GameConfig`]
//! - [`session`] dispatches intents to the engine of the configured job
//! - [`view`] flattens engine snapshots into display rows
//! - [`save`] reads and writes versioned session files
//! - [`playback`] converts wall-clock time into advance intents
pub mod error;
pub mod intake;
pub mod playback;
pub mod save;
pub mod session;
pub mod view;

pub use error::{Result, RuntimeError, SaveError};
pub use intake::{RawConfig, RawOverride};
pub use playback::{PlaybackClock, TickMode};
pub use save::{LoadWarning, SaveFile, SaveStore, SavedMarker, SavedNode};
pub use session::{Intent, Session};
pub use view::{NodeRow, ResourceRow, SessionView, SlotView, WarningRow};
