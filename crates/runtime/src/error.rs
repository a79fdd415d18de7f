//! Unified error types surfaced by the runtime API.
//!
//! Wraps engine, configuration and persistence failures so callers can
//! bubble them up with consistent context.

use thiserror::Error;

use rotation_core::{ConfigError, EngineError, ErrorSeverity, JobId, SimError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{job} has no skill named `{skill}`")]
    UnknownSkill { job: JobId, skill: String },

    #[error("time scale must be a positive number, got {0}")]
    InvalidTimeScale(f64),

    #[error(transparent)]
    Save(#[from] SaveError),
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config(err) => err.severity(),
            Self::Engine(err) => err.severity(),
            Self::UnknownSkill { .. } | Self::InvalidTimeScale(_) => ErrorSeverity::Validation,
            Self::Save(SaveError::Io(_)) => ErrorSeverity::Recoverable,
            Self::Save(_) => ErrorSeverity::Validation,
        }
    }
}

/// Errors raised while reading or writing session files.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("save version {found} is newer than supported version {current}")]
    UnsupportedVersion { found: u32, current: u32 },

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("no platform data directory available")]
    NoDataDir,
}
