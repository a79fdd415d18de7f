//! Error taxonomy for rotation-core.
//!
//! Configuration problems are reported before a session exists
//! ([`ConfigError`], [`ConsistencyError`]); structural misuse of a running
//! session is reported as [`EngineError`]. Actions that cannot execute are
//! *not* errors: they stay on the timeline as invalid nodes carrying an
//! [`InvalidReason`](crate::node::InvalidReason).

use crate::node::NodeId;
use crate::time::Millis;
use crate::timeline::MarkerId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry with a different request
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: the session cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all rotation-core errors.
pub trait SimError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for the error variant, for logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// A resource override set violates a cross-resource rule.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("{first} and {second} cannot both be active")]
    Exclusive { first: String, second: String },

    #[error("{resource} can only be set while one of [{required}] is active")]
    RequiresAny { resource: String, required: String },

    #[error("{resource} timer can only run while {gate} is active")]
    TimerWithoutGate { resource: String, gate: String },
}

impl SimError for ConsistencyError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Exclusive { .. } => "CONSISTENCY_EXCLUSIVE",
            Self::RequiresAny { .. } => "CONSISTENCY_REQUIRES_ANY",
            Self::TimerWithoutGate { .. } => "CONSISTENCY_TIMER_WITHOUT_GATE",
        }
    }
}

/// A configuration cannot start a session.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("field `{field}` has invalid value {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("unknown job `{0}`")]
    UnknownJob(String),

    #[error("unsupported level {0} (expected 70, 80, 90 or 100)")]
    UnsupportedLevel(u32),

    #[error("configuration is for {config}, but the session runs {session}")]
    JobMismatch {
        config: crate::config::JobId,
        session: crate::config::JobId,
    },

    #[error("unknown resource `{0}`")]
    UnknownResource(String),

    #[error("{0} is derived from other resources and cannot be overridden")]
    DerivedOverride(String),

    #[error("{0} is overridden more than once")]
    DuplicateOverride(String),

    #[error("{resource} amount {amount} is outside 0..={max}")]
    AmountOutOfRange {
        resource: String,
        amount: u32,
        max: u32,
    },

    #[error("{resource} timer {timer} is outside 0..={max}")]
    TimerOutOfRange {
        resource: String,
        timer: Millis,
        max: Millis,
    },

    #[error("{resource} has {charges} charge(s) at that timer, but the override says {amount}")]
    ChargesMismatch {
        resource: String,
        amount: u32,
        charges: u32,
    },

    #[error(transparent)]
    Inconsistent(#[from] ConsistencyError),
}

impl SimError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidField { .. } => "CONFIG_INVALID_FIELD",
            Self::UnknownJob(_) => "CONFIG_UNKNOWN_JOB",
            Self::UnsupportedLevel(_) => "CONFIG_UNSUPPORTED_LEVEL",
            Self::JobMismatch { .. } => "CONFIG_JOB_MISMATCH",
            Self::UnknownResource(_) => "CONFIG_UNKNOWN_RESOURCE",
            Self::DerivedOverride(_) => "CONFIG_DERIVED_OVERRIDE",
            Self::DuplicateOverride(_) => "CONFIG_DUPLICATE_OVERRIDE",
            Self::AmountOutOfRange { .. } => "CONFIG_AMOUNT_OUT_OF_RANGE",
            Self::TimerOutOfRange { .. } => "CONFIG_TIMER_OUT_OF_RANGE",
            Self::ChargesMismatch { .. } => "CONFIG_CHARGES_MISMATCH",
            Self::Inconsistent(inner) => inner.error_code(),
        }
    }
}

/// Structural misuse of a running session.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("slot {slot} does not exist (session has {count})")]
    SlotOutOfRange { slot: usize, count: usize },

    #[error("session already has the maximum of {max} slots")]
    SlotLimit { max: usize },

    #[error("the last remaining slot cannot be removed")]
    LastSlot,

    #[error("node {node} not found in slot {slot}")]
    NodeNotFound { slot: usize, node: NodeId },

    #[error("marker {0} not found")]
    MarkerNotFound(MarkerId),

    #[error("target count must be at least 1")]
    NoTargets,
}

impl SimError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SlotLimit { .. } | Self::LastSlot => ErrorSeverity::Recoverable,
            Self::SlotOutOfRange { .. }
            | Self::NodeNotFound { .. }
            | Self::MarkerNotFound(_)
            | Self::NoTargets => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SlotOutOfRange { .. } => "ENGINE_SLOT_OUT_OF_RANGE",
            Self::SlotLimit { .. } => "ENGINE_SLOT_LIMIT",
            Self::LastSlot => "ENGINE_LAST_SLOT",
            Self::NodeNotFound { .. } => "ENGINE_NODE_NOT_FOUND",
            Self::MarkerNotFound(_) => "ENGINE_MARKER_NOT_FOUND",
            Self::NoTargets => "ENGINE_NO_TARGETS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistency_errors_surface_through_config_errors() {
        let err: ConfigError = ConsistencyError::Exclusive {
            first: "fire_stance".into(),
            second: "ice_stance".into(),
        }
        .into();
        assert_eq!(err.error_code(), "CONSISTENCY_EXCLUSIVE");
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.to_string(), "fire_stance and ice_stance cannot both be active");
    }

    #[test]
    fn slot_limits_are_recoverable() {
        assert!(EngineError::SlotLimit { max: 4 }.severity().is_recoverable());
        assert!(!EngineError::NoTargets.severity().is_internal());
    }
}
