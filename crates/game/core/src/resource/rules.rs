//! Cross-resource constraints checked against starting overrides.

use super::{ResourceId, ResourceStore};
use crate::error::ConsistencyError;

/// A constraint between resources that every starting state must satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsistencyRule<R: 'static> {
    /// The two resources cannot both hold stacks.
    Exclusive(R, R),
    /// `resource` can only hold stacks while one of `any_of` is active.
    RequiresAny { resource: R, any_of: &'static [R] },
    /// `resource` can only have a running timer while `gate` is active.
    TimerRequires { resource: R, gate: R },
}

impl<R: ResourceId> ConsistencyRule<R> {
    pub fn check(&self, store: &ResourceStore<R>) -> Result<(), ConsistencyError> {
        match *self {
            Self::Exclusive(first, second) => {
                if store.amount(first) > 0 && store.amount(second) > 0 {
                    return Err(ConsistencyError::Exclusive {
                        first: first.to_string(),
                        second: second.to_string(),
                    });
                }
            }
            Self::RequiresAny { resource, any_of } => {
                let satisfied = any_of.iter().any(|&other| store.is_active(other));
                if store.amount(resource) > 0 && !satisfied {
                    return Err(ConsistencyError::RequiresAny {
                        resource: resource.to_string(),
                        required: any_of
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", "),
                    });
                }
            }
            Self::TimerRequires { resource, gate } => {
                if store.timer(resource).is_positive() && !store.is_active(gate) {
                    return Err(ConsistencyError::TimerWithoutGate {
                        resource: resource.to_string(),
                        gate: gate.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
