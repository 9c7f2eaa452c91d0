//! Domain error types

use thiserror::Error;

/// A status change that would move a state machine backwards or out of a
/// terminal state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid transition for {entity}: {from} -> {to}")]
pub struct InvalidTransition {
    pub entity: String,
    pub from: String,
    pub to: String,
}

impl InvalidTransition {
    pub fn new(
        entity: impl Into<String>,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
    ) -> Self {
        Self {
            entity: entity.into(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
