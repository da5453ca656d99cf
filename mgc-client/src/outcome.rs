//! Results that may have been replaced by a fallback
//!
//! Rating submission and statistics must never block the caller: when the
//! backend cannot answer, they hand back a stand-in value. [`Degradable`]
//! keeps that visible in the type instead of hiding the failure.

use crate::error::ClientError;

#[derive(Debug)]
pub enum Degradable<T> {
    /// The backend answered
    Live(T),
    /// The backend failed; `fallback` stands in for its answer
    Degraded { fallback: T, cause: ClientError },
}

impl<T> Degradable<T> {
    /// Wrap `result`, substituting `fallback()` on failure
    pub fn from_result(result: Result<T, ClientError>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => Degradable::Live(value),
            Err(cause) => Degradable::Degraded {
                fallback: fallback(),
                cause,
            },
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Degradable::Live(value) => value,
            Degradable::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Degradable::Live(value) => value,
            Degradable::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Degradable::Degraded { .. })
    }

    pub fn cause(&self) -> Option<&ClientError> {
        match self {
            Degradable::Live(_) => None,
            Degradable::Degraded { cause, .. } => Some(cause),
        }
    }
}
