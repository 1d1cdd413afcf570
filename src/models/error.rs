//! Engine error taxonomy. Errors are surfaced unchanged to the caller; the
//! engine never retries on its own.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the result engine and its store.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EngineError {
    /// A transition was attempted from a status that does not permit it.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// A result value is not permitted by the competition configuration.
    #[error("invalid result: {0}")]
    InvalidResult(String),
    /// An advancement or spot reference would corrupt the bracket.
    #[error("bracket integrity: {0}")]
    BracketIntegrity(String),
    /// Optimistic version check failed; the caller should retry the whole
    /// operation with fresh state.
    #[error("concurrent modification of match {0}; retry with fresh state")]
    ConcurrencyConflict(Uuid),
    /// A referenced match, ladder, tournament, competitor, or standing does
    /// not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
}
