//! Engine error taxonomy.
//!
//! Only programmer-visible failures are Rust errors. A cancel that matches
//! no open order is a domain outcome, reported as an
//! [`OrderCancelReject`](crate::execution::OrderCancelReject) response.

use thiserror::Error;

/// Errors returned by the engine without mutating its state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Inbound order failed validation (zero quantity, limit without a
    /// positive price).
    #[error("invalid order: {0}")]
    InvalidOrder(String),
    /// An internal precondition was violated, e.g. over-filling a working
    /// order. Indicates a bug in the caller or the engine.
    #[error("invalid order state: {0}")]
    InvalidState(String),
}
