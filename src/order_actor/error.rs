//! Error types for the Order actor.

use crate::framework::FrameworkError;
use crate::model::PaymentState;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The order data provided is invalid.
    #[error("Order validation error: {0}")]
    InvalidOrder(String),

    /// A payment transition that the state machine never allows.
    #[error("Illegal payment transition: {from:?} -> {to:?}")]
    IllegalTransition { from: PaymentState, to: PaymentState },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),

    /// The actor answered with a result for a different action.
    #[error("Unexpected action result: {0}")]
    UnexpectedResult(String),
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(order_error) => *order_error,
                Err(other) => OrderError::ActorCommunicationError(other.to_string()),
            },
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
