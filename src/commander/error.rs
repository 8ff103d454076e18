//! Errors surfaced by the commander.

use crate::model::OrderId;
use crate::order_actor::OrderError;
use crate::services::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommanderError {
    /// The order was recorded but shipping could not be reached; no later stage runs.
    #[error("order {order} not placed: {source}")]
    ShippingUnavailable {
        order: OrderId,
        #[source]
        source: ServiceError,
    },

    /// The record store rejected a request, including invalid new orders.
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("commander is shutting down")]
    ShuttingDown,

    #[error("actor task failed: {0}")]
    ActorTask(String),
}
