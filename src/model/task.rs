use crate::model::{OrderId, Stage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Identity of a deferred task. The queue holds at most one task per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskKey {
    pub order_id: OrderId,
    pub kind: Stage,
}

/// A stage that failed and will be replayed by the queue drain loop.
///
/// The task refers to its order by ID only; the record itself stays in the order actor.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredTask {
    pub order_id: OrderId,
    pub kind: Stage,
    /// Stamped the first time the drain loop looks at the task.
    pub first_attempt_at: Option<Instant>,
}

impl DeferredTask {
    pub fn new(order_id: OrderId, kind: Stage) -> Self {
        Self {
            order_id,
            kind,
            first_attempt_at: None,
        }
    }

    pub fn key(&self) -> TaskKey {
        TaskKey {
            order_id: self.order_id,
            kind: self.kind,
        }
    }

    /// Time since the first drain attempt, zero if the task has never been looked at.
    pub fn age(&self) -> Duration {
        self.first_attempt_at
            .map(|at| at.elapsed())
            .unwrap_or_default()
    }
}

/// Why a task left the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DequeueReason {
    /// The task outlived its own timeout.
    Expired,
    /// The condition behind the task was already satisfied.
    Resolved,
}
