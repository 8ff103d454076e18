//! # Deferred-Task Queue Actor
//!
//! The queue of deferred tasks has exactly one owner: this actor. It holds the
//! [`QueueStorage`] capability, an item counter kept in step with every push and pop, the set
//! of keys currently queued, and running totals. Because requests are served one at a time,
//! the counter never drifts from the storage and the size is never read from the store.
//!
//! Fault injection and retries are applied by the caller (see
//! [`Commander`](crate::commander::Commander)); the actor forwards each request to storage
//! exactly once and reports storage errors as they are.

use crate::clients::QueueClient;
use crate::model::{DeferredTask, DequeueReason, TaskKey};
use crate::services::{QueueStorage, ServiceError};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pushed {
    Enqueued { len: usize },
    /// A task with the same order and kind is already queued.
    Duplicate,
}

/// Running totals since the actor started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub enqueued: u64,
    pub expired: u64,
    pub resolved: u64,
    pub len: usize,
}

pub type QueueResponse<T> = oneshot::Sender<Result<T, ServiceError>>;

#[derive(Debug)]
pub enum QueueRequest {
    Push {
        task: DeferredTask,
        respond_to: QueueResponse<Pushed>,
    },
    /// Returns the head, stamping `first_attempt_at` on its first look.
    Peek {
        respond_to: QueueResponse<Option<DeferredTask>>,
    },
    /// Removes the head if it still matches `key`.
    Pop {
        key: TaskKey,
        reason: DequeueReason,
        respond_to: QueueResponse<bool>,
    },
    Len {
        respond_to: oneshot::Sender<usize>,
    },
    Stats {
        respond_to: oneshot::Sender<QueueStats>,
    },
}

pub struct QueueActor {
    receiver: mpsc::Receiver<QueueRequest>,
    storage: Arc<dyn QueueStorage>,
    queued: HashSet<TaskKey>,
    stats: QueueStats,
}

/// Creates a new queue actor over `storage` and its client.
pub fn new(storage: Arc<dyn QueueStorage>, buffer_size: usize) -> (QueueActor, QueueClient) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let actor = QueueActor {
        receiver,
        storage,
        queued: HashSet::new(),
        stats: QueueStats::default(),
    };
    (actor, QueueClient::new(sender))
}

impl QueueActor {
    pub async fn run(mut self) {
        info!("Queue actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                QueueRequest::Push { task, respond_to } => {
                    let _ = respond_to.send(self.push(task).await);
                }
                QueueRequest::Peek { respond_to } => {
                    let _ = respond_to.send(self.peek().await);
                }
                QueueRequest::Pop {
                    key,
                    reason,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.pop(key, reason).await);
                }
                QueueRequest::Len { respond_to } => {
                    let _ = respond_to.send(self.stats.len);
                }
                QueueRequest::Stats { respond_to } => {
                    let _ = respond_to.send(self.stats);
                }
            }
        }

        info!(len = self.stats.len, stats = ?self.stats, "Queue actor shutdown");
    }

    async fn push(&mut self, task: DeferredTask) -> Result<Pushed, ServiceError> {
        let key = task.key();
        if self.queued.contains(&key) {
            debug!(order = %key.order_id, kind = %key.kind, "Task already queued");
            return Ok(Pushed::Duplicate);
        }

        self.storage.append(task).await?;
        self.queued.insert(key);
        self.stats.len += 1;
        self.stats.enqueued += 1;
        info!(order = %key.order_id, kind = %key.kind, len = self.stats.len, "Task enqueued");
        Ok(Pushed::Enqueued {
            len: self.stats.len,
        })
    }

    async fn peek(&mut self) -> Result<Option<DeferredTask>, ServiceError> {
        if self.stats.len == 0 {
            return Ok(None);
        }

        let Some(mut head) = self.storage.peek().await? else {
            warn!(len = self.stats.len, "Storage empty but counter is not");
            return Ok(None);
        };
        if head.first_attempt_at.is_none() {
            head.first_attempt_at = Some(Instant::now());
            self.storage.update_head(head.clone()).await?;
        }
        Ok(Some(head))
    }

    async fn pop(&mut self, key: TaskKey, reason: DequeueReason) -> Result<bool, ServiceError> {
        match self.storage.peek().await? {
            Some(head) if head.key() == key => {}
            _ => return Ok(false),
        }

        self.storage.remove_head().await?;
        self.queued.remove(&key);
        self.stats.len = self.stats.len.saturating_sub(1);
        match reason {
            DequeueReason::Expired => self.stats.expired += 1,
            DequeueReason::Resolved => self.stats.resolved += 1,
        }
        info!(
            order = %key.order_id,
            kind = %key.kind,
            ?reason,
            len = self.stats.len,
            "Task dequeued"
        );
        Ok(true)
    }
}
