use crate::model::{DeferredTask, DequeueReason, TaskKey};
use crate::queue_actor::{Pushed, QueueRequest, QueueStats};
use crate::services::{ServiceError, ServiceKind};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Client for the deferred-task queue actor.
///
/// A closed actor is reported as the queue being unavailable, the same as a storage outage.
#[derive(Clone)]
pub struct QueueClient {
    sender: mpsc::Sender<QueueRequest>,
}

fn unavailable<E>(_: E) -> ServiceError {
    ServiceError::Unavailable(ServiceKind::Queue)
}

impl QueueClient {
    pub fn new(sender: mpsc::Sender<QueueRequest>) -> Self {
        Self { sender }
    }

    pub async fn push(&self, task: DeferredTask) -> Result<Pushed, ServiceError> {
        debug!(?task, "push called");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueueRequest::Push { task, respond_to })
            .await
            .map_err(unavailable)?;
        response.await.map_err(unavailable)?
    }

    pub async fn peek(&self) -> Result<Option<DeferredTask>, ServiceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueueRequest::Peek { respond_to })
            .await
            .map_err(unavailable)?;
        response.await.map_err(unavailable)?
    }

    pub async fn pop(&self, key: TaskKey, reason: DequeueReason) -> Result<bool, ServiceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueueRequest::Pop {
                key,
                reason,
                respond_to,
            })
            .await
            .map_err(unavailable)?;
        response.await.map_err(unavailable)?
    }

    pub async fn len(&self) -> Result<usize, ServiceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueueRequest::Len { respond_to })
            .await
            .map_err(unavailable)?;
        response.await.map_err(unavailable)
    }

    pub async fn is_empty(&self) -> Result<bool, ServiceError> {
        Ok(self.len().await? == 0)
    }

    pub async fn stats(&self) -> Result<QueueStats, ServiceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(QueueRequest::Stats { respond_to })
            .await
            .map_err(unavailable)?;
        response.await.map_err(unavailable)
    }
}
