//! Deferred tasks: writing them and the loop that replays them.

use super::{Commander, CommanderError};
use crate::model::{DeferredTask, DequeueReason, Notice, OrderId, PaymentState, Stage};
use crate::queue_actor::Pushed;
use std::sync::atomic::Ordering;
use tracing::{debug, error, info, info_span, warn, Instrument};

impl Commander {
    /// Queues a replay of `kind` for `id`, unless the order no longer needs it or the queue
    /// window since order creation has closed.
    ///
    /// If the write itself fails, a payment task abandons the payment and every kind is
    /// escalated.
    pub async fn update_queue(&self, id: OrderId, kind: Stage) -> Result<(), CommanderError> {
        let order = self.orders.snapshot(id).await?;
        if order.age() >= self.config.queue_time() {
            warn!(%kind, "Queue window closed, task not queued");
            return Ok(());
        }
        if !order.is_pending(kind) {
            debug!(%kind, "Task already done, not queued");
            return Ok(());
        }

        let queue = &self.queue;
        let task = DeferredTask::new(id, kind);
        let pushed = self
            .retry
            .perform(
                &self.services.queue.faults,
                move || queue.push(task.clone()),
                |e| async move {
                    error!(%kind, error = %e, "Unable to queue task");
                    if let Err(e) = self.queue_write_failed(id, kind).await {
                        error!(error = %e, "Fallback for failed queue write failed");
                    }
                },
            )
            .await;

        match pushed {
            Some(Pushed::Enqueued { len }) => {
                info!(%kind, len, "Task queued");
                self.drain_queue();
            }
            Some(Pushed::Duplicate) => debug!(%kind, "Task already queued"),
            None => {}
        }
        Ok(())
    }

    async fn queue_write_failed(&self, id: OrderId, kind: Stage) -> Result<(), CommanderError> {
        if kind == Stage::Payment
            && self
                .orders
                .settle_payment(id, PaymentState::NotDone, None)
                .await?
        {
            warn!("Payment task could not be queued, payment failed");
            self.dispatch(id, Stage::Message(Notice::PaymentFailed));
        }
        self.dispatch(id, Stage::Escalation);
        Ok(())
    }

    /// Starts the drain loop unless it is already running.
    pub fn drain_queue(&self) {
        if self.is_closed() {
            return;
        }
        if self
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        let this = self.clone();
        tokio::spawn(async move { this.drain().await }.instrument(info_span!("drain")));
    }

    async fn drain(self) {
        info!("Drain loop started");
        loop {
            self.drain_until_empty().await;
            self.draining.store(false, Ordering::SeqCst);

            // A push can land between the last empty peek and clearing the flag.
            let refill = !self.is_closed() && matches!(self.queue.is_empty().await, Ok(false));
            if refill
                && self
                    .draining
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
            {
                continue;
            }
            break;
        }
        info!("Drain loop idle");
    }

    async fn drain_until_empty(&self) {
        let queue = &self.queue;
        loop {
            if self.is_closed() {
                return;
            }

            let head = match self
                .retry
                .run(&self.services.queue.faults, move || queue.peek())
                .await
            {
                Ok(Some(head)) => head,
                Ok(None) => return,
                Err(e) => {
                    error!(error = %e, "Unable to read queue");
                    return;
                }
            };
            self.process_head(head).await;

            if self.is_closed() {
                return;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.config.drain_interval()) => {}
                _ = self.closed.notified() => return,
            }
        }
    }

    async fn process_head(&self, task: DeferredTask) {
        let key = task.key();
        let span = info_span!("task", order = %task.order_id, kind = %task.kind);

        async {
            let reason = if task.age() > self.config.queue_task_time() {
                DequeueReason::Expired
            } else {
                match self.orders.get(task.order_id).await {
                    Ok(Some(order)) if order.is_pending(task.kind) => {
                        debug!("Replaying task");
                        self.dispatch(task.order_id, task.kind);
                        return;
                    }
                    Ok(_) => DequeueReason::Resolved,
                    Err(e) => {
                        error!(error = %e, "Unable to read order");
                        return;
                    }
                }
            };

            let queue = &self.queue;
            match self
                .retry
                .run(&self.services.queue.faults, move || queue.pop(key, reason))
                .await
            {
                Ok(true) => {}
                Ok(false) => debug!("Head changed before removal"),
                Err(e) => error!(error = %e, "Unable to remove task"),
            }
        }
        .instrument(span)
        .await
    }
}
