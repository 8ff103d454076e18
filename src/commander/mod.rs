//! # The Commander
//!
//! Drives an order across shipping, payment, customer messaging and manual escalation without
//! a central transaction. Each stage follows the same shape:
//!
//! 1. **Guard** - skip if the record says the stage has nothing left to do
//! 2. **Deadline** - skip (or give up) once the stage's window since order creation has passed
//! 3. **Call** - the capability, wrapped in the [`Retry`] executor
//! 4. **Commit** - one atomic transition on the order record
//! 5. **Fallback** - on failure, convert the error into a state change, a customer notice,
//!    a deferred task and/or an escalation
//!
//! Shipping runs on the caller's path. Every later stage runs as its own Tokio task and is
//! never awaited by the stage that triggered it; the drain loop over the deferred-task queue
//! replays failed stages until they succeed or expire.
//!
//! ```text
//! place_order ──► shipping ──► payment ──► message(success | failure)
//!                    │            │  └──► message(trying) + enqueue(payment)
//!                    │            └─────► message(failure)        (cash on delivery)
//!                    └──► escalation                               (item / address)
//!
//! message failure ──► enqueue(message) + escalation
//! escalation failure ──► enqueue(escalation)
//! ```
//!
//! Ordering between concurrently running stages is not guaranteed. Correctness comes from the
//! record's transitions: a stage claims its work with [`Gate`] before calling out, and every
//! commit is refused once the record has moved past it.

mod error;
mod escalation;
mod messaging;
mod payment;
mod queue;
mod shipping;

pub use error::CommanderError;

use crate::clients::{OrderClient, QueueClient};
use crate::config::CommanderConfig;
use crate::model::{Order, OrderCreate, OrderId, SiteNotice, Stage};
use crate::order_actor::Gate;
use crate::retry::Retry;
use crate::services::Services;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, error, info, info_span, Instrument, Span};

/// Cheap to clone; every spawned stage task carries its own copy.
#[derive(Clone)]
pub struct Commander {
    orders: OrderClient,
    queue: QueueClient,
    services: Services,
    retry: Retry,
    config: Arc<CommanderConfig>,
    draining: Arc<AtomicBool>,
    closing: Arc<AtomicBool>,
    closed: Arc<Notify>,
}

impl Commander {
    pub fn new(
        orders: OrderClient,
        queue: QueueClient,
        services: Services,
        config: CommanderConfig,
    ) -> Self {
        let retry = Retry::new(config.retry.attempts, config.retry_delay());
        Self {
            orders,
            queue,
            services,
            retry,
            config: Arc::new(config),
            draining: Arc::new(AtomicBool::new(false)),
            closing: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(Notify::new()),
        }
    }

    pub fn orders(&self) -> &OrderClient {
        &self.orders
    }

    pub fn queue(&self) -> &QueueClient {
        &self.queue
    }

    pub fn config(&self) -> &CommanderConfig {
        &self.config
    }

    /// Current snapshot of an order record.
    pub async fn order(&self, id: OrderId) -> Result<Order, CommanderError> {
        Ok(self.orders.snapshot(id).await?)
    }

    /// Records the order and ships it.
    ///
    /// Returns once shipping has been decided. Payment and messaging continue in the
    /// background. The only error after the record exists is
    /// [`CommanderError::ShippingUnavailable`]; an unshippable item or address is
    /// escalated and still returns the order ID.
    pub async fn place_order(&self, params: OrderCreate) -> Result<OrderId, CommanderError> {
        if self.is_closed() {
            return Err(CommanderError::ShuttingDown);
        }
        let id = self.orders.create_order(params).await?;
        self.ship(id)
            .instrument(info_span!("place_order", order = %id))
            .await?;
        Ok(id)
    }

    /// Runs one deferrable stage for an order and waits for it.
    ///
    /// The drain loop replays queued tasks through this. Re-running a stage the record has
    /// already moved past makes no capability call.
    pub async fn run_stage(&self, id: OrderId, stage: Stage) -> Result<(), CommanderError> {
        match stage {
            Stage::Payment => self.pay(id).await,
            Stage::Message(notice) => self.send_message(id, notice).await,
            Stage::Escalation => self.escalate(id).await,
        }
    }

    /// Stops spawning stage tasks and ends the drain loop at its next pause.
    pub fn close(&self) {
        self.closing.store(true, Ordering::SeqCst);
        self.closed.notify_waiters();
        info!("Commander closing");
    }

    pub fn is_closed(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// Starts `stage` for `id` as its own task.
    fn dispatch(&self, id: OrderId, stage: Stage) {
        let this = self.clone();
        self.spawn_task(
            info_span!("stage", order = %id, %stage),
            async move { this.run_stage(id, stage).await },
        );
    }

    /// Writes a deferred task for `kind` as its own task.
    fn dispatch_enqueue(&self, id: OrderId, kind: Stage) {
        let this = self.clone();
        self.spawn_task(
            info_span!("enqueue", order = %id, %kind),
            async move { this.update_queue(id, kind).await },
        );
    }

    fn spawn_task<F>(&self, span: Span, task: F)
    where
        F: Future<Output = Result<(), CommanderError>> + Send + 'static,
    {
        if self.is_closed() {
            debug!("Commander closed, task dropped");
            return;
        }
        tokio::spawn(
            async move {
                if let Err(e) = task.await {
                    error!(error = %e, "Task failed");
                }
            }
            .instrument(span),
        );
    }

    /// Claims `stage` on the record. `false` means another task owns it or nothing is left.
    async fn claim(&self, id: OrderId, stage: Stage) -> Result<bool, CommanderError> {
        match self.orders.begin(id, stage).await? {
            Gate::Open => Ok(true),
            Gate::Settled => {
                debug!(%stage, "Already done");
                Ok(false)
            }
            Gate::InFlight => {
                debug!(%stage, "Already running");
                Ok(false)
            }
        }
    }

    async fn show_site_notice(
        &self,
        id: OrderId,
        notice: SiteNotice,
    ) -> Result<(), CommanderError> {
        if self.orders.show_site_notice(id, notice).await? {
            info!(order = %id, %notice, "Site notice");
        } else {
            debug!(order = %id, %notice, "Site notice not shown, one already present");
        }
        Ok(())
    }
}
