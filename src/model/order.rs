use crate::model::{MessageState, Notice, PaymentState, SiteNotice, Stage};
use crate::services::TransactionId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;
use std::time::Duration;
use tokio::time::Instant;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// The customer placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub address: String,
}

impl User {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Payload for placing a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub user: User,
    pub item: String,
    pub price: f64,
}

/// Represents one customer order as it moves through shipping, payment and messaging.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](crate::framework::ResourceActor).
/// See [`crate::order_actor`] for the transitions it accepts.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user: User,
    pub item: String,
    pub price: f64,
    pub created_at: Instant,
    pub payment: PaymentState,
    pub message: MessageState,
    pub escalated: bool,
    pub shipping_transaction: Option<TransactionId>,
    pub payment_transaction: Option<TransactionId>,
    pub site_notice: Option<SiteNotice>,
    /// Stages currently claimed by a running task.
    pub(crate) in_flight: HashSet<Stage>,
}

impl Order {
    /// Creates a fresh order. Payment starts in `Trying` and no message has been sent.
    pub fn new(id: OrderId, user: User, item: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            user,
            item: item.into(),
            price,
            created_at: Instant::now(),
            payment: PaymentState::Trying,
            message: MessageState::NoneSent,
            escalated: false,
            shipping_transaction: None,
            payment_transaction: None,
            site_notice: None,
            in_flight: HashSet::new(),
        }
    }

    /// Time since the order was created; every stage deadline is measured against it.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Whether `stage` still has work to do for this order.
    ///
    /// This is the idempotency guard shared by the stages, the enqueue path and the drain
    /// loop:
    /// - payment runs while the payment is still `Trying`
    /// - the trying notice goes out only while payment is `Trying` and nothing was sent yet
    /// - a terminal notice goes out until either terminal notice has been delivered
    /// - escalation happens at most once
    pub fn is_pending(&self, stage: Stage) -> bool {
        match stage {
            Stage::Payment => self.payment == PaymentState::Trying,
            Stage::Message(Notice::PaymentTrying) => {
                self.payment == PaymentState::Trying && self.message == MessageState::NoneSent
            }
            Stage::Message(_) => !self.message.is_terminal(),
            Stage::Escalation => !self.escalated,
        }
    }

    pub fn is_in_flight(&self, stage: Stage) -> bool {
        self.in_flight.contains(&stage)
    }
}
