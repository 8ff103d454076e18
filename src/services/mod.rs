//! External capabilities the commander talks to.
//!
//! Each capability is one small async trait with a single `receive_request` call. The
//! commander never depends on a concrete implementation: it holds a [`Remote`] per
//! capability, which pairs the trait object with the fault list used for simulated outages.
//!
//! | Capability | Trait | Terminal failures |
//! |---|---|---|
//! | Shipping | [`ShippingService`] | item unavailable, address unshippable |
//! | Payment | [`PaymentService`] | payment details invalid |
//! | Messaging | [`MessagingService`] | none |
//! | Manual handling | [`EmployeeHandle`] | none |
//! | Queue storage | [`QueueStorage`] | none |

pub mod error;
pub mod faults;
pub mod simulated;

pub use error::*;
pub use faults::FaultInjector;

use crate::model::{DeferredTask, Notice, Order, OrderId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;

/// Identifier returned by the shipping and payment services.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier returned by the messaging service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRequest {
    pub order_id: OrderId,
    pub item: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_id: OrderId,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRequest {
    pub order_id: OrderId,
    pub notice: Notice,
}

#[async_trait]
pub trait ShippingService: Send + Sync {
    async fn receive_request(&self, request: ShippingRequest)
        -> Result<TransactionId, ServiceError>;
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn receive_request(&self, request: PaymentRequest)
        -> Result<TransactionId, ServiceError>;
}

#[async_trait]
pub trait MessagingService: Send + Sync {
    async fn receive_request(&self, request: MessageRequest) -> Result<RequestId, ServiceError>;
}

/// Store of orders that need a human to look at them.
///
/// Inserting the same order twice must be harmless.
#[async_trait]
pub trait EmployeeHandle: Send + Sync {
    async fn receive_request(&self, order: Order) -> Result<(), ServiceError>;
}

/// Durable FIFO backing the deferred-task queue.
///
/// Only the queue actor calls this, so implementations need no ordering guarantees beyond
/// FIFO for a single caller.
#[async_trait]
pub trait QueueStorage: Send + Sync {
    async fn append(&self, task: DeferredTask) -> Result<(), ServiceError>;

    async fn peek(&self) -> Result<Option<DeferredTask>, ServiceError>;

    /// Replaces the head task, used to persist its first-attempt stamp.
    async fn update_head(&self, task: DeferredTask) -> Result<(), ServiceError>;

    async fn remove_head(&self) -> Result<Option<DeferredTask>, ServiceError>;
}

/// A capability together with the faults to inject in front of it.
pub struct Remote<S: ?Sized> {
    pub service: Arc<S>,
    pub faults: FaultInjector,
}

impl<S: ?Sized> Clone for Remote<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            faults: self.faults.clone(),
        }
    }
}

impl<S: ?Sized> Remote<S> {
    pub fn new(service: Arc<S>, faults: FaultInjector) -> Self {
        Self { service, faults }
    }
}

/// Every capability the commander needs.
#[derive(Clone)]
pub struct Services {
    pub shipping: Remote<dyn ShippingService>,
    pub payment: Remote<dyn PaymentService>,
    pub messaging: Remote<dyn MessagingService>,
    pub employee_handle: Remote<dyn EmployeeHandle>,
    pub queue: Remote<dyn QueueStorage>,
}
