//! # In-Memory Capabilities
//!
//! Simulated implementations of every capability. They always succeed and record each
//! request they receive; outages are simulated with the [`FaultInjector`] the commander
//! consults before each attempt.
//!
//! | | Simulated | Real service |
//! |---|---|---|
//! | **Speed** | Instant | Network bound |
//! | **Determinism** | Faults fire in the order they were queued | Whatever the network does |
//! | **Inspection** | `received()` / `call_count()` | Service logs |
//!
//! ```rust,ignore
//! let sim = SimulatedServices::new();
//! sim.payment_faults.push(ServiceError::PaymentDetailsInvalid).await;
//!
//! let system = CommanderSystem::start(config, sim.services())?;
//! // ...
//! assert_eq!(sim.payment.call_count().await, 0);
//! ```

use super::{
    EmployeeHandle, FaultInjector, MessageRequest, MessagingService, PaymentRequest,
    PaymentService, QueueStorage, Remote, RequestId, ServiceError, Services, ShippingRequest,
    ShippingService, TransactionId,
};
use crate::model::{DeferredTask, Notice, Order, OrderId};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A capability that accepts every request of type `R` and remembers it.
pub struct SimulatedService<R> {
    prefix: &'static str,
    next_id: AtomicU64,
    received: Mutex<Vec<R>>,
}

impl<R: Clone + Send> SimulatedService<R> {
    /// `prefix` is used for the identifiers handed back, e.g. `ship_1`.
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next_id: AtomicU64::new(1),
            received: Mutex::new(Vec::new()),
        }
    }

    async fn record(&self, request: R) -> String {
        self.received.lock().await.push(request);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", self.prefix, id)
    }

    pub async fn received(&self) -> Vec<R> {
        self.received.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.received.lock().await.len()
    }
}

#[async_trait]
impl ShippingService for SimulatedService<ShippingRequest> {
    async fn receive_request(
        &self,
        request: ShippingRequest,
    ) -> Result<TransactionId, ServiceError> {
        Ok(TransactionId(self.record(request).await))
    }
}

#[async_trait]
impl PaymentService for SimulatedService<PaymentRequest> {
    async fn receive_request(
        &self,
        request: PaymentRequest,
    ) -> Result<TransactionId, ServiceError> {
        Ok(TransactionId(self.record(request).await))
    }
}

#[async_trait]
impl MessagingService for SimulatedService<MessageRequest> {
    async fn receive_request(&self, request: MessageRequest) -> Result<RequestId, ServiceError> {
        Ok(RequestId(self.record(request).await))
    }
}

#[async_trait]
impl EmployeeHandle for SimulatedService<Order> {
    async fn receive_request(&self, order: Order) -> Result<(), ServiceError> {
        self.record(order).await;
        Ok(())
    }
}

/// Queue storage backed by a `VecDeque`.
#[derive(Default)]
pub struct InMemoryQueue {
    tasks: Mutex<VecDeque<DeferredTask>>,
    appended: AtomicU64,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of tasks ever appended.
    pub fn appended(&self) -> u64 {
        self.appended.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<DeferredTask> {
        self.tasks.lock().await.iter().cloned().collect()
    }
}

#[async_trait]
impl QueueStorage for InMemoryQueue {
    async fn append(&self, task: DeferredTask) -> Result<(), ServiceError> {
        self.tasks.lock().await.push_back(task);
        self.appended.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn peek(&self) -> Result<Option<DeferredTask>, ServiceError> {
        Ok(self.tasks.lock().await.front().cloned())
    }

    async fn update_head(&self, task: DeferredTask) -> Result<(), ServiceError> {
        if let Some(head) = self.tasks.lock().await.front_mut() {
            *head = task;
        }
        Ok(())
    }

    async fn remove_head(&self) -> Result<Option<DeferredTask>, ServiceError> {
        Ok(self.tasks.lock().await.pop_front())
    }
}

/// A full set of simulated capabilities plus the fault list for each.
pub struct SimulatedServices {
    pub shipping: Arc<SimulatedService<ShippingRequest>>,
    pub payment: Arc<SimulatedService<PaymentRequest>>,
    pub messaging: Arc<SimulatedService<MessageRequest>>,
    pub employee_handle: Arc<SimulatedService<Order>>,
    pub queue: Arc<InMemoryQueue>,
    pub shipping_faults: FaultInjector,
    pub payment_faults: FaultInjector,
    pub messaging_faults: FaultInjector,
    pub employee_faults: FaultInjector,
    pub queue_faults: FaultInjector,
}

impl Default for SimulatedServices {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedServices {
    pub fn new() -> Self {
        Self {
            shipping: Arc::new(SimulatedService::new("ship")),
            payment: Arc::new(SimulatedService::new("pay")),
            messaging: Arc::new(SimulatedService::new("msg")),
            employee_handle: Arc::new(SimulatedService::new("emp")),
            queue: Arc::new(InMemoryQueue::new()),
            shipping_faults: FaultInjector::default(),
            payment_faults: FaultInjector::default(),
            messaging_faults: FaultInjector::default(),
            employee_faults: FaultInjector::default(),
            queue_faults: FaultInjector::default(),
        }
    }

    /// The capability set to hand to the commander. Fault lists are shared with `self`.
    pub fn services(&self) -> Services {
        let shipping: Arc<dyn ShippingService> = self.shipping.clone();
        let payment: Arc<dyn PaymentService> = self.payment.clone();
        let messaging: Arc<dyn MessagingService> = self.messaging.clone();
        let employee_handle: Arc<dyn EmployeeHandle> = self.employee_handle.clone();
        let queue: Arc<dyn QueueStorage> = self.queue.clone();

        Services {
            shipping: Remote::new(shipping, self.shipping_faults.clone()),
            payment: Remote::new(payment, self.payment_faults.clone()),
            messaging: Remote::new(messaging, self.messaging_faults.clone()),
            employee_handle: Remote::new(employee_handle, self.employee_faults.clone()),
            queue: Remote::new(queue, self.queue_faults.clone()),
        }
    }

    /// Messages delivered for one order, in delivery order.
    pub async fn notices_for(&self, order_id: OrderId) -> Vec<Notice> {
        self.messaging
            .received()
            .await
            .into_iter()
            .filter(|request| request.order_id == order_id)
            .map(|request| request.notice)
            .collect()
    }
}
