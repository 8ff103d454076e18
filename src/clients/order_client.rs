use crate::framework::ResourceClient;
use crate::model::{Notice, Order, OrderCreate, OrderId, PaymentState, SiteNotice, Stage};
use crate::order_actor::{Gate, OrderAction, OrderActionResult, OrderError};
use crate::services::TransactionId;
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
///
/// Every transition is one request, so each method is an atomic check-and-set on the record.
/// Methods returning `bool` report whether the record changed.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?params, "create_order called");
        self.inner.create(params).await.map_err(OrderError::from)
    }

    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        self.inner.get(id).await.map_err(OrderError::from)
    }

    /// Like [`OrderClient::get`], but a missing record is an error.
    pub async fn snapshot(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(OrderError::from)
    }

    pub async fn begin(&self, id: OrderId, stage: Stage) -> Result<Gate, OrderError> {
        match self.act(id, OrderAction::Begin(stage)).await? {
            OrderActionResult::Begin(gate) => Ok(gate),
            other => Err(OrderError::UnexpectedResult(format!("{other:?}"))),
        }
    }

    pub async fn release(&self, id: OrderId, stage: Stage) -> Result<(), OrderError> {
        match self.act(id, OrderAction::Release(stage)).await? {
            OrderActionResult::Release(()) => Ok(()),
            other => Err(OrderError::UnexpectedResult(format!("{other:?}"))),
        }
    }

    pub async fn record_shipment(
        &self,
        id: OrderId,
        transaction: TransactionId,
    ) -> Result<bool, OrderError> {
        match self.act(id, OrderAction::RecordShipment(transaction)).await? {
            OrderActionResult::RecordShipment(changed) => Ok(changed),
            other => Err(OrderError::UnexpectedResult(format!("{other:?}"))),
        }
    }

    pub async fn settle_payment(
        &self,
        id: OrderId,
        outcome: PaymentState,
        transaction: Option<TransactionId>,
    ) -> Result<bool, OrderError> {
        let action = OrderAction::SettlePayment {
            outcome,
            transaction,
        };
        match self.act(id, action).await? {
            OrderActionResult::SettlePayment(changed) => Ok(changed),
            other => Err(OrderError::UnexpectedResult(format!("{other:?}"))),
        }
    }

    pub async fn record_notice(&self, id: OrderId, notice: Notice) -> Result<bool, OrderError> {
        match self.act(id, OrderAction::RecordNotice(notice)).await? {
            OrderActionResult::RecordNotice(changed) => Ok(changed),
            other => Err(OrderError::UnexpectedResult(format!("{other:?}"))),
        }
    }

    pub async fn mark_escalated(&self, id: OrderId) -> Result<bool, OrderError> {
        match self.act(id, OrderAction::MarkEscalated).await? {
            OrderActionResult::MarkEscalated(changed) => Ok(changed),
            other => Err(OrderError::UnexpectedResult(format!("{other:?}"))),
        }
    }

    pub async fn show_site_notice(
        &self,
        id: OrderId,
        notice: SiteNotice,
    ) -> Result<bool, OrderError> {
        match self.act(id, OrderAction::ShowSiteNotice(notice)).await? {
            OrderActionResult::ShowSiteNotice(changed) => Ok(changed),
            other => Err(OrderError::UnexpectedResult(format!("{other:?}"))),
        }
    }
}
