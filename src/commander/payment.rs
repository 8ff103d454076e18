//! Payment: settles `Trying` into `Done` or `NotDone` exactly once.

use super::{Commander, CommanderError};
use crate::model::{MessageState, Notice, OrderId, PaymentState, SiteNotice, Stage};
use crate::services::{PaymentRequest, ServiceError};
use tracing::{debug, info, warn};

impl Commander {
    pub(super) async fn pay(&self, id: OrderId) -> Result<(), CommanderError> {
        let order = self.orders.snapshot(id).await?;
        if !order.is_pending(Stage::Payment) {
            debug!(payment = ?order.payment, "Payment already settled");
            return Ok(());
        }
        if order.age() >= self.config.payment_time() {
            return self.abandon_payment(id).await;
        }
        if !self.claim(id, Stage::Payment).await? {
            return Ok(());
        }

        let request = PaymentRequest {
            order_id: id,
            price: order.price,
        };
        let service = &self.services.payment.service;
        let outcome = self
            .retry
            .run(&self.services.payment.faults, move || {
                service.receive_request(request.clone())
            })
            .await;

        match outcome {
            Ok(transaction) => {
                let committed = self
                    .orders
                    .settle_payment(id, PaymentState::Done, Some(transaction.clone()))
                    .await?;
                if committed {
                    info!(%transaction, "Payment succeeded");
                    self.show_site_notice(id, SiteNotice::PaymentSucceeded)
                        .await?;
                    self.dispatch(id, Stage::Message(Notice::PaymentSucceeded));
                } else {
                    // The record was abandoned while the call was in flight.
                    warn!(%transaction, "Payment captured after it was abandoned, escalating");
                    self.orders.release(id, Stage::Payment).await?;
                    self.dispatch(id, Stage::Escalation);
                }
            }
            Err(e) if e.is_retryable() => {
                self.orders.release(id, Stage::Payment).await?;
                self.payment_pending(id, e).await?;
            }
            Err(e) => {
                let committed = self
                    .orders
                    .settle_payment(id, PaymentState::NotDone, None)
                    .await?;
                if committed {
                    warn!(error = %e, "Payment refused, converted to cash on delivery");
                    self.show_site_notice(id, SiteNotice::ConvertedToCashOnDelivery)
                        .await?;
                    self.dispatch(id, Stage::Message(Notice::PaymentFailed));
                } else {
                    self.orders.release(id, Stage::Payment).await?;
                }
            }
        }
        Ok(())
    }

    /// Transient failure: tell the customer once and defer the payment while its window is open.
    async fn payment_pending(
        &self,
        id: OrderId,
        error: ServiceError,
    ) -> Result<(), CommanderError> {
        let order = self.orders.snapshot(id).await?;
        if order.payment != PaymentState::Trying {
            return Ok(());
        }

        if order.message == MessageState::NoneSent {
            self.show_site_notice(id, SiteNotice::PaymentPending).await?;
            self.dispatch(id, Stage::Message(Notice::PaymentTrying));
        }

        if order.age() < self.config.payment_time() {
            warn!(error = %error, "Payment unavailable, deferring");
            self.dispatch_enqueue(id, Stage::Payment);
            Ok(())
        } else {
            self.abandon_payment(id).await
        }
    }

    /// Forces `Trying` to `NotDone` and sends the failure notice if this call made the change.
    pub(super) async fn abandon_payment(&self, id: OrderId) -> Result<(), CommanderError> {
        if self
            .orders
            .settle_payment(id, PaymentState::NotDone, None)
            .await?
        {
            warn!("Payment window closed, payment abandoned");
            self.dispatch(id, Stage::Message(Notice::PaymentFailed));
        }
        Ok(())
    }
}
