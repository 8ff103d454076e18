//! ActorEntity implementation for the Order record.
//!
//! Creation validates the order inputs. Every later change goes through
//! [`OrderAction`], which enforces the one-way progress rules:
//!
//! - payment moves `Trying -> Done | NotDone` once
//! - a terminal message is never replaced
//! - escalation and the site notice are recorded once

use super::actions::{Gate, OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::framework::ActorEntity;
use crate::model::{Order, OrderCreate, OrderId, PaymentState, Stage};

impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.item.trim().is_empty() {
            return Err(OrderError::InvalidOrder("item must not be empty".into()));
        }
        if params.user.name.trim().is_empty() {
            return Err(OrderError::InvalidOrder("user name must not be empty".into()));
        }
        if params.user.address.trim().is_empty() {
            return Err(OrderError::InvalidOrder("address must not be empty".into()));
        }
        if !params.price.is_finite() || params.price <= 0.0 {
            return Err(OrderError::InvalidOrder(format!(
                "price must be positive, got {}",
                params.price
            )));
        }
        Ok(Order::new(id, params.user, params.item, params.price))
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::RecordShipment(transaction) => {
                if self.shipping_transaction.is_some() {
                    return Ok(OrderActionResult::RecordShipment(false));
                }
                self.shipping_transaction = Some(transaction);
                Ok(OrderActionResult::RecordShipment(true))
            }
            OrderAction::Begin(stage) => {
                let gate = if !self.is_pending(stage) {
                    Gate::Settled
                } else if !self.in_flight.insert(stage) {
                    Gate::InFlight
                } else {
                    Gate::Open
                };
                Ok(OrderActionResult::Begin(gate))
            }
            OrderAction::Release(stage) => {
                self.in_flight.remove(&stage);
                Ok(OrderActionResult::Release(()))
            }
            OrderAction::SettlePayment {
                outcome,
                transaction,
            } => {
                if outcome == PaymentState::Trying {
                    return Err(OrderError::IllegalTransition {
                        from: self.payment,
                        to: outcome,
                    });
                }
                if self.payment.is_settled() {
                    return Ok(OrderActionResult::SettlePayment(false));
                }
                self.payment = outcome;
                if transaction.is_some() {
                    self.payment_transaction = transaction;
                }
                self.in_flight.remove(&Stage::Payment);
                Ok(OrderActionResult::SettlePayment(true))
            }
            OrderAction::RecordNotice(notice) => {
                let stage = Stage::Message(notice);
                self.in_flight.remove(&stage);
                if !self.is_pending(stage) {
                    return Ok(OrderActionResult::RecordNotice(false));
                }
                self.message = notice.delivered_state();
                Ok(OrderActionResult::RecordNotice(true))
            }
            OrderAction::MarkEscalated => {
                self.in_flight.remove(&Stage::Escalation);
                if self.escalated {
                    return Ok(OrderActionResult::MarkEscalated(false));
                }
                self.escalated = true;
                Ok(OrderActionResult::MarkEscalated(true))
            }
            OrderAction::ShowSiteNotice(notice) => {
                if self.site_notice.is_some() {
                    return Ok(OrderActionResult::ShowSiteNotice(false));
                }
                self.site_notice = Some(notice);
                Ok(OrderActionResult::ShowSiteNotice(true))
            }
        }
    }
}
