//! Hand-off to manual handling. Recorded once per order.

use super::{Commander, CommanderError};
use crate::model::{OrderId, Stage};
use tracing::{debug, info, warn};

impl Commander {
    pub(super) async fn escalate(&self, id: OrderId) -> Result<(), CommanderError> {
        let order = self.orders.snapshot(id).await?;
        if order.escalated {
            debug!("Already escalated");
            return Ok(());
        }
        if order.age() >= self.config.employee_time() {
            warn!("Escalation window closed");
            return Ok(());
        }
        if !self.claim(id, Stage::Escalation).await? {
            return Ok(());
        }

        let service = &self.services.employee_handle.service;
        let outcome = self
            .retry
            .run(&self.services.employee_handle.faults, move || {
                service.receive_request(order.clone())
            })
            .await;

        match outcome {
            Ok(()) => {
                self.orders.mark_escalated(id).await?;
                info!("Order handed to employee handle");
            }
            Err(e) => {
                self.orders.release(id, Stage::Escalation).await?;
                let order = self.orders.snapshot(id).await?;
                if !order.escalated && order.age() < self.config.employee_time() {
                    warn!(error = %e, "Escalation failed, deferring");
                    self.dispatch_enqueue(id, Stage::Escalation);
                } else {
                    warn!(error = %e, "Escalation failed, giving up");
                }
            }
        }
        Ok(())
    }
}
