//! Customer messages. Each notice kind goes out at most once and a terminal notice is final.

use super::{Commander, CommanderError};
use crate::model::{Notice, OrderId, Stage};
use crate::services::MessageRequest;
use tracing::{debug, info, warn};

impl Commander {
    pub(super) async fn send_message(
        &self,
        id: OrderId,
        notice: Notice,
    ) -> Result<(), CommanderError> {
        let stage = Stage::Message(notice);
        let order = self.orders.snapshot(id).await?;
        if !order.is_pending(stage) {
            debug!(message = ?order.message, "Message no longer needed");
            return Ok(());
        }
        if order.age() >= self.config.message_time() {
            warn!(%notice, "Messaging window closed, message dropped");
            return Ok(());
        }
        if !self.claim(id, stage).await? {
            return Ok(());
        }

        let request = MessageRequest {
            order_id: id,
            notice,
        };
        let service = &self.services.messaging.service;
        let outcome = self
            .retry
            .run(&self.services.messaging.faults, move || {
                service.receive_request(request.clone())
            })
            .await;

        match outcome {
            Ok(request_id) => {
                if self.orders.record_notice(id, notice).await? {
                    info!(%notice, %request_id, "Message sent");
                } else {
                    debug!(%notice, %request_id, "Message sent but superseded");
                }
            }
            Err(e) => {
                self.orders.release(id, stage).await?;
                let order = self.orders.snapshot(id).await?;
                if order.is_pending(stage) && order.age() < self.config.message_time() {
                    warn!(%notice, error = %e, "Message failed, deferring and escalating");
                    self.dispatch_enqueue(id, stage);
                    self.dispatch(id, Stage::Escalation);
                } else {
                    warn!(%notice, error = %e, "Message failed, giving up");
                }
            }
        }
        Ok(())
    }
}
