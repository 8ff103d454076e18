//! Shipping: the only stage on the caller's path.

use super::{Commander, CommanderError};
use crate::model::{OrderId, SiteNotice, Stage};
use crate::services::{ServiceError, ShippingRequest};
use tracing::{error, info, warn};

impl Commander {
    pub(super) async fn ship(&self, id: OrderId) -> Result<(), CommanderError> {
        let order = self.orders.snapshot(id).await?;
        let request = ShippingRequest {
            order_id: id,
            item: order.item,
            address: order.user.address,
        };

        let service = &self.services.shipping.service;
        let outcome = self
            .retry
            .run(&self.services.shipping.faults, move || {
                service.receive_request(request.clone())
            })
            .await;

        match outcome {
            Ok(transaction) => {
                self.orders.record_shipment(id, transaction.clone()).await?;
                info!(%transaction, "Shipping request accepted");
                self.dispatch(id, Stage::Payment);
                Ok(())
            }
            Err(ServiceError::ItemUnavailable(item)) => {
                warn!(%item, "Item unavailable, escalating");
                self.show_site_notice(id, SiteNotice::ItemUnavailable).await?;
                self.dispatch(id, Stage::Escalation);
                Ok(())
            }
            Err(ServiceError::ShippingNotPossible(address)) => {
                warn!(%address, "Address cannot be shipped to, escalating");
                self.show_site_notice(id, SiteNotice::ShippingNotPossible)
                    .await?;
                self.dispatch(id, Stage::Escalation);
                Ok(())
            }
            Err(source) => {
                error!(error = %source, "Shipping unavailable, order not placed");
                self.show_site_notice(id, SiteNotice::OrderNotPlaced).await?;
                Err(CommanderError::ShippingUnavailable { order: id, source })
            }
        }
    }
}
