//! Progress markers shared by the record, the queue and the commander.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Where the payment for an order stands.
///
/// `Trying` is the only non-terminal state; it moves once to `Done` or `NotDone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentState {
    Trying,
    Done,
    /// Payment abandoned; the order ships cash on delivery.
    NotDone,
}

impl PaymentState {
    pub fn is_settled(self) -> bool {
        !matches!(self, PaymentState::Trying)
    }
}

/// The last customer message delivered for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageState {
    NoneSent,
    PaymentTrying,
    PaymentFailed,
    PaymentSucceeded,
}

impl MessageState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MessageState::PaymentFailed | MessageState::PaymentSucceeded
        )
    }
}

/// The three customer messages the commander can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Notice {
    /// Payment hit a transient problem and is being retried.
    PaymentTrying,
    PaymentFailed,
    PaymentSucceeded,
}

impl Notice {
    /// The message state reached once this notice is delivered.
    pub fn delivered_state(self) -> MessageState {
        match self {
            Notice::PaymentTrying => MessageState::PaymentTrying,
            Notice::PaymentFailed => MessageState::PaymentFailed,
            Notice::PaymentSucceeded => MessageState::PaymentSucceeded,
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Notice::PaymentTrying => "payment-trying",
            Notice::PaymentFailed => "payment-failed",
            Notice::PaymentSucceeded => "payment-succeeded",
        };
        f.write_str(name)
    }
}

/// A unit of work that can be deferred to the queue and replayed later.
///
/// Shipping is not a stage: it runs once on the caller's path and is never queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Payment,
    Message(Notice),
    Escalation,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Payment => f.write_str("payment"),
            Stage::Message(notice) => write!(f, "message:{notice}"),
            Stage::Escalation => f.write_str("escalation"),
        }
    }
}

/// The status message shown to the customer on the storefront.
///
/// Only the first one for an order is kept; later stages may still log theirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteNotice {
    ShippingNotPossible,
    ItemUnavailable,
    OrderNotPlaced,
    PaymentSucceeded,
    ConvertedToCashOnDelivery,
    PaymentPending,
}

impl Display for SiteNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SiteNotice::ShippingNotPossible => {
                "Shipping is currently not possible to your address. We are working on the \
                 problem and will get back to you asap."
            }
            SiteNotice::ItemUnavailable => {
                "This item is currently unavailable. We will inform you as soon as the item \
                 becomes available again."
            }
            SiteNotice::OrderNotPlaced => {
                "Sorry, there was a problem in creating your order. Please try later."
            }
            SiteNotice::PaymentSucceeded => {
                "Payment made successfully, thank you for shopping with us!"
            }
            SiteNotice::ConvertedToCashOnDelivery => {
                "There was an error in payment. Your account/card details may have been \
                 incorrect. Meanwhile, your order has been converted to COD and will be shipped."
            }
            SiteNotice::PaymentPending => {
                "There was an error in payment. We are on it, and will get back to you asap. \
                 Don't worry, your order has been placed and will be shipped."
            }
        };
        f.write_str(text)
    }
}
