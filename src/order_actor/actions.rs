//! Transitions accepted by an [`Order`](crate::model::Order) record.
//!
//! Each action is applied by the order actor with exclusive access to the record, so the
//! guard it checks and the change it makes cannot interleave with another stage. Actions that
//! report `bool` return `true` when they changed the record and `false` when the guard
//! refused the change.

use crate::model::{Notice, PaymentState, SiteNotice, Stage};
use crate::services::TransactionId;

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Stores the shipping transaction id. Only the first one is kept.
    RecordShipment(TransactionId),
    /// Checks that `Stage` still has work to do and claims it for the caller.
    Begin(Stage),
    /// Drops a claim taken by [`OrderAction::Begin`] without changing progress.
    Release(Stage),
    /// Moves payment out of `Trying`. Refused once payment is settled.
    SettlePayment {
        outcome: PaymentState,
        transaction: Option<TransactionId>,
    },
    /// Records a delivered customer message. Refused once a terminal message is recorded.
    RecordNotice(Notice),
    MarkEscalated,
    ShowSiteNotice(SiteNotice),
}

/// Answer to [`OrderAction::Begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The stage is pending and now claimed by the caller.
    Open,
    /// Nothing left to do for this stage.
    Settled,
    /// Another task holds the claim.
    InFlight,
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderActionResult {
    RecordShipment(bool),
    Begin(Gate),
    Release(()),
    SettlePayment(bool),
    RecordNotice(bool),
    MarkEscalated(bool),
    ShowSiteNotice(bool),
}
