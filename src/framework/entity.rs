//! # ActorEntity Trait
//!
//! The contract a record type implements to be stored by a [`ResourceActor`](super::ResourceActor).
//!
//! Unlike a general CRUD entity, a record here is only ever *created* and then moved
//! forward by *actions*. Actions are plain synchronous state transitions: the actor applies
//! them one at a time and never yields in the middle of one, so a guard checked inside
//! [`ActorEntity::handle_action`] and the mutation that follows it form a single atomic step.
//! This is what lets concurrent stage tasks race on the same record without a lock.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record must implement to be managed by `ResourceActor`.
///
/// Associated types keep every request type-checked: an `Order` can only be created from
/// an `OrderCreate` and only accepts `OrderAction`s.
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier. Allocated by the actor from a `u32` counter.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// Resource-specific state transitions.
    type Action: Send + Sync + Debug;

    /// The result returned by an action.
    type ActionResult: Send + Sync + Debug;

    /// The error type for this entity.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the record from its freshly allocated ID and the creation payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Apply one transition. Runs with exclusive access to the record.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}
