//! Generic single-writer record store.
//!
//! This module provides the building blocks for keeping mutable records behind an actor so
//! that concurrent tasks can advance them without locks.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that record types implement
//! - [`ResourceActor`] - Actor that owns the records and applies transitions in order
//! - [`ResourceClient`] - Cloneable handle used to send requests
//! - [`FrameworkError`] - Plumbing errors (closed actor, missing record)

pub mod actor;
pub mod client;
pub mod entity;
pub mod error;
pub mod message;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
