//! Startup, shutdown and observability.
//!
//! # Main Components
//!
//! - [`CommanderSystem`] - Spawns the order and queue actors and wires the [`Commander`](crate::commander::Commander)
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod system;
pub mod tracing;

pub use system::*;
pub use tracing::*;
