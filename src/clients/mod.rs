//! Type-safe wrappers around the actors' request channels.

pub mod order_client;
pub mod queue_client;

pub use order_client::*;
pub use queue_client::*;
