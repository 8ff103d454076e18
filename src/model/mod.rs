//! Pure data structures: the order record, its progress markers and deferred tasks.

pub mod order;
pub mod stage;
pub mod task;

pub use order::*;
pub use stage::*;
pub use task::*;
