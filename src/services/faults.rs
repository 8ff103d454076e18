//! Fault injection for capabilities.
//!
//! Every capability is paired with a `FaultInjector`: an ordered list of errors that the
//! [`Retry`](crate::retry::Retry) executor consumes one per attempt before doing any real
//! work. Tests and the demo binary use it to simulate outages without touching the
//! capability implementations.

use super::ServiceError;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared, ordered list of pending simulated faults.
///
/// Clones share the same list, so the handle given to a test and the one held by the
/// commander drain the same faults.
#[derive(Debug, Clone, Default)]
pub struct FaultInjector {
    pending: Arc<Mutex<VecDeque<ServiceError>>>,
}

impl FaultInjector {
    pub fn new(faults: impl IntoIterator<Item = ServiceError>) -> Self {
        Self {
            pending: Arc::new(Mutex::new(faults.into_iter().collect())),
        }
    }

    pub async fn push(&self, fault: ServiceError) {
        self.pending.lock().await.push_back(fault);
    }

    pub async fn extend(&self, faults: impl IntoIterator<Item = ServiceError>) {
        self.pending.lock().await.extend(faults);
    }

    /// Consumes the front fault, if any. `None` means the attempt should do real work.
    pub async fn next(&self) -> Option<ServiceError> {
        self.pending.lock().await.pop_front()
    }

    pub async fn remaining(&self) -> usize {
        self.pending.lock().await.len()
    }
}
