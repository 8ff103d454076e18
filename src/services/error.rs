//! Failure taxonomy shared by every external capability.

use std::fmt::Display;

/// Which external capability a call went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Shipping,
    Payment,
    Messaging,
    EmployeeHandle,
    Queue,
}

impl Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ServiceKind::Shipping => "shipping service",
            ServiceKind::Payment => "payment service",
            ServiceKind::Messaging => "messaging service",
            ServiceKind::EmployeeHandle => "employee handle",
            ServiceKind::Queue => "queue storage",
        };
        f.write_str(name)
    }
}

/// Errors a capability can fail with.
///
/// `Unavailable` is a connectivity problem and worth retrying. Every other variant is a
/// business rule rejecting the request and will fail the same way again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} unavailable")]
    Unavailable(ServiceKind),
    #[error("item {0} unavailable")]
    ItemUnavailable(String),
    #[error("shipping not possible to {0}")]
    ShippingNotPossible(String),
    #[error("payment details invalid")]
    PaymentDetailsInvalid,
}

impl ServiceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connectivity_is_retryable() {
        assert!(ServiceError::Unavailable(ServiceKind::Payment).is_retryable());
        assert!(!ServiceError::ItemUnavailable("book".into()).is_retryable());
        assert!(!ServiceError::ShippingNotPossible("nowhere".into()).is_retryable());
        assert!(!ServiceError::PaymentDetailsInvalid.is_retryable());
    }
}
