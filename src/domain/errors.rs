use thiserror::Error;

use super::lifecycle::OrderState;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Forbidden")]
    Forbidden,
    #[error("Order has no items")]
    EmptyOrder,
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
    #[error("Invalid payment proof: {0}")]
    InvalidPaymentProof(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Order is not paid")]
    NotPaid,
    #[error("Order is already {0}")]
    AlreadyInState(OrderState),
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Recoverable outcomes are logged, not reported to the end user.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DomainError::AlreadyInState(_))
    }
}
