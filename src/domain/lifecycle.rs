use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Where an order stands. Derived from the `is_paid`/`is_delivered` flags,
/// never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Created,
    Paid,
    Delivered,
}

impl OrderState {
    pub fn from_flags(is_paid: bool, is_delivered: bool) -> Self {
        match (is_paid, is_delivered) {
            (_, true) => OrderState::Delivered,
            (true, false) => OrderState::Paid,
            (false, false) => OrderState::Created,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Created => "created",
            OrderState::Paid => "paid",
            OrderState::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    PaymentConfirmed,
    DeliveryConfirmed,
}

impl LifecycleEvent {
    /// Name used for the audit outbox row.
    pub fn event_type(&self) -> &'static str {
        match self {
            LifecycleEvent::PaymentConfirmed => "OrderPaid",
            LifecycleEvent::DeliveryConfirmed => "OrderDelivered",
        }
    }
}

/// Validates a lifecycle transition and returns the resulting state.
///
/// The lifecycle only moves forward. Applying an event whose effect already
/// holds yields [`DomainError::AlreadyInState`]; delivering an unpaid order
/// yields [`DomainError::NotPaid`]. Authorization is not checked here.
pub fn transition(state: OrderState, event: LifecycleEvent) -> Result<OrderState, DomainError> {
    use LifecycleEvent::*;
    use OrderState::*;

    match (state, event) {
        (Created, PaymentConfirmed) => Ok(Paid),
        (Paid | Delivered, PaymentConfirmed) => Err(DomainError::AlreadyInState(state)),
        (Created, DeliveryConfirmed) => Err(DomainError::NotPaid),
        (Paid, DeliveryConfirmed) => Ok(Delivered),
        (Delivered, DeliveryConfirmed) => Err(DomainError::AlreadyInState(state)),
    }
}
