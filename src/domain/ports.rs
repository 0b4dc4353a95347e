use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{NewOrder, Order, PaymentProof};

/// Durable order storage. Lists are returned newest first.
///
/// `mark_paid` and `mark_delivered` are conditional updates: they only apply
/// when the stored order is still in the expected prior state and return
/// `Ok(None)` otherwise.
pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError>;
    fn list_by_vendor(&self, vendor_id: Uuid) -> Result<Vec<Order>, DomainError>;
    fn list_all(&self) -> Result<Vec<Order>, DomainError>;
    fn mark_paid(
        &self,
        id: Uuid,
        proof: &PaymentProof,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, DomainError>;
    fn mark_delivered(&self, id: Uuid, delivered_at: DateTime<Utc>) -> Result<Option<Order>, DomainError>;
}

/// Read-only view of registered users.
pub trait UserRepository: Send + Sync + 'static {
    fn registration_dates(&self) -> Result<Vec<DateTime<Utc>>, DomainError>;
}
