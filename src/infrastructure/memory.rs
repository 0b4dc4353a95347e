use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, PaymentProof};
use crate::domain::ports::{OrderRepository, UserRepository};

/// Process-local order store. Orders live as long as the value does.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::StoreUnavailable("in-memory store lock poisoned".to_string())
}

impl InMemoryOrderRepository {
    fn select<F>(&self, keep: F) -> Result<Vec<Order>, DomainError>
    where
        F: Fn(&Order) -> bool,
    {
        let orders = self.orders.read().map_err(poisoned)?;
        let mut selected: Vec<Order> = orders.iter().rev().filter(|o| keep(*o)).cloned().collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(selected)
    }

    fn update<F>(&self, id: Uuid, apply: F) -> Result<Option<Order>, DomainError>
    where
        F: FnOnce(&mut Order) -> Result<(), DomainError>,
    {
        let mut orders = self.orders.write().map_err(poisoned)?;
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        match apply(order) {
            Ok(()) => Ok(Some(order.clone())),
            Err(e) if e.is_recoverable() || matches!(e, DomainError::NotPaid) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let order = order.into_order();
        self.orders.write().map_err(poisoned)?.push(order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let orders = self.orders.read().map_err(poisoned)?;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    fn list_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        self.select(|o| o.buyer_id == buyer_id)
    }

    fn list_by_vendor(&self, vendor_id: Uuid) -> Result<Vec<Order>, DomainError> {
        self.select(|o| o.has_items_from(vendor_id))
    }

    fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        self.select(|_| true)
    }

    fn mark_paid(
        &self,
        id: Uuid,
        proof: &PaymentProof,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, DomainError> {
        self.update(id, |order| order.apply_payment(proof.clone(), paid_at))
    }

    fn mark_delivered(&self, id: Uuid, delivered_at: DateTime<Utc>) -> Result<Option<Order>, DomainError> {
        self.update(id, |order| order.apply_delivery(delivered_at))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    registrations: RwLock<Vec<DateTime<Utc>>>,
}

impl InMemoryUserRepository {
    pub fn with_registrations(registrations: Vec<DateTime<Utc>>) -> Self {
        Self {
            registrations: RwLock::new(registrations),
        }
    }

    pub fn register(&self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.registrations.write().map_err(poisoned)?.push(at);
        Ok(())
    }
}

impl UserRepository for InMemoryUserRepository {
    fn registration_dates(&self) -> Result<Vec<DateTime<Utc>>, DomainError> {
        Ok(self.registrations.read().map_err(poisoned)?.clone())
    }
}
