use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::access::{self, Capability, ViewScope};
use crate::domain::aggregate::{self, OrderView, VendorView};
use crate::domain::errors::DomainError;
use crate::domain::lifecycle::{transition, LifecycleEvent, OrderState};
use crate::domain::order::{NewOrder, Order, OrderDraft, PaymentProof};
use crate::domain::ports::OrderRepository;
use crate::domain::principal::Principal;

pub struct OrderService<R: ?Sized> {
    repo: Arc<R>,
    accepted_payment_statuses: Vec<String>,
}

impl<R: OrderRepository + ?Sized> OrderService<R> {
    pub fn new(repo: Arc<R>, accepted_payment_statuses: Vec<String>) -> Self {
        Self {
            repo,
            accepted_payment_statuses,
        }
    }

    pub fn create_order(&self, principal: &Principal, draft: OrderDraft) -> Result<Order, DomainError> {
        if !access::has_capability(principal, Capability::PlaceOrder) {
            return Err(DomainError::Forbidden);
        }
        let new_order = NewOrder::new(principal.id, draft, Utc::now())?;
        let order = self.repo.create(new_order)?;
        log::info!(
            "Order {} created by {} ({} items, total {})",
            order.id,
            principal.id,
            order.items.len(),
            order.prices.total_price
        );
        Ok(order)
    }

    /// Buyers and admins get the whole order, vendors only their own items.
    pub fn get_order(&self, principal: &Principal, id: Uuid) -> Result<OrderView, DomainError> {
        let order = self.load(id)?;
        match access::view_scope(principal, &order) {
            Some(ViewScope::Full) => Ok(aggregate::full_view(order)),
            Some(ViewScope::Vendor(vendor_id)) => {
                Ok(OrderView::Vendor(aggregate::vendor_view(&order, vendor_id)))
            }
            None => Err(DomainError::Forbidden),
        }
    }

    pub fn list_my_orders(&self, principal: &Principal) -> Result<Vec<Order>, DomainError> {
        self.repo.list_by_buyer(principal.id)
    }

    pub fn list_vendor_orders(&self, principal: &Principal) -> Result<Vec<VendorView>, DomainError> {
        if !access::has_capability(principal, Capability::SellProduce) {
            return Err(DomainError::Forbidden);
        }
        Ok(self
            .repo
            .list_by_vendor(principal.id)?
            .iter()
            .map(|order| aggregate::vendor_view(order, principal.id))
            .collect())
    }

    pub fn list_all_orders(&self, principal: &Principal) -> Result<Vec<Order>, DomainError> {
        if !access::has_capability(principal, Capability::ManageOrders) {
            return Err(DomainError::Forbidden);
        }
        self.repo.list_all()
    }

    pub fn confirm_payment(
        &self,
        principal: &Principal,
        id: Uuid,
        proof: PaymentProof,
    ) -> Result<Order, DomainError> {
        let order = self.load(id)?;
        if order.buyer_id != principal.id {
            return Err(DomainError::Forbidden);
        }
        proof.verify(&self.accepted_payment_statuses)?;
        transition(order.state(), LifecycleEvent::PaymentConfirmed)?;

        match self.repo.mark_paid(id, &proof, Utc::now())? {
            Some(order) => {
                log::info!("Order {} paid (payment {})", order.id, proof.id);
                Ok(order)
            }
            // Another request confirmed the payment first.
            None => Err(DomainError::AlreadyInState(OrderState::Paid)),
        }
    }

    pub fn mark_delivered(&self, principal: &Principal, id: Uuid) -> Result<Order, DomainError> {
        if !access::has_capability(principal, Capability::ManageOrders) {
            return Err(DomainError::Forbidden);
        }
        let order = self.load(id)?;
        transition(order.state(), LifecycleEvent::DeliveryConfirmed)?;

        match self.repo.mark_delivered(id, Utc::now())? {
            Some(order) => {
                log::info!("Order {} delivered, confirmed by {}", order.id, principal.id);
                Ok(order)
            }
            None => Err(DomainError::AlreadyInState(OrderState::Delivered)),
        }
    }

    fn load(&self, id: Uuid) -> Result<Order, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }
}
