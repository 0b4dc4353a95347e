//! Authorization decisions for order operations.
//!
//! Roles map to capabilities through a static table; the `can_*` functions
//! combine capabilities with ownership and order state. Every function here
//! returns a decision and never fails; callers turn a denial into
//! [`DomainError::Forbidden`](super::errors::DomainError::Forbidden).

use uuid::Uuid;

use super::lifecycle::OrderState;
use super::order::Order;
use super::principal::{Principal, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    PlaceOrder,
    /// Supplies line items and sees its own share of orders.
    SellProduce,
    /// Sees every order and confirms delivery.
    ManageOrders,
    ViewDashboard,
}

const CAPABILITIES: &[(Role, &[Capability])] = &[
    (Role::Consumer, &[Capability::PlaceOrder]),
    (Role::Farmer, &[Capability::PlaceOrder, Capability::SellProduce]),
    (Role::Supplier, &[Capability::PlaceOrder, Capability::SellProduce]),
    (
        Role::Admin,
        &[
            Capability::PlaceOrder,
            Capability::ManageOrders,
            Capability::ViewDashboard,
        ],
    ),
];

pub fn capabilities(role: Role) -> &'static [Capability] {
    CAPABILITIES
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, caps)| *caps)
        .unwrap_or(&[])
}

pub fn has_capability(principal: &Principal, capability: Capability) -> bool {
    capabilities(principal.role).contains(&capability)
}

/// Which representation of an order a caller receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewScope {
    Full,
    Vendor(Uuid),
}

/// Buyers and order managers get the full order; vendors only their share.
/// `None` means the caller may not see the order at all.
pub fn view_scope(principal: &Principal, order: &Order) -> Option<ViewScope> {
    if order.buyer_id == principal.id || has_capability(principal, Capability::ManageOrders) {
        return Some(ViewScope::Full);
    }
    if has_capability(principal, Capability::SellProduce) && order.has_items_from(principal.id) {
        return Some(ViewScope::Vendor(principal.id));
    }
    None
}

pub fn can_view(principal: &Principal, order: &Order) -> bool {
    view_scope(principal, order).is_some()
}

pub fn can_pay(principal: &Principal, order: &Order) -> bool {
    order.buyer_id == principal.id && order.state() == OrderState::Created
}

pub fn can_mark_delivered(principal: &Principal, order: &Order) -> bool {
    has_capability(principal, Capability::ManageOrders) && order.state() == OrderState::Paid
}
