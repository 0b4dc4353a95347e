use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::order::{Order, OrderItem};

/// One vendor's share of a multi-vendor order. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorView {
    pub order_id: Uuid,
    pub vendor_id: Uuid,
    pub items: Vec<OrderItem>,
    pub subtotal: BigDecimal,
    pub is_paid: bool,
    pub is_delivered: bool,
    pub created_at: DateTime<Utc>,
}

/// What a permitted caller gets back for a single order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderView {
    Full(Order),
    Vendor(VendorView),
}

pub fn vendor_view(order: &Order, vendor_id: Uuid) -> VendorView {
    let items: Vec<OrderItem> = order
        .items
        .iter()
        .filter(|item| item.vendor_id == vendor_id)
        .cloned()
        .collect();
    let subtotal = items
        .iter()
        .fold(BigDecimal::from(0), |acc, item| acc + item.line_total());

    VendorView {
        order_id: order.id,
        vendor_id,
        items,
        subtotal,
        is_paid: order.is_paid,
        is_delivered: order.is_delivered,
        created_at: order.created_at,
    }
}

pub fn full_view(order: Order) -> OrderView {
    OrderView::Full(order)
}

/// Subtotal per vendor, in order of first appearance among the items.
pub fn vendor_subtotals(order: &Order) -> Vec<(Uuid, BigDecimal)> {
    let mut totals: Vec<(Uuid, BigDecimal)> = Vec::new();
    for item in &order.items {
        match totals.iter_mut().find(|(vendor, _)| *vendor == item.vendor_id) {
            Some((_, total)) => *total += item.line_total(),
            None => totals.push((item.vendor_id, item.line_total())),
        }
    }
    totals
}
