use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem, PaymentProof, Prices, ShippingAddress};
use crate::schema::{order_items, order_outbox, orders};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_postal_code: String,
    pub shipping_country: String,
    pub payment_method: String,
    pub items_price: BigDecimal,
    pub shipping_price: BigDecimal,
    pub tax_price: BigDecimal,
    pub total_price: BigDecimal,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_result: Option<Value>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_postal_code: String,
    pub shipping_country: String,
    pub payment_method: String,
    pub items_price: BigDecimal,
    pub shipping_price: BigDecimal,
    pub tax_price: BigDecimal,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub price: BigDecimal,
    pub qty: i32,
    pub vendor_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub price: BigDecimal,
    pub qty: i32,
    pub vendor_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}

impl OrderRow {
    /// Rebuilds the domain order; `items` must already be sorted by position.
    pub fn into_order(self, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
        let payment_result = self
            .payment_result
            .map(serde_json::from_value::<PaymentProof>)
            .transpose()
            .map_err(|e| DomainError::Internal(format!("corrupt payment result: {}", e)))?;

        Ok(Order {
            id: self.id,
            buyer_id: self.buyer_id,
            items: items
                .into_iter()
                .map(|i| OrderItem {
                    product_id: i.product_id,
                    name: i.name,
                    image: i.image,
                    price: i.price,
                    qty: i.qty,
                    vendor_id: i.vendor_id,
                })
                .collect(),
            shipping_address: ShippingAddress {
                address: self.shipping_address,
                city: self.shipping_city,
                postal_code: self.shipping_postal_code,
                country: self.shipping_country,
            },
            payment_method: self.payment_method,
            prices: Prices {
                items_price: self.items_price,
                shipping_price: self.shipping_price,
                tax_price: self.tax_price,
                total_price: self.total_price,
            },
            is_paid: self.is_paid,
            paid_at: self.paid_at,
            payment_result,
            is_delivered: self.is_delivered,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
        })
    }
}
