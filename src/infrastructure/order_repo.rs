use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde_json::json;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::lifecycle::LifecycleEvent;
use crate::domain::order::{NewOrder, Order, PaymentProof};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, order_outbox, orders};

use super::models::{NewOrderItemRow, NewOrderRow, NewOutboxEventRow, OrderItemRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
                DomainError::StoreUnavailable(info.message().to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::StoreUnavailable(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn outbox_event(order_id: Uuid, event_type: &str, payload: serde_json::Value) -> NewOutboxEventRow {
    NewOutboxEventRow {
        id: Uuid::new_v4(),
        aggregate_type: "Order".to_string(),
        aggregate_id: order_id.to_string(),
        event_type: event_type.to_string(),
        payload,
    }
}

/// Loads the items of `rows` in one query and reassembles the orders.
fn attach_items(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .order(order_items::position.asc())
        .load(conn)?;

    items
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(items, row)| row.into_order(items))
        .collect()
}

fn load_order(conn: &mut PgConnection, id: Uuid) -> Result<Option<Order>, DomainError> {
    let row = orders::table
        .filter(orders::id.eq(id))
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => Ok(attach_items(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let NewOrder {
                id: order_id,
                buyer_id,
                draft,
                created_at,
            } = &order;

            // 1. Insert the order
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: *order_id,
                    buyer_id: *buyer_id,
                    shipping_address: draft.shipping_address.address.clone(),
                    shipping_city: draft.shipping_address.city.clone(),
                    shipping_postal_code: draft.shipping_address.postal_code.clone(),
                    shipping_country: draft.shipping_address.country.clone(),
                    payment_method: draft.payment_method.clone(),
                    items_price: draft.prices.items_price.clone(),
                    shipping_price: draft.prices.shipping_price.clone(),
                    tax_price: draft.prices.tax_price.clone(),
                    total_price: draft.prices.total_price.clone(),
                    created_at: *created_at,
                    updated_at: *created_at,
                })
                .execute(conn)?;

            // 2. Insert items, keeping checkout order
            let new_items: Vec<NewOrderItemRow> = draft
                .items
                .iter()
                .enumerate()
                .map(|(position, item)| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id: *order_id,
                    position: position as i32,
                    product_id: item.product_id,
                    name: item.name.clone(),
                    image: item.image.clone(),
                    price: item.price.clone(),
                    qty: item.qty,
                    vendor_id: item.vendor_id,
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            // 3. Audit event in the same transaction
            let item_payloads: Vec<serde_json::Value> = draft
                .items
                .iter()
                .map(|i| {
                    json!({
                        "product_id": i.product_id,
                        "vendor_id": i.vendor_id,
                        "qty": i.qty,
                        "price": i.price.to_string()
                    })
                })
                .collect();
            diesel::insert_into(order_outbox::table)
                .values(&outbox_event(
                    *order_id,
                    "OrderCreated",
                    json!({
                        "order_id": order_id,
                        "buyer_id": buyer_id,
                        "total_price": draft.prices.total_price.to_string(),
                        "items": item_payloads
                    }),
                ))
                .execute(conn)?;

            // Read back so timestamps carry the column's precision
            load_order(conn, *order_id)?.ok_or_else(|| {
                DomainError::Internal(format!("order {} vanished after insert", order_id))
            })
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        load_order(&mut conn, id)
    }

    fn list_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::buyer_id.eq(buyer_id))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;
        attach_items(&mut conn, rows)
    }

    fn list_by_vendor(&self, vendor_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(
                orders::id.eq_any(
                    order_items::table
                        .filter(order_items::vendor_id.eq(vendor_id))
                        .select(order_items::order_id),
                ),
            )
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;
        attach_items(&mut conn, rows)
    }

    fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;
        attach_items(&mut conn, rows)
    }

    fn mark_paid(
        &self,
        id: Uuid,
        proof: &PaymentProof,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let proof_json = serde_json::to_value(proof).map_err(|e| DomainError::Internal(e.to_string()))?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(
                orders::table
                    .filter(orders::id.eq(id))
                    .filter(orders::is_paid.eq(false)),
            )
            .set((
                orders::is_paid.eq(true),
                orders::paid_at.eq(Some(paid_at)),
                orders::payment_result.eq(Some(proof_json.clone())),
                orders::updated_at.eq(paid_at),
            ))
            .execute(conn)?;

            if updated == 0 {
                return Ok(None);
            }

            diesel::insert_into(order_outbox::table)
                .values(&outbox_event(
                    id,
                    LifecycleEvent::PaymentConfirmed.event_type(),
                    json!({
                        "order_id": id,
                        "paid_at": paid_at,
                        "payment": proof_json
                    }),
                ))
                .execute(conn)?;

            load_order(conn, id)
        })
    }

    fn mark_delivered(&self, id: Uuid, delivered_at: DateTime<Utc>) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(
                orders::table
                    .filter(orders::id.eq(id))
                    .filter(orders::is_paid.eq(true))
                    .filter(orders::is_delivered.eq(false)),
            )
            .set((
                orders::is_delivered.eq(true),
                orders::delivered_at.eq(Some(delivered_at)),
                orders::updated_at.eq(delivered_at),
            ))
            .execute(conn)?;

            if updated == 0 {
                return Ok(None);
            }

            diesel::insert_into(order_outbox::table)
                .values(&outbox_event(
                    id,
                    LifecycleEvent::DeliveryConfirmed.event_type(),
                    json!({
                        "order_id": id,
                        "delivered_at": delivered_at
                    }),
                ))
                .execute(conn)?;

            load_order(conn, id)
        })
    }
}
