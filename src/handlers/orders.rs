use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::access;
use crate::domain::aggregate::{OrderView, VendorView};
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderDraft, OrderItem, PaymentProof, Prices, ShippingAddress};
use crate::domain::principal::Principal;
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub qty: i32,
    pub vendor_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddressDto {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub order_items: Vec<CreateOrderItemRequest>,
    pub shipping_address: ShippingAddressDto,
    pub payment_method: String,
    pub items_price: String,
    pub shipping_price: String,
    pub tax_price: String,
    pub total_price: String,
}

/// Payment record as returned by the payment processor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentProofDto {
    pub id: String,
    pub status: Option<String>,
    pub update_time: Option<String>,
    pub email_address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub price: String,
    pub qty: i32,
    pub vendor_id: Uuid,
}

/// What the caller may do next with the order.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderActions {
    pub can_pay: bool,
    pub can_mark_delivered: bool,
}

/// Which view of an order a response carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseScope {
    Full,
    Vendor,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub scope: ResponseScope,
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub order_items: Vec<OrderItemResponse>,
    pub shipping_address: ShippingAddressDto,
    pub payment_method: String,
    pub items_price: String,
    pub shipping_price: String,
    pub tax_price: String,
    pub total_price: String,
    pub status: String,
    pub is_paid: bool,
    pub paid_at: Option<String>,
    pub payment_result: Option<PaymentProofDto>,
    pub is_delivered: bool,
    pub delivered_at: Option<String>,
    pub created_at: String,
    pub actions: OrderActions,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorOrderResponse {
    pub scope: ResponseScope,
    pub order_id: Uuid,
    pub vendor_id: Uuid,
    pub order_items: Vec<OrderItemResponse>,
    pub subtotal: String,
    pub is_paid: bool,
    pub is_delivered: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum OrderViewResponse {
    Full(OrderResponse),
    Vendor(VendorOrderResponse),
}

// ── Conversions ──────────────────────────────────────────────────────────────

fn parse_decimal(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid {} '{}': {}", field, raw, e)))
}

fn rfc3339(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339())
}

impl CreateOrderRequest {
    pub fn into_draft(self) -> Result<OrderDraft, AppError> {
        let items = self
            .order_items
            .into_iter()
            .map(|i| -> Result<OrderItem, AppError> {
                Ok(OrderItem {
                    price: parse_decimal("price", &i.price)?,
                    product_id: i.product_id,
                    name: i.name,
                    image: i.image,
                    qty: i.qty,
                    vendor_id: i.vendor_id,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderDraft {
            items,
            shipping_address: self.shipping_address.into(),
            payment_method: self.payment_method,
            prices: Prices {
                items_price: parse_decimal("items_price", &self.items_price)?,
                shipping_price: parse_decimal("shipping_price", &self.shipping_price)?,
                tax_price: parse_decimal("tax_price", &self.tax_price)?,
                total_price: parse_decimal("total_price", &self.total_price)?,
            },
        })
    }
}

impl From<ShippingAddressDto> for ShippingAddress {
    fn from(a: ShippingAddressDto) -> Self {
        ShippingAddress {
            address: a.address,
            city: a.city,
            postal_code: a.postal_code,
            country: a.country,
        }
    }
}

impl From<ShippingAddress> for ShippingAddressDto {
    fn from(a: ShippingAddress) -> Self {
        ShippingAddressDto {
            address: a.address,
            city: a.city,
            postal_code: a.postal_code,
            country: a.country,
        }
    }
}

impl From<PaymentProofDto> for PaymentProof {
    fn from(p: PaymentProofDto) -> Self {
        PaymentProof {
            id: p.id,
            status: p.status,
            update_time: p.update_time,
            email_address: p.email_address,
        }
    }
}

impl From<PaymentProof> for PaymentProofDto {
    fn from(p: PaymentProof) -> Self {
        PaymentProofDto {
            id: p.id,
            status: p.status,
            update_time: p.update_time,
            email_address: p.email_address,
        }
    }
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        OrderItemResponse {
            product_id: i.product_id,
            name: i.name,
            image: i.image,
            price: i.price.to_string(),
            qty: i.qty,
            vendor_id: i.vendor_id,
        }
    }
}

impl OrderResponse {
    pub fn new(order: Order, principal: &Principal) -> Self {
        let actions = OrderActions {
            can_pay: access::can_pay(principal, &order),
            can_mark_delivered: access::can_mark_delivered(principal, &order),
        };
        OrderResponse {
            scope: ResponseScope::Full,
            id: order.id,
            buyer_id: order.buyer_id,
            status: order.state().to_string(),
            order_items: order.items.into_iter().map(Into::into).collect(),
            shipping_address: order.shipping_address.into(),
            payment_method: order.payment_method,
            items_price: order.prices.items_price.to_string(),
            shipping_price: order.prices.shipping_price.to_string(),
            tax_price: order.prices.tax_price.to_string(),
            total_price: order.prices.total_price.to_string(),
            is_paid: order.is_paid,
            paid_at: rfc3339(order.paid_at),
            payment_result: order.payment_result.map(Into::into),
            is_delivered: order.is_delivered,
            delivered_at: rfc3339(order.delivered_at),
            created_at: order.created_at.to_rfc3339(),
            actions,
        }
    }
}

impl From<VendorView> for VendorOrderResponse {
    fn from(v: VendorView) -> Self {
        VendorOrderResponse {
            scope: ResponseScope::Vendor,
            order_id: v.order_id,
            vendor_id: v.vendor_id,
            order_items: v.items.into_iter().map(Into::into).collect(),
            subtotal: v.subtotal.to_string(),
            is_paid: v.is_paid,
            is_delivered: v.is_delivered,
            created_at: v.created_at.to_rfc3339(),
        }
    }
}

fn blocking_error(e: actix_web::error::BlockingError) -> AppError {
    AppError::Internal(e.to_string())
}

/// A transition that already happened is not an error for the caller: log it
/// and hand back the order as it stands.
fn settle_repeat(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    result: Result<Order, DomainError>,
) -> Result<Order, DomainError> {
    match result {
        Err(DomainError::AlreadyInState(current)) => {
            log::info!("Order {} is already {}, nothing to do", id, current);
            match state.orders.get_order(principal, id)? {
                OrderView::Full(order) => Ok(order),
                OrderView::Vendor(_) => Err(DomainError::Forbidden),
            }
        }
        other => other,
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an order for the calling user. The order, its items and an
/// `OrderCreated` audit event are written in one transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "consumer, farmer, supplier or admin"),
    ),
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Empty order, invalid prices or address"),
        (status = 401, description = "Missing or malformed principal headers"),
        (status = 503, description = "Record store unavailable"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    principal: Principal,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let draft = body.into_inner().into_draft()?;

    let order = web::block(move || state.orders.create_order(&principal, draft))
        .await
        .map_err(blocking_error)??;

    Ok(HttpResponse::Created().json(OrderResponse::new(order, &principal)))
}

/// GET /orders/{id}
///
/// Buyers and admins receive the whole order; vendors receive only their own
/// items and subtotal.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "consumer, farmer, supplier or admin"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderViewResponse),
        (status = 403, description = "Caller may not see this order"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let view = web::block(move || state.orders.get_order(&principal, order_id))
        .await
        .map_err(blocking_error)??;

    let body = match view {
        OrderView::Full(order) => OrderViewResponse::Full(OrderResponse::new(order, &principal)),
        OrderView::Vendor(view) => OrderViewResponse::Vendor(view.into()),
    };
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/mine
///
/// Orders placed by the caller, newest first.
#[utoipa::path(
    get,
    path = "/orders/mine",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "consumer, farmer, supplier or admin"),
    ),
    responses(
        (status = 200, description = "Caller's orders", body = Vec<OrderResponse>),
    ),
    tag = "orders"
)]
pub async fn list_my_orders(
    state: web::Data<AppState>,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || state.orders.list_my_orders(&principal))
        .await
        .map_err(blocking_error)??;

    let body: Vec<OrderResponse> = orders
        .into_iter()
        .map(|o| OrderResponse::new(o, &principal))
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/sales
///
/// The caller's share of every order containing their produce, newest first.
#[utoipa::path(
    get,
    path = "/orders/sales",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "farmer or supplier"),
    ),
    responses(
        (status = 200, description = "Vendor-scoped orders", body = Vec<VendorOrderResponse>),
        (status = 403, description = "Caller does not sell produce"),
    ),
    tag = "orders"
)]
pub async fn list_vendor_orders(
    state: web::Data<AppState>,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    let views = web::block(move || state.orders.list_vendor_orders(&principal))
        .await
        .map_err(blocking_error)??;

    let body: Vec<VendorOrderResponse> = views.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders
///
/// Every order, newest first. Admin only.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "admin"),
    ),
    responses(
        (status = 200, description = "All orders", body = Vec<OrderResponse>),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "orders"
)]
pub async fn list_all_orders(
    state: web::Data<AppState>,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || state.orders.list_all_orders(&principal))
        .await
        .map_err(blocking_error)??;

    let body: Vec<OrderResponse> = orders
        .into_iter()
        .map(|o| OrderResponse::new(o, &principal))
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /orders/{id}/pay
///
/// Confirms payment with the record returned by the payment processor.
/// Confirming an already paid order returns the order unchanged.
#[utoipa::path(
    put,
    path = "/orders/{id}/pay",
    request_body = PaymentProofDto,
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "consumer, farmer, supplier or admin"),
    ),
    responses(
        (status = 200, description = "Order paid", body = OrderResponse),
        (status = 400, description = "Malformed or unsuccessful payment proof"),
        (status = 403, description = "Caller is not the buyer"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn confirm_payment(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
    body: web::Json<PaymentProofDto>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let proof: PaymentProof = body.into_inner().into();

    let order = web::block(move || {
        let result = state.orders.confirm_payment(&principal, order_id, proof);
        settle_repeat(&state, &principal, order_id, result)
    })
    .await
    .map_err(blocking_error)??;

    Ok(HttpResponse::Ok().json(OrderResponse::new(order, &principal)))
}

/// PUT /orders/{id}/deliver
///
/// Marks a paid order as delivered. Admin only.
#[utoipa::path(
    put,
    path = "/orders/{id}/deliver",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "admin"),
    ),
    responses(
        (status = 200, description = "Order delivered", body = OrderResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not paid yet"),
    ),
    tag = "orders"
)]
pub async fn mark_delivered(
    state: web::Data<AppState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || {
        let result = state.orders.mark_delivered(&principal, order_id);
        settle_repeat(&state, &principal, order_id, result)
    })
    .await
    .map_err(blocking_error)??;

    Ok(HttpResponse::Ok().json(OrderResponse::new(order, &principal)))
}
