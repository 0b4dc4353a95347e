//! HTTP-level tests: the full actix app wired to in-memory record stores.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use agrohub_orders::infrastructure::{InMemoryOrderRepository, InMemoryUserRepository};
use agrohub_orders::{configure, AppState};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

struct Caller {
    id: Uuid,
    role: &'static str,
}

impl Caller {
    fn new(role: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
        }
    }

    fn headers(&self) -> [(&'static str, String); 2] {
        [
            ("X-User-Id", self.id.to_string()),
            ("X-User-Role", self.role.to_string()),
        ]
    }
}

fn state() -> web::Data<AppState> {
    let users = InMemoryUserRepository::default();
    users.register(Utc::now()).expect("register");
    web::Data::new(AppState::new(
        Arc::new(InMemoryOrderRepository::default()),
        Arc::new(users),
        vec!["COMPLETED".to_string()],
    ))
}

fn order_body(x: Uuid, y: Uuid) -> Value {
    json!({
        "order_items": [
            { "product_id": Uuid::new_v4(), "name": "Tomatoes", "image": "/img/tomato.jpg",
              "price": "10", "qty": 2, "vendor_id": x },
            { "product_id": Uuid::new_v4(), "name": "Fertilizer", "image": "/img/npk.jpg",
              "price": "5", "qty": 1, "vendor_id": y }
        ],
        "shipping_address": {
            "address": "7 Market Street", "city": "Kisumu", "postal_code": "40100", "country": "Kenya"
        },
        "payment_method": "PayPal",
        "items_price": "25",
        "shipping_price": "0",
        "tax_price": "3.75",
        "total_price": "28.75"
    })
}

fn payment() -> Value {
    json!({
        "id": "5O190127TN364715T",
        "status": "COMPLETED",
        "update_time": "2024-03-01T10:00:00Z",
        "email_address": "buyer@example.com"
    })
}

macro_rules! call {
    ($app:expr, $req:expr, $caller:expr) => {{
        let mut req = $req;
        for header in $caller.headers() {
            req = req.insert_header(header);
        }
        test::call_service(&$app, req.to_request()).await
    }};
}

#[actix_web::test]
async fn multi_vendor_order_scenario() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let buyer = Caller::new("consumer");
    let farmer = Caller::new("farmer");
    let supplier = Caller::new("supplier");
    let admin = Caller::new("admin");

    let resp = call!(
        app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(farmer.id, supplier.id)),
        buyer
    );
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().expect("id").to_string();
    assert_eq!(created["status"], "created");
    assert_eq!(created["actions"]["can_pay"], true);

    let resp = call!(app, test::TestRequest::get().uri(&format!("/orders/{}", id)), farmer);
    assert_eq!(resp.status(), StatusCode::OK);
    let view: Value = test::read_body_json(resp).await;
    assert_eq!(view["scope"], "vendor");
    assert_eq!(view["subtotal"], "20");
    assert_eq!(view["order_items"].as_array().map(Vec::len), Some(1));
    assert!(view.get("total_price").is_none());

    let resp = call!(app, test::TestRequest::get().uri(&format!("/orders/{}", id)), supplier);
    let view: Value = test::read_body_json(resp).await;
    assert_eq!(view["subtotal"], "5");

    let resp = call!(app, test::TestRequest::get().uri(&format!("/orders/{}", id)), admin);
    let view: Value = test::read_body_json(resp).await;
    assert_eq!(view["scope"], "full");
    assert_eq!(view["order_items"].as_array().map(Vec::len), Some(2));
    assert_eq!(view["total_price"], "28.75");
}

#[actix_web::test]
async fn payment_and_delivery_lifecycle() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let buyer = Caller::new("consumer");
    let admin = Caller::new("admin");

    let resp = call!(
        app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(Uuid::new_v4(), Uuid::new_v4())),
        buyer
    );
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().expect("id").to_string();

    let resp = call!(app, test::TestRequest::put().uri(&format!("/orders/{}/deliver", id)), admin);
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/orders/{}/pay", id))
            .set_json(payment()),
        buyer
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let paid: Value = test::read_body_json(resp).await;
    assert_eq!(paid["is_paid"], true);
    let paid_at = paid["paid_at"].clone();
    assert!(paid_at.is_string());

    // A repeated confirmation is a no-op for the caller.
    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/orders/{}/pay", id))
            .set_json(payment()),
        buyer
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let again: Value = test::read_body_json(resp).await;
    assert_eq!(again["paid_at"], paid_at);

    let resp = call!(app, test::TestRequest::put().uri(&format!("/orders/{}/deliver", id)), buyer);
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = call!(app, test::TestRequest::put().uri(&format!("/orders/{}/deliver", id)), admin);
    assert_eq!(resp.status(), StatusCode::OK);
    let delivered: Value = test::read_body_json(resp).await;
    assert_eq!(delivered["is_delivered"], true);
    assert_eq!(delivered["status"], "delivered");
}

#[actix_web::test]
async fn invalid_requests_are_rejected() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let buyer = Caller::new("consumer");

    let mut empty = order_body(Uuid::new_v4(), Uuid::new_v4());
    empty["order_items"] = json!([]);
    let resp = call!(app, test::TestRequest::post().uri("/orders").set_json(empty), buyer);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Order has no items");

    let mut negative = order_body(Uuid::new_v4(), Uuid::new_v4());
    negative["shipping_price"] = json!("-1");
    let resp = call!(app, test::TestRequest::post().uri("/orders").set_json(negative), buyer);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call!(
        app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(Uuid::new_v4(), Uuid::new_v4())),
        buyer
    );
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().expect("id").to_string();

    let mut declined = payment();
    declined["status"] = json!("DECLINED");
    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/orders/{}/pay", id))
            .set_json(declined),
        buyer
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/orders/{}", id)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/orders/{}", Uuid::new_v4())),
        buyer
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let stranger = Caller::new("consumer");
    let resp = call!(app, test::TestRequest::get().uri(&format!("/orders/{}", id)), stranger);
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn malformed_requests_get_json_errors() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let buyer = Caller::new("consumer");

    let resp = call!(
        app,
        test::TestRequest::post()
            .uri("/orders")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"order_items\": ["),
        buyer
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().expect("reason").starts_with("Invalid request body"));

    let mut bad_qty = order_body(Uuid::new_v4(), Uuid::new_v4());
    bad_qty["order_items"][0]["qty"] = json!("two");
    let resp = call!(app, test::TestRequest::post().uri("/orders").set_json(bad_qty), buyer);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    let resp = call!(app, test::TestRequest::get().uri("/orders/not-a-uuid"), buyer);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().expect("reason").starts_with("Invalid path"));

    let mut long_method = order_body(Uuid::new_v4(), Uuid::new_v4());
    long_method["payment_method"] = json!("M".repeat(60));
    let resp = call!(app, test::TestRequest::post().uri("/orders").set_json(long_method), buyer);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid input: payment method exceeds 50 characters");
}

#[actix_web::test]
async fn listings_respect_roles() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let buyer = Caller::new("consumer");
    let farmer = Caller::new("farmer");
    let admin = Caller::new("admin");

    for _ in 0..2 {
        call!(
            app,
            test::TestRequest::post()
                .uri("/orders")
                .set_json(order_body(farmer.id, Uuid::new_v4())),
            buyer
        );
    }

    let resp = call!(app, test::TestRequest::get().uri("/orders/mine"), buyer);
    let mine: Value = test::read_body_json(resp).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(2));

    let resp = call!(app, test::TestRequest::get().uri("/orders/sales"), farmer);
    let sales: Value = test::read_body_json(resp).await;
    let sales = sales.as_array().expect("array").clone();
    assert_eq!(sales.len(), 2);
    assert!(sales.iter().all(|s| s["subtotal"] == "20"));

    let resp = call!(app, test::TestRequest::get().uri("/orders"), buyer);
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = call!(app, test::TestRequest::get().uri("/orders"), admin);
    let all: Value = test::read_body_json(resp).await;
    assert_eq!(all.as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn dashboard_is_admin_only() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let buyer = Caller::new("consumer");
    let admin = Caller::new("admin");

    call!(
        app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(Uuid::new_v4(), Uuid::new_v4())),
        buyer
    );

    let resp = call!(app, test::TestRequest::get().uri("/dashboard"), buyer);
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = call!(app, test::TestRequest::get().uri("/dashboard"), admin);
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_orders"], 1);
    assert_eq!(body["total_users"], 1);
    assert_eq!(body["orders_per_month"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["paid_revenue"], "0");
}
