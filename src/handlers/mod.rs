pub mod dashboard;
pub mod orders;
pub mod principal;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::get_order,
        orders::list_my_orders,
        orders::list_vendor_orders,
        orders::list_all_orders,
        orders::confirm_payment,
        orders::mark_delivered,
        dashboard::dashboard,
    ),
    tags(
        (name = "orders", description = "Order lifecycle"),
        (name = "dashboard", description = "Admin statistics"),
    )
)]
pub struct ApiDoc;
