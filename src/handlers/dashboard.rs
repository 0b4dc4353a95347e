use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::dashboard_service::DashboardSummary;
use crate::domain::principal::Principal;
use crate::domain::stats::MonthBucket;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthBucketResponse {
    /// e.g. "Mar 2024"
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorSalesResponse {
    pub vendor_id: Uuid,
    pub total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub total_orders: u64,
    pub total_users: u64,
    pub paid_revenue: String,
    pub orders_per_month: Vec<MonthBucketResponse>,
    pub users_per_month: Vec<MonthBucketResponse>,
    /// Change against the previous calendar month; 100 when that month had none.
    pub order_growth_pct: f64,
    pub user_growth_pct: f64,
    pub vendor_sales: Vec<VendorSalesResponse>,
}

impl From<MonthBucket> for MonthBucketResponse {
    fn from(b: MonthBucket) -> Self {
        MonthBucketResponse {
            label: b.label,
            year: b.year,
            month: b.month,
            count: b.count,
        }
    }
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(s: DashboardSummary) -> Self {
        DashboardResponse {
            total_orders: s.total_orders,
            total_users: s.total_users,
            paid_revenue: s.paid_revenue.to_string(),
            orders_per_month: s.orders_per_month.into_iter().map(Into::into).collect(),
            users_per_month: s.users_per_month.into_iter().map(Into::into).collect(),
            order_growth_pct: s.order_growth_pct,
            user_growth_pct: s.user_growth_pct,
            vendor_sales: s
                .vendor_sales
                .into_iter()
                .map(|v| VendorSalesResponse {
                    vendor_id: v.vendor_id,
                    total: v.total.to_string(),
                })
                .collect(),
        }
    }
}

/// GET /dashboard
///
/// Monthly order and sign-up counts for the admin charts.
#[utoipa::path(
    get,
    path = "/dashboard",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "admin"),
    ),
    responses(
        (status = 200, description = "Dashboard figures", body = DashboardResponse),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "dashboard"
)]
pub async fn dashboard(
    state: web::Data<AppState>,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    let summary = web::block(move || state.dashboard.summary(&principal, Utc::now()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(DashboardResponse::from(summary)))
}
