use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::access::{self, Capability};
use crate::domain::aggregate;
use crate::domain::errors::DomainError;
use crate::domain::ports::{OrderRepository, UserRepository};
use crate::domain::principal::Principal;
use crate::domain::stats::{self, MonthBucket};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorSales {
    pub vendor_id: Uuid,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_orders: u64,
    pub total_users: u64,
    pub paid_revenue: BigDecimal,
    pub orders_per_month: Vec<MonthBucket>,
    pub users_per_month: Vec<MonthBucket>,
    pub order_growth_pct: f64,
    pub user_growth_pct: f64,
    /// Paid sales per vendor, highest first.
    pub vendor_sales: Vec<VendorSales>,
}

pub struct DashboardService<R: ?Sized, U: ?Sized> {
    orders: Arc<R>,
    users: Arc<U>,
}

impl<R, U> DashboardService<R, U>
where
    R: OrderRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub fn new(orders: Arc<R>, users: Arc<U>) -> Self {
        Self { orders, users }
    }

    /// Growth figures compare the calendar month of `now` with the month before.
    pub fn summary(&self, principal: &Principal, now: DateTime<Utc>) -> Result<DashboardSummary, DomainError> {
        if !access::has_capability(principal, Capability::ViewDashboard) {
            return Err(DomainError::Forbidden);
        }

        let orders = self.orders.list_all()?;
        let registrations = self.users.registration_dates()?;

        let orders_per_month = stats::monthly_rollup(orders.iter().map(|o| o.created_at));
        let users_per_month = stats::monthly_rollup(registrations.iter().copied());

        let (year, month) = (now.year(), now.month());
        let (prev_year, prev_month) = stats::previous_month(year, month);
        let growth = |buckets: &[MonthBucket]| {
            stats::month_over_month(
                stats::count_for(buckets, prev_year, prev_month),
                stats::count_for(buckets, year, month),
            )
        };

        let mut paid_revenue = BigDecimal::from(0);
        let mut vendor_sales: Vec<VendorSales> = Vec::new();
        for order in orders.iter().filter(|o| o.is_paid) {
            paid_revenue += order.prices.total_price.clone();
            for (vendor_id, subtotal) in aggregate::vendor_subtotals(order) {
                match vendor_sales.iter_mut().find(|s| s.vendor_id == vendor_id) {
                    Some(sales) => sales.total += subtotal,
                    None => vendor_sales.push(VendorSales {
                        vendor_id,
                        total: subtotal,
                    }),
                }
            }
        }
        vendor_sales.sort_by(|a, b| b.total.cmp(&a.total));

        Ok(DashboardSummary {
            total_orders: orders.len() as u64,
            total_users: registrations.len() as u64,
            paid_revenue,
            order_growth_pct: growth(&orders_per_month),
            user_growth_pct: growth(&users_per_month),
            orders_per_month,
            users_per_month,
            vendor_sales,
        })
    }
}
