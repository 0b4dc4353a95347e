use std::sync::Arc;

use crate::application::dashboard_service::DashboardService;
use crate::application::order_service::OrderService;
use crate::domain::ports::{OrderRepository, UserRepository};

/// Services shared by every request handler.
pub struct AppState {
    pub orders: OrderService<dyn OrderRepository>,
    pub dashboard: DashboardService<dyn OrderRepository, dyn UserRepository>,
}

impl AppState {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        payment_success_statuses: Vec<String>,
    ) -> Self {
        Self {
            orders: OrderService::new(orders.clone(), payment_success_statuses),
            dashboard: DashboardService::new(orders, users),
        }
    }
}
