//! # Seller Dashboard
//!
//! Figures for the overview tab and the order list filter.
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬──────────────┐
//! │  Products    │  Orders      │  Revenue     │  Pending     │
//! │  shop list   │  all orders  │  completed   │  per-status  │
//! │  length      │  of the shop │  totals only │  counts      │
//! └──────────────┴──────────────┴──────────────┴──────────────┘
//! ```

use melar_core::{Money, Order, OrderStatus, Product};
use serde::Serialize;
use tracing::debug;

use crate::commands::shops::{shop_orders, shop_products};
use crate::error::AppResult;
use crate::App;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub shop_id: String,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub revenue: Money,
    /// Every status in lifecycle order, including zero counts.
    pub status_counts: Vec<(OrderStatus, usize)>,
}

impl DashboardSummary {
    pub fn count(&self, status: OrderStatus) -> usize {
        self.status_counts
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, n)| *n)
    }
}

/// Sum of the totals of completed orders.
pub fn revenue(orders: &[Order]) -> Money {
    orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .map(|o| o.total_price)
        .sum()
}

pub fn status_counts(orders: &[Order]) -> Vec<(OrderStatus, usize)> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| (status, orders.iter().filter(|o| o.status == status).count()))
        .collect()
}

/// Orders with the given status, or all of them for `None`.
pub fn filter_by_status(orders: &[Order], status: Option<OrderStatus>) -> Vec<Order> {
    orders
        .iter()
        .filter(|o| status.map_or(true, |s| o.status == s))
        .cloned()
        .collect()
}

pub async fn load_dashboard(app: &App, shop_id: &str) -> AppResult<DashboardSummary> {
    let orders = shop_orders(app, shop_id).await?;
    let products = shop_products(app, shop_id).await?;

    let summary = DashboardSummary {
        shop_id: shop_id.to_string(),
        revenue: revenue(&orders),
        status_counts: status_counts(&orders),
        products,
        orders,
    };
    debug!(
        shop_id = %shop_id,
        products = summary.products.len(),
        orders = summary.orders.len(),
        revenue = %summary.revenue,
        "Dashboard loaded"
    );
    Ok(summary)
}
