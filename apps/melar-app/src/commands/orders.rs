//! # Order Commands
//!
//! Order pages for buyers and sellers. Every status change is checked against
//! the order state machine before a request goes out.
//!
//! ```text
//! buyer   cancel ──► status.transition(Cancelled, Buyer)  ──ok──► POST /orders/{id}/cancel-order/
//! seller  move   ──► status.transition(to, Seller)        ──ok──► PATCH /orders/{id}/ {"status"}
//!                                │
//!                                └──err──► InvalidTransition (nothing sent)
//! ```

use melar_core::order::UserRental;
use melar_core::status::BuyerActions;
use melar_core::{Actor, FeeSchedule, MoneyTotals, Order, OrderStatus};
use melar_store::StoreError;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::state::SubmitGuard;
use crate::App;

/// An order with what its page shows around it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub order: Order,
    /// Fee and tax derived from the stored order total.
    pub invoice: MoneyTotals,
    pub buyer_actions: BuyerActions,
    pub seller_targets: Vec<OrderStatus>,
}

impl OrderView {
    pub fn new(order: Order, fees: &FeeSchedule) -> Self {
        OrderView {
            invoice: fees.totals(order.total_price),
            buyer_actions: order.status.buyer_actions(),
            seller_targets: order.status.seller_targets(),
            order,
        }
    }
}

/// The logged-in user's orders.
pub async fn my_orders(app: &App) -> AppResult<Vec<OrderView>> {
    app.session.require_user().await?;
    let fees = app.cart.fees();
    let orders = app.client.orders().list(None).await?;
    Ok(orders.into_iter().map(|o| OrderView::new(o, &fees)).collect())
}

/// Rental history recorded on this device at checkout.
pub async fn rental_history(app: &App) -> AppResult<Vec<UserRental>> {
    let user = app.session.require_user().await?;
    Ok(app.store.records().user_rentals(&user.id).await?)
}

pub async fn get_order(app: &App, order_id: &str) -> AppResult<OrderView> {
    app.session.require_user().await?;
    let order = app.client.orders().get(order_id).await?;
    Ok(OrderView::new(order, &app.cart.fees()))
}

/// Order actions with one in-flight request at a time.
#[derive(Debug, Clone)]
pub struct OrderActions {
    guard: SubmitGuard,
}

impl Default for OrderActions {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderActions {
    pub fn new() -> Self {
        OrderActions {
            guard: SubmitGuard::new("Order update"),
        }
    }

    /// Buyer cancel. Allowed until the rental starts.
    pub async fn cancel(&self, app: &App, order_id: &str) -> AppResult<OrderView> {
        let _ticket = self.guard.try_begin()?;
        let user = app.session.require_user().await?;

        let current = app.client.orders().get(order_id).await?;
        current.status.transition(OrderStatus::Cancelled, Actor::Buyer)?;

        let order = app.client.orders().cancel(order_id).await?;
        info!(order_id = %order_id, from = %current.status, "Order cancelled");

        if let Err(e) = app
            .store
            .records()
            .set_user_rental_status(&user.id, order_id, order.status)
            .await
        {
            warn!(order_id = %order_id, error = %e, "Could not update rental history");
        }
        Ok(OrderView::new(order, &app.cart.fees()))
    }

    /// Seller status change on an order of their shop.
    pub async fn update_status(
        &self,
        app: &App,
        order_id: &str,
        to: OrderStatus,
    ) -> AppResult<OrderView> {
        let _ticket = self.guard.try_begin()?;
        let (_, shop_id) = app.session.require_shop().await?;

        let current = app.client.orders().get(order_id).await?;
        current.status.transition(to, Actor::Seller)?;

        let order = app.client.orders().update_status(order_id, to).await?;
        info!(order_id = %order_id, from = %current.status, to = %order.status, "Order status updated");

        match app
            .store
            .records()
            .set_shop_order_status(&shop_id, order_id, order.status)
            .await
        {
            Ok(()) | Err(StoreError::NotFound { .. }) => {}
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "Could not update shop order record");
            }
        }
        Ok(OrderView::new(order, &app.cart.fees()))
    }
}
