//! # Checkout
//!
//! Turns the cart into one backend order per seller and hands the buyer a
//! WhatsApp confirmation link.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  submit(billing)                                                        │
//! │    │                                                                    │
//! │    ├─ SubmitGuard ──busy──► ErrorCode::Busy                             │
//! │    ├─ billing.field_errors() ──any──► ValidationError (nothing sent)    │
//! │    ├─ session ──none──► NotAuthenticated                                │
//! │    ├─ cart ──empty──► CartError                                         │
//! │    ├─ lines without a shop id ──► GET /products/{id}/ owner_info        │
//! │    ▼                                                                    │
//! │  partition_by_seller ──► [group A] [group B] ...                        │
//! │    │                                                                    │
//! │    ▼ for each group, in cart order                                      │
//! │  OrderDraft ──► POST /orders/ ──ok──► record rental + shop order        │
//! │                      │                                                  │
//! │                      └──err──► FailedGroup (lines stay in the cart)     │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  remove submitted lines ──► wa.me link ──► CheckoutOutcome              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Groups are independent. A failed group does not undo the groups created
//! before it, and nothing is retried automatically.

use std::collections::HashMap;

use melar_core::forms::BillingDetails;
use melar_core::order::{ShopOrderRecord, UserRental};
use melar_core::whatsapp::{build_message, pick_target, wa_link, ConfirmationInput};
use melar_core::{
    partition_by_seller, CartLineItem, CoreError, Money, Order, OrderDraft, Product,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::commands::catalog::get_product;
use crate::commands::shops::get_shop;
use crate::error::{AppError, AppResult};
use crate::events::NavigationEvent;
use crate::state::SubmitGuard;
use crate::App;

/// One order the backend accepted.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedOrder {
    pub order_id: String,
    pub draft_id: String,
    pub seller_id: String,
    pub seller_name: Option<String>,
    pub total: Money,
}

/// One seller group the backend refused. Its lines are still in the cart.
#[derive(Debug, Clone, Serialize)]
pub struct FailedGroup {
    pub seller_id: String,
    pub seller_name: Option<String>,
    pub line_ids: Vec<String>,
    pub error: AppError,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub submitted: Vec<SubmittedOrder>,
    pub failed: Vec<FailedGroup>,
    pub whatsapp_url: Option<String>,
    /// Present when at least one order was created.
    pub event: Option<NavigationEvent>,
}

impl CheckoutOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.submitted.is_empty()
    }

    pub fn order_ids(&self) -> Vec<String> {
        self.submitted.iter().map(|o| o.order_id.clone()).collect()
    }
}

/// Checkout with a double-submit guard.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    guard: SubmitGuard,
}

impl Default for CheckoutService {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutService {
    pub fn new() -> Self {
        CheckoutService {
            guard: SubmitGuard::new("Checkout"),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_in_flight()
    }

    pub async fn submit(&self, app: &App, billing: &BillingDetails) -> AppResult<CheckoutOutcome> {
        let _ticket = self.guard.try_begin()?;

        let errors = billing.field_errors();
        if !errors.is_empty() {
            return Err(AppError::from_field_errors(errors));
        }
        let buyer = app.session.buyer_identity().await?;

        let mut cart = app.cart.snapshot().await;
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        resolve_sellers(app, &mut cart.items).await;
        let single_seller = cart.single_seller().map(str::to_string);

        let groups = partition_by_seller(&cart.items);
        debug!(groups = groups.len(), lines = cart.items.len(), "Submitting checkout");

        let mut submitted = Vec::new();
        let mut submitted_lines: Vec<CartLineItem> = Vec::new();
        let mut orders: Vec<Order> = Vec::new();
        let mut failed = Vec::new();

        for group in &groups {
            let draft = OrderDraft::from_group(group, &buyer, billing);
            match app.client.orders().create(&draft.to_payload()).await {
                Ok(order) => {
                    info!(
                        order_id = %order.id,
                        draft_id = %draft.id,
                        seller_id = %draft.seller_id,
                        total = %order.total_price,
                        "Order created"
                    );
                    record_order(app, &draft, &order).await;
                    submitted.push(SubmittedOrder {
                        order_id: order.id.clone(),
                        draft_id: draft.id.clone(),
                        seller_id: draft.seller_id.clone(),
                        seller_name: draft.seller_name.clone(),
                        total: order.total_price,
                    });
                    submitted_lines.extend(draft.items.iter().cloned());
                    orders.push(order);
                }
                Err(e) => {
                    warn!(seller_id = %group.seller_id, error = %e, "Order group rejected");
                    failed.push(FailedGroup {
                        seller_id: group.seller_id.clone(),
                        seller_name: group.seller_name.clone(),
                        line_ids: group.line_ids(),
                        error: e.into(),
                    });
                }
            }
        }

        if submitted.is_empty() {
            return Ok(CheckoutOutcome {
                submitted,
                failed,
                whatsapp_url: None,
                event: None,
            });
        }

        let line_ids: Vec<String> = submitted_lines.iter().map(|l| l.line_id.clone()).collect();
        if let Err(e) = app.cart.remove_lines(&line_ids).await {
            warn!(error = %e, "Could not remove checked-out lines from the cart");
        }

        let order_refs: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
        let shop_phone = match single_seller {
            Some(shop_id) => shop_phone(app, &shop_id).await,
            None => None,
        };
        let checkout = &app.config.checkout;
        let target = pick_target(shop_phone.as_deref(), &checkout.admin_whatsapp);
        let message = build_message(&ConfirmationInput {
            order_refs: &order_refs,
            billing,
            items: &submitted_lines,
            estimated_total: orders.iter().map(|o| o.total_price).sum(),
            currency_symbol: &checkout.currency_symbol,
        });
        let whatsapp_url = wa_link(&target, &message);

        info!(
            orders = submitted.len(),
            failed = failed.len(),
            target = %target,
            "Checkout finished"
        );

        let event = NavigationEvent::OrderPlaced {
            order_ids: order_refs,
            whatsapp_url: Some(whatsapp_url.clone()),
        };
        Ok(CheckoutOutcome {
            submitted,
            failed,
            whatsapp_url: Some(whatsapp_url),
            event: Some(event),
        })
    }
}

/// Looks up the owning shop of lines that arrived without a shop id
/// (server cart entries only name the shop). Lines whose product cannot be
/// loaded keep no seller and go to the unknown-seller group.
async fn resolve_sellers(app: &App, items: &mut [CartLineItem]) {
    let mut products: HashMap<String, Option<Product>> = HashMap::new();

    for line in items.iter_mut().filter(|l| l.seller_id.is_none()) {
        if !products.contains_key(&line.product_id) {
            let product = match get_product(app, &line.product_id).await {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(product_id = %line.product_id, error = %e, "Could not resolve shop for cart line");
                    None
                }
            };
            products.insert(line.product_id.clone(), product);
        }
        if let Some(Some(product)) = products.get(&line.product_id) {
            line.resolve_seller(product);
        }
    }
}

/// Writes the buyer's rental history entry and the seller's order record.
/// Both are local mirrors; failures are logged and checkout carries on.
async fn record_order(app: &App, draft: &OrderDraft, order: &Order) {
    let records = app.store.records();

    let mut rental = UserRental::from_draft(draft, &order.id);
    rental.status = order.status;
    if let Err(e) = records.record_user_rental(&draft.buyer.user_id, &rental).await {
        warn!(order_id = %order.id, error = %e, "Could not record rental history");
    }

    if draft.seller_id == melar_core::UNKNOWN_SELLER {
        return;
    }
    let mut record = ShopOrderRecord::from_draft(draft, &order.id);
    record.status = order.status;
    if let Err(e) = records.record_shop_order(&draft.seller_id, &record).await {
        warn!(order_id = %order.id, error = %e, "Could not record shop order");
    }
}

/// Phone of the shop, from the backend or the last snapshot.
async fn shop_phone(app: &App, shop_id: &str) -> Option<String> {
    match get_shop(app, shop_id).await {
        Ok(shop) => shop.phone_number.filter(|p| !p.trim().is_empty()),
        Err(e) => {
            debug!(shop_id = %shop_id, error = %e, "Shop phone unknown, using admin number");
            None
        }
    }
}
