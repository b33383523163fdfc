//! Application flows against a mock backend and an in-memory store.

use chrono::NaiveDate;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use melar_app::commands::{account, catalog, checkout::CheckoutService};
use melar_app::state::{CartSource, ViewGuard};
use melar_app::{App, AppConfig, ErrorCode};
use melar_core::forms::{BillingDetails, LoginForm};
use melar_core::{OrderStatus, Product, ProductFilter, RentalPeriod};
use melar_store::{Store, StoreConfig};
use serde_json::json;

fn config_for(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = server.url("/api/v1");
    config
}

async fn start(server: &MockServer) -> App {
    let store = Store::open(StoreConfig::in_memory()).await.unwrap();
    App::with_store(config_for(server), store).await.unwrap()
}

/// Login endpoints plus a cart server that is down, so the local cart is used.
fn mock_login(server: &MockServer, shop_id: Option<i64>) {
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/auth/login/");
        then.status(200).json_body(json!({"key": "tok-123"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/auth/user/");
        then.status(200).json_body(json!({
            "pk": 5,
            "username": "rina",
            "email": "rina@example.com",
            "first_name": "Rina",
            "last_name": "Wijaya"
        }));
    });
    let profiles = match shop_id {
        Some(id) => json!([{
            "id": 1,
            "user": {"id": 5, "username": "rina"},
            "has_shop": true,
            "shop_id": id
        }]),
        None => json!([]),
    };
    server.mock(move |when, then| {
        when.method(GET).path("/api/v1/profiles/");
        then.status(200).json_body(profiles);
    });
    server.mock(|when, then| {
        when.path_contains("/api/v1/cart");
        then.status(503);
    });
}

async fn logged_in(server: &MockServer, shop_id: Option<i64>) -> App {
    mock_login(server, shop_id);
    let app = start(server).await;
    account::login(&app, &LoginForm::new("rina", "secret123"), None)
        .await
        .unwrap();
    app
}

fn product(id: i64, price: &str, shop: i64) -> Product {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("Product {}", id),
        "price": price,
        "owner_info": {"id": shop, "name": format!("Shop {}", shop)}
    }))
    .unwrap()
}

fn period() -> RentalPeriod {
    RentalPeriod::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
    )
}

fn billing() -> BillingDetails {
    BillingDetails {
        first_name: "Rina".into(),
        last_name: "Wijaya".into(),
        email: "rina@example.com".into(),
        phone: "081234567890".into(),
        address: "Jl. Merdeka 1".into(),
        city: "Bandung".into(),
        state: "Jawa Barat".into(),
        zip: "40111".into(),
    }
}

fn order_json(id: i64, status: &str, total: &str) -> serde_json::Value {
    json!({"id": id, "total_price": total, "status": status, "items": []})
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
async fn login_persists_session_for_next_start() {
    let server = MockServer::start();
    let app = logged_in(&server, Some(3)).await;

    let user = app.session.current_user().await.unwrap();
    assert_eq!(user.id, "5");
    assert_eq!(user.shop_id.as_deref(), Some("3"));
    assert_eq!(app.cart.source().await, CartSource::Local);

    let restarted = App::with_store(config_for(&server), app.store.clone())
        .await
        .unwrap();
    assert!(restarted.session.is_authenticated().await);
    assert_eq!(
        restarted.session.current_user().await.unwrap().username,
        "rina"
    );
}

#[tokio::test]
async fn logout_clears_local_session_even_if_backend_fails() {
    let server = MockServer::start();
    let app = logged_in(&server, None).await;
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/auth/logout/");
        then.status(500);
    });

    account::logout(&app).await.unwrap();

    assert!(!app.session.is_authenticated().await);
    assert!(app.store.session().load().await.unwrap().is_none());
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn checkout_partial_failure_keeps_failed_group_in_cart() {
    let server = MockServer::start();
    let app = logged_in(&server, None).await;

    app.cart.add(&product(7, "10.00", 3), period(), 1).await.unwrap();
    app.cart.add(&product(8, "20.00", 4), period(), 2).await.unwrap();

    let accepted = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/orders/")
            .header("Authorization", "Token tok-123")
            .body_contains("\"product_id\":\"7\"");
        then.status(201).json_body(order_json(41, "pending_whatsapp", "20.00"));
    });
    let refused = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/orders/")
            .body_contains("\"product_id\":\"8\"");
        then.status(400)
            .json_body(json!({"detail": "Product 8 is not available on these dates."}));
    });

    let outcome = app.checkout.submit(&app, &billing()).await.unwrap();

    accepted.assert();
    refused.assert();
    assert_eq!(outcome.order_ids(), vec!["41".to_string()]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].seller_id, "4");
    assert_eq!(outcome.failed[0].error.code, ErrorCode::Rejected);
    assert!(!outcome.is_complete());

    let url = outcome.whatsapp_url.unwrap();
    assert!(url.starts_with("https://wa.me/6281234567890?text="));

    let remaining = app.cart.view().await.items;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].product_id, "8");

    let rentals = app.store.records().user_rentals("5").await.unwrap();
    assert_eq!(rentals.len(), 1);
    assert_eq!(rentals[0].order_id, "41");
    assert_eq!(app.store.records().shop_orders("3").await.unwrap().len(), 1);
    assert!(app.store.records().shop_orders("4").await.unwrap().is_empty());
}

#[tokio::test]
async fn checkout_single_shop_targets_shop_phone() {
    let server = MockServer::start();
    let app = logged_in(&server, None).await;
    app.cart.add(&product(7, "10.00", 3), period(), 1).await.unwrap();

    server.mock(|when, then| {
        when.method(POST).path("/api/v1/orders/");
        then.status(201).json_body(order_json(41, "pending_whatsapp", "20.00"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/shops/3/");
        then.status(200).json_body(json!({
            "id": 3,
            "name": "Shop 3",
            "phone_number": "0812-9999-0000"
        }));
    });

    let outcome = app.checkout.submit(&app, &billing()).await.unwrap();

    assert!(outcome.is_complete());
    assert!(outcome
        .whatsapp_url
        .unwrap()
        .starts_with("https://wa.me/6281299990000?text="));
    assert!(app.cart.view().await.items.is_empty());
}

#[tokio::test]
async fn checkout_rejects_before_sending() {
    let server = MockServer::start();
    let orders = server.mock(|when, then| {
        when.method(POST).path("/api/v1/orders/");
        then.status(201);
    });

    let anonymous = start(&server).await;
    let err = anonymous
        .checkout
        .submit(&anonymous, &billing())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotAuthenticated);

    let app = logged_in(&server, None).await;
    let err = app.checkout.submit(&app, &billing()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::CartError);

    app.cart.add(&product(7, "10.00", 3), period(), 1).await.unwrap();
    let bad = BillingDetails {
        email: "nope".into(),
        zip: String::new(),
        ..billing()
    };
    let err = CheckoutService::new().submit(&app, &bad).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(err.fields.contains_key("email"));
    assert!(err.fields.contains_key("zip"));

    orders.assert_hits(0);
}

// =============================================================================
// Order actions
// =============================================================================

#[tokio::test]
async fn buyer_cancel_follows_state_machine() {
    let server = MockServer::start();
    let app = logged_in(&server, None).await;

    server.mock(|when, then| {
        when.method(GET).path("/api/v1/orders/41/");
        then.status(200).json_body(order_json(41, "rented_out", "20.00"));
    });
    let refused = server.mock(|when, then| {
        when.method(POST).path("/api/v1/orders/41/cancel-order/");
        then.status(200).json_body(order_json(41, "cancelled", "20.00"));
    });

    let err = app.orders.cancel(&app, "41").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
    refused.assert_hits(0);

    server.mock(|when, then| {
        when.method(GET).path("/api/v1/orders/42/");
        then.status(200).json_body(order_json(42, "pending", "20.00"));
    });
    let cancel = server.mock(|when, then| {
        when.method(POST).path("/api/v1/orders/42/cancel-order/");
        then.status(200).json_body(order_json(42, "cancelled", "20.00"));
    });

    let view = app.orders.cancel(&app, "42").await.unwrap();
    cancel.assert();
    assert_eq!(view.order.status, OrderStatus::Cancelled);
    assert!(!view.buyer_actions.can_cancel);
    assert!(view.seller_targets.is_empty());
}

#[tokio::test]
async fn seller_status_update_is_checked_then_patched() {
    let server = MockServer::start();
    let app = logged_in(&server, Some(3)).await;

    server.mock(|when, then| {
        when.method(GET).path("/api/v1/orders/50/");
        then.status(200).json_body(order_json(50, "confirmed", "100.00"));
    });
    let patch = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/v1/orders/50/")
            .json_body(json!({"status": "active"}));
        then.status(200).json_body(order_json(50, "active", "100.00"));
    });

    let err = app
        .orders
        .update_status(&app, "50", OrderStatus::Pending)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
    patch.assert_hits(0);

    let view = app
        .orders
        .update_status(&app, "50", OrderStatus::Active)
        .await
        .unwrap();
    patch.assert();
    assert_eq!(view.order.status, OrderStatus::Active);
    assert_eq!(
        view.seller_targets,
        vec![OrderStatus::Completed, OrderStatus::Cancelled]
    );
    assert_eq!(view.invoice.grand_total.to_decimal_string(), "115.00");
}

#[tokio::test]
async fn seller_may_cancel_an_active_rental() {
    let server = MockServer::start();
    let app = logged_in(&server, Some(3)).await;

    server.mock(|when, then| {
        when.method(GET).path("/api/v1/orders/51/");
        then.status(200).json_body(order_json(51, "rented_out", "60.00"));
    });
    let patch = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/v1/orders/51/")
            .json_body(json!({"status": "cancelled"}));
        then.status(200).json_body(order_json(51, "cancelled", "60.00"));
    });

    let view = app
        .orders
        .update_status(&app, "51", OrderStatus::Cancelled)
        .await
        .unwrap();

    patch.assert();
    assert_eq!(view.order.status, OrderStatus::Cancelled);
    assert!(view.seller_targets.is_empty());
}

#[tokio::test]
async fn seller_actions_need_a_shop() {
    let server = MockServer::start();
    let app = logged_in(&server, None).await;

    let err = app
        .orders
        .update_status(&app, "50", OrderStatus::Active)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn product_list_falls_back_to_snapshot() {
    let server = MockServer::start();
    let app = start(&server).await;

    let mut listing = server.mock(|when, then| {
        when.method(GET).path("/api/v1/products/");
        then.status(200).json_body(json!([
            {"id": 1, "name": "Camping Tent", "price": "15.00", "available": true},
            {"id": 2, "name": "Sony A7 III", "price": "45.99", "available": false}
        ]));
    });

    let filter = ProductFilter {
        search: Some("tent".into()),
        ..ProductFilter::default()
    };
    let found = catalog::list_products(&app, &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Camping Tent");

    listing.delete();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/products/");
        then.status(503);
    });

    let offline = catalog::list_products(&app, &ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(offline.len(), 2);
}

#[tokio::test]
async fn closed_view_drops_the_listing() {
    let server = MockServer::start();
    let app = start(&server).await;
    let listing = server.mock(|when, then| {
        when.method(GET).path("/api/v1/products/");
        then.status(200)
            .json_body(json!([{"id": 1, "name": "Camping Tent", "price": "15.00"}]));
    });

    let view = ViewGuard::new("products");
    let shown = view
        .load(catalog::list_products(&app, &ProductFilter::default()))
        .await
        .unwrap();
    assert_eq!(shown.map(|ps| ps.len()), Some(1));

    view.deactivate();
    let late = view
        .load(catalog::list_products(&app, &ProductFilter::default()))
        .await
        .unwrap();
    assert!(late.is_none());
    listing.assert_hits(2);
}
