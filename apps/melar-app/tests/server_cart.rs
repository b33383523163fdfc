//! Logged-in cart backed by `/cart/` and `/cart-items/`.

use chrono::NaiveDate;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use httpmock::Mock;
use melar_app::commands::account;
use melar_app::state::CartSource;
use melar_app::{App, AppConfig, ErrorCode};
use melar_core::forms::{BillingDetails, LoginForm};
use melar_core::{Money, Product, RentalPeriod};
use melar_store::{Store, StoreConfig};
use serde_json::{json, Value};

fn item(id: i64, product_id: i64, quantity: i64, shop_name: &str) -> Value {
    json!({
        "id": id,
        "product_detail": {
            "id": product_id,
            "name": format!("Product {}", product_id),
            "price": "10.00",
            "shop_name": shop_name
        },
        "quantity": quantity,
        "start_date": "2024-01-01",
        "end_date": "2024-01-02"
    })
}

fn cart_body(items: Vec<Value>) -> Value {
    json!({"id": 1, "items": items})
}

fn mock_cart<'a>(server: &'a MockServer, items: Vec<Value>) -> Mock<'a> {
    let body = cart_body(items);
    server.mock(move |when, then| {
        when.method(GET).path("/api/v1/cart/");
        then.status(200).json_body(body);
    })
}

/// Logs in against a backend whose cart currently holds `items`.
async fn logged_in<'a>(server: &'a MockServer, items: Vec<Value>) -> (App, Mock<'a>) {
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/auth/login/");
        then.status(200).json_body(json!({"key": "tok-123"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/auth/user/");
        then.status(200).json_body(json!({
            "pk": 5,
            "username": "rina",
            "email": "rina@example.com"
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/profiles/");
        then.status(200).json_body(json!([]));
    });
    let cart = mock_cart(server, items);

    let mut config = AppConfig::default();
    config.api.base_url = server.url("/api/v1");
    let store = Store::open(StoreConfig::in_memory()).await.unwrap();
    let app = App::with_store(config, store).await.unwrap();
    account::login(&app, &LoginForm::new("rina", "secret123"), None)
        .await
        .unwrap();
    (app, cart)
}

fn product(id: i64) -> Product {
    serde_json::from_value(json!({"id": id, "name": format!("Product {}", id), "price": "10.00"}))
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

fn mock_product_owner(server: &MockServer, product_id: i64, shop_id: i64, shop_name: &str) {
    let body = json!({
        "id": product_id,
        "name": format!("Product {}", product_id),
        "price": "10.00",
        "owner_info": {"id": shop_id, "name": shop_name}
    });
    server.mock(move |when, then| {
        when.method(GET).path(format!("/api/v1/products/{}/", product_id));
        then.status(200).json_body(body);
    });
}

#[tokio::test]
async fn add_change_and_remove_go_through_the_server() {
    let server = MockServer::start();
    let (app, mut cart) = logged_in(&server, vec![]).await;
    assert_eq!(app.cart.source().await, CartSource::Server);

    let added = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/cart-items/")
            .header("Authorization", "Token tok-123")
            .body_contains("\"quantity\":2")
            .body_contains("\"start_date\":\"2024-01-01\"");
        then.status(201).json_body(item(90, 7, 2, "Kamera Bandung"));
    });
    cart.delete();
    cart = mock_cart(&server, vec![item(90, 7, 2, "Kamera Bandung")]);

    let view = app.cart.add(&product(7), period(), 2).await.unwrap();
    added.assert();
    assert_eq!(view.source, CartSource::Server);
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].line_id, "90");
    assert_eq!(view.items[0].quantity, 2);

    let patched = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/v1/cart-items/90/")
            .json_body(json!({"quantity": 3}));
        then.status(200).json_body(item(90, 7, 3, "Kamera Bandung"));
    });
    cart.delete();
    cart = mock_cart(&server, vec![item(90, 7, 3, "Kamera Bandung")]);

    let view = app.cart.update_quantity("90", 3).await.unwrap();
    patched.assert();
    assert_eq!(view.items[0].quantity, 3);
    assert_eq!(view.totals.money.subtotal, Money::parse("60.00").unwrap());

    let deleted = server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/cart-items/90/");
        then.status(204);
    });
    cart.delete();
    mock_cart(&server, vec![]);

    let view = app.cart.remove("90").await.unwrap();
    deleted.assert();
    assert!(view.items.is_empty());
    assert_eq!(view.source, CartSource::Server);

    // The device cart is never written while the server holds the cart.
    assert!(app.store.cart().load().await.unwrap().is_empty());
}

#[tokio::test]
async fn refused_change_leaves_the_cart_as_it_was() {
    let server = MockServer::start();
    let (app, cart) = logged_in(&server, vec![item(90, 7, 2, "Kamera Bandung")]).await;
    let before = app.cart.view().await;

    let patched = server.mock(|when, then| {
        when.method(PATCH).path("/api/v1/cart-items/90/");
        then.status(400)
            .json_body(json!({"detail": "Only 2 units are available."}));
    });
    let added = server.mock(|when, then| {
        when.method(POST).path("/api/v1/cart-items/");
        then.status(400)
            .json_body(json!({"detail": "Product is not available."}));
    });

    let err = app.cart.update_quantity("90", 5).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Rejected);
    let err = app.cart.add(&product(8), period(), 1).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Rejected);
    patched.assert();
    added.assert();

    let after = app.cart.view().await;
    assert_eq!(after.items, before.items);
    assert_eq!(after.totals, before.totals);
    assert_eq!(after.source, CartSource::Server);
    // No refresh after a refusal, and no silent switch to the device cart.
    cart.assert_hits(1);
    assert!(app.store.cart().load().await.unwrap().is_empty());
}

#[tokio::test]
async fn checkout_groups_server_lines_by_resolved_shop_id() {
    let server = MockServer::start();
    let (app, mut cart) = logged_in(&server, vec![item(90, 7, 1, "Kamera Bandung")]).await;
    assert_eq!(app.cart.view().await.items[0].seller_id, None);

    mock_product_owner(&server, 7, 3, "Kamera Bandung");
    let order = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/orders/")
            .body_contains("\"product_id\":\"7\"");
        then.status(201)
            .json_body(json!({"id": 41, "total_price": "20.00", "status": "pending_whatsapp", "items": []}));
    });
    let shop = server.mock(|when, then| {
        when.method(GET).path("/api/v1/shops/3/");
        then.status(200).json_body(json!({
            "id": 3,
            "name": "Kamera Bandung",
            "phone_number": "0812-9999-0000"
        }));
    });
    let deleted = server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/cart-items/90/");
        then.status(204);
    });
    cart.delete();
    cart = mock_cart(&server, vec![]);

    let outcome = app.checkout.submit(&app, &billing()).await.unwrap();

    order.assert();
    shop.assert();
    deleted.assert();
    cart.assert();
    assert!(outcome.is_complete());
    assert_eq!(outcome.submitted[0].seller_id, "3");
    assert!(outcome
        .whatsapp_url
        .unwrap()
        .starts_with("https://wa.me/6281299990000?text="));
    assert!(app.cart.view().await.items.is_empty());

    let records = app.store.records();
    assert_eq!(records.shop_orders("3").await.unwrap().len(), 1);
    assert!(records.shop_orders("Kamera Bandung").await.unwrap().is_empty());
}

#[tokio::test]
async fn shops_sharing_a_name_get_separate_orders() {
    let server = MockServer::start();
    let (app, _cart) = logged_in(
        &server,
        vec![item(90, 7, 1, "Kamera Bandung"), item(91, 8, 1, "Kamera Bandung")],
    )
    .await;

    mock_product_owner(&server, 7, 3, "Kamera Bandung");
    mock_product_owner(&server, 8, 4, "Kamera Bandung");
    let first = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/orders/")
            .body_contains("\"product_id\":\"7\"");
        then.status(201)
            .json_body(json!({"id": 41, "total_price": "20.00", "status": "pending_whatsapp", "items": []}));
    });
    let second = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/orders/")
            .body_contains("\"product_id\":\"8\"");
        then.status(201)
            .json_body(json!({"id": 42, "total_price": "20.00", "status": "pending_whatsapp", "items": []}));
    });
    server.mock(|when, then| {
        when.method(DELETE).path_contains("/api/v1/cart-items/");
        then.status(204);
    });

    let outcome = app.checkout.submit(&app, &billing()).await.unwrap();

    first.assert();
    second.assert();
    assert_eq!(outcome.order_ids(), vec!["41".to_string(), "42".to_string()]);
    // Two shops, so the confirmation goes to the platform number.
    assert!(outcome
        .whatsapp_url
        .unwrap()
        .starts_with("https://wa.me/6281234567890?text="));

    let records = app.store.records();
    assert_eq!(records.shop_orders("3").await.unwrap().len(), 1);
    assert_eq!(records.shop_orders("4").await.unwrap().len(), 1);
}
