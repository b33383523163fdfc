//! Endpoint tests against a local mock backend.

use chrono::NaiveDate;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use melar_client::{ApiClient, ClientConfig, ClientError};
use melar_core::forms::{LoginForm, ReviewForm};
use melar_core::{Money, OrderStatus, RentalPeriod};
use serde_json::json;

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientConfig::new(server.url("/api/v1"))).unwrap()
}

async fn logged_in(server: &MockServer) -> ApiClient {
    let client = client_for(server);
    client.set_token(Some("tok-123".into())).await;
    client
}

fn order_json(id: i64, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "items": [{
            "id": 1,
            "product": 7,
            "product_name": "Sony A7 III",
            "quantity": 1,
            "price_per_day_at_rental": "45.99",
            "start_date": "2024-01-01",
            "end_date": "2024-01-03"
        }],
        "total_price": "137.97",
        "status": status,
        "first_name": "Rina",
        "last_name": "Wijaya",
        "email_at_checkout": "rina@example.com",
        "phone_at_checkout": "081234567890",
        "billing_address": "Jl. Merdeka 1",
        "billing_city": "Bandung",
        "billing_state": "Jawa Barat",
        "billing_zip": "40111"
    })
}

#[tokio::test]
async fn login_returns_key() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/auth/login/")
            .json_body(json!({"username": "rina", "password": "secret123"}));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"key": "abc123"}));
    });

    let client = client_for(&server);
    let key = client
        .auth()
        .login(&LoginForm::new("rina", "secret123").payload())
        .await
        .unwrap();

    mock.assert();
    assert_eq!(key, "abc123");
}

#[tokio::test]
async fn login_failure_surfaces_backend_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/auth/login/");
        then.status(400)
            .header("Content-Type", "application/json")
            .json_body(json!({"non_field_errors": ["Unable to log in with provided credentials."]}));
    });

    let err = client_for(&server)
        .auth()
        .login(&LoginForm::new("rina", "wrong").payload())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("Unable to log in"));
}

#[tokio::test]
async fn token_header_is_sent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/auth/user/")
            .header("Authorization", "Token tok-123");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"pk": 12, "username": "rina", "email": "rina@example.com"}));
    });

    let user = logged_in(&server).await.auth().current_user().await.unwrap();

    mock.assert();
    assert_eq!(user.id, "12");
    assert_eq!(user.username, "rina");
}

#[tokio::test]
async fn authenticated_calls_fail_fast_without_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.path("/api/v1/cart/");
        then.status(200);
    });

    let err = client_for(&server).cart().get().await.unwrap_err();

    assert!(matches!(err, ClientError::NotAuthenticated));
    mock.assert_hits(0);
}

#[tokio::test]
async fn product_list_accepts_paged_envelope() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/products/");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "count": 1,
                "next": null,
                "results": [{
                    "id": 7,
                    "name": "Sony A7 III",
                    "price": "45.99",
                    "owner_info": {"id": 3, "name": "Kamera Bandung"}
                }]
            }));
    });

    let products = client_for(&server).catalog().products().await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price, Money::from_cents(4599));
    assert_eq!(products[0].shop_id(), Some("3"));
}

#[tokio::test]
async fn reviews_filter_by_product_and_create() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/reviews/")
            .query_param("product_id", "7");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([{"id": 1, "product": 7, "rating": 5, "comment": "Great"}]));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/reviews/")
            .json_body(json!({"product": "7", "rating": 4, "comment": "Good"}));
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(json!({"id": 2, "product": 7, "rating": 4, "comment": "Good"}));
    });

    let client = logged_in(&server).await;
    let reviews = client.catalog().reviews(Some("7")).await.unwrap();
    let created = client
        .catalog()
        .create_review(&ReviewForm {
            product: "7".into(),
            rating: 4,
            comment: "Good".into(),
        })
        .await
        .unwrap();

    list.assert();
    create.assert();
    assert_eq!(reviews[0].rating, 5);
    assert_eq!(created.id, "2");
}

#[tokio::test]
async fn cart_item_add_sends_rental_period() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/cart-items/")
            .json_body(json!({
                "product_id": "7",
                "quantity": 2,
                "start_date": "2024-01-01",
                "end_date": "2024-01-03"
            }));
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "id": 55,
                "product_detail": {"id": 7, "name": "Sony A7 III", "price": "45.99", "shop_name": "Kamera Bandung"},
                "quantity": 2,
                "start_date": "2024-01-01",
                "end_date": "2024-01-03"
            }));
    });

    let period = RentalPeriod::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
    );
    let item = logged_in(&server)
        .await
        .cart()
        .add_item("7", 2, period)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(item.id, "55");
    assert_eq!(item.quantity, 2);
}

#[tokio::test]
async fn cart_item_delete_accepts_no_content() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/cart-items/55/");
        then.status(204);
    });

    logged_in(&server).await.cart().remove_item("55").await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn orders_list_for_shop_uses_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/orders/")
            .query_param("shop_id", "3");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([order_json(99, "pending")]));
    });

    let orders = logged_in(&server).await.orders().list(Some("3")).await.unwrap();

    mock.assert();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Pending);
    assert_eq!(orders[0].total_price.to_decimal_string(), "137.97");
}

#[tokio::test]
async fn cancel_rejected_by_backend() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/orders/99/cancel-order/");
        then.status(400)
            .header("Content-Type", "application/json")
            .json_body(json!({"detail": "Order with status \"active\" cannot be cancelled."}));
    });

    let err = logged_in(&server).await.orders().cancel("99").await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("cannot be cancelled"));
    assert!(!err.is_unavailable());
}

#[tokio::test]
async fn status_update_patches_order() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/v1/orders/99/")
            .json_body(json!({"status": "confirmed"}));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(order_json(99, "confirmed"));
    });

    let order = logged_in(&server)
        .await
        .orders()
        .update_status("99", OrderStatus::Confirmed)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(order.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn unreachable_backend_is_unavailable() {
    let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:9/api/v1")).unwrap();
    let err = client.catalog().products().await.unwrap_err();
    assert!(err.is_unavailable());
}
