//! Integration tests for the cart and checkout flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - A seeded catalog (cargo run -p orchard-cli -- seed)
//! - The storefront server running (cargo run -p orchard-storefront)
//!
//! Run with: cargo test -p orchard-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use orchard_integration_tests::{
    base_url, first_product_id, register_fresh_account, session_client,
};

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_cart_starts_empty() {
    let client = session_client();

    let resp = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("bad json");
    assert_eq!(cart["total_items"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_add_update_remove_flow() {
    let client = session_client();
    let product_id = first_product_id(&client)
        .await
        .expect("catalog must be seeded");

    // Add the same product twice: one line, quantity 2
    for _ in 0..2 {
        let resp = client
            .post(format!("{}/cart/items", base_url()))
            .json(&json!({ "product_id": product_id }))
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("request failed");
    let cart: Value = resp.json().await.expect("bad json");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["total_items"], 2);

    // Quantity below 1 is a no-op
    let resp = client
        .put(format!("{}/cart/items", base_url()))
        .json(&json!({ "product_id": product_id, "quantity": 0 }))
        .send()
        .await
        .expect("request failed");
    let cart: Value = resp.json().await.expect("bad json");
    assert_eq!(cart["total_items"], 2);

    // Explicit removal empties the cart
    let resp = client
        .delete(format!("{}/cart/items/{product_id}", base_url()))
        .send()
        .await
        .expect("request failed");
    let cart: Value = resp.json().await.expect("bad json");
    assert_eq!(cart["total_items"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_adding_unknown_product_is_not_found() {
    let client = session_client();

    let resp = client
        .post(format!("{}/cart/items", base_url()))
        .json(&json!({ "product_id": 999_999 }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_checkout_requires_authentication() {
    let client = session_client();

    let resp = client
        .post(format!("{}/checkout", base_url()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_empty_cart_cannot_check_out() {
    let client = session_client();
    register_fresh_account(&client).await;

    let resp = client
        .post(format!("{}/checkout", base_url()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_checkout_creates_order_and_clears_cart() {
    let client = session_client();
    register_fresh_account(&client).await;
    let product_id = first_product_id(&client)
        .await
        .expect("catalog must be seeded");

    let resp = client
        .post(format!("{}/cart/items", base_url()))
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{}/checkout", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("bad json");
    assert_eq!(body["order"]["status"], "pending");
    let order_id = body["order"]["id"].as_str().expect("order id").to_owned();

    // The cart was cleared
    let resp = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("request failed");
    let cart: Value = resp.json().await.expect("bad json");
    assert_eq!(cart["total_items"], 0);

    // The order shows up in history
    let resp = client
        .get(format!("{}/api/orders/{order_id}", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}
