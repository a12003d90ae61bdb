//! Integration tests for Orchard Lane.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations + seed
//! cargo run -p orchard-cli -- migrate
//! cargo run -p orchard-cli -- seed
//!
//! # Start the storefront
//! cargo run -p orchard-storefront
//!
//! # Run the ignored integration tests
//! cargo test -p orchard-integration-tests -- --ignored
//! ```
//!
//! Tests talk to a running storefront over HTTP with cookie-holding clients,
//! one fresh account per test.

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("ORCHARD_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create a client with its own cookie jar (its own session).
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Register a fresh account on the given client and return its email.
///
/// # Panics
///
/// Panics if registration does not succeed.
pub async fn register_fresh_account(client: &Client) -> String {
    let email = format!("shopper-{}@example.com", Uuid::new_v4());
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({ "email": email, "password": "orchard-test-pass" }))
        .send()
        .await
        .expect("Failed to register test account");

    assert_eq!(resp.status(), 201, "registration should succeed");
    email
}

/// Fetch the first product id from the catalog, if the catalog is seeded.
///
/// # Panics
///
/// Panics if the catalog request fails.
pub async fn first_product_id(client: &Client) -> Option<i64> {
    let resp = client
        .get(format!("{}/api/products?limit=1", base_url()))
        .send()
        .await
        .expect("Failed to list products");
    assert!(resp.status().is_success());

    let body: Value = resp.json().await.expect("Failed to parse product page");
    body["items"]
        .as_array()
        .and_then(|items| items.first())
        .and_then(|item| item["id"].as_i64())
}
