//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check (in main)
//! GET  /health/ready            - Readiness check (in main)
//!
//! # Catalog
//! GET    /api/products          - Paginated/filterable product listing
//! POST   /api/products          - Create product (admin)
//! GET    /api/products/{id}     - Product detail
//! PUT    /api/products/{id}     - Update product (admin)
//! DELETE /api/products/{id}     - Delete product (admin)
//! GET    /api/categories        - Category listing
//! POST   /api/categories        - Create category (admin)
//! DELETE /api/categories/{id}   - Delete category (admin)
//!
//! # Cart (session-scoped)
//! GET    /cart                  - Cart view
//! DELETE /cart                  - Clear cart
//! POST   /cart/items            - Add one unit of a product
//! PUT    /cart/items            - Set a line's quantity
//! DELETE /cart/items/{id}       - Remove a line
//! GET    /cart/count            - Item count badge
//!
//! # Checkout
//! POST /checkout                - Convert the cart into an order (auth)
//!
//! # Orders (auth, owner-scoped)
//! GET    /api/orders            - Order history, newest first
//! POST   /api/orders            - Create order from explicit payload
//! GET    /api/orders/{id}       - Order detail
//! PATCH  /api/orders/{id}       - Partial update
//! DELETE /api/orders/{id}       - Delete (pending only)
//!
//! # Auth
//! POST /auth/register           - Register and log in
//! POST /auth/login              - Log in
//! POST /auth/logout             - Log out
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/{id}", delete(categories::remove))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add).put(cart::update))
        .route("/items/{product_id}", delete(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route(
            "/{id}",
            get(orders::show)
                .patch(orders::update)
                .delete(orders::remove),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::submit))
        .nest("/api/orders", order_routes())
        .nest("/auth", auth_routes())
}
