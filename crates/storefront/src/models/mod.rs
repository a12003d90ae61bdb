//! Domain models for the storefront.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{Address, CreateOrder, Order, OrderItem, OrderPatch, OrderValidationError};
pub use product::{Category, NewProduct, Product, ProductPage, ProductPatch, ProductQuery};
pub use session::{CurrentUser, session_keys};
pub use user::User;
