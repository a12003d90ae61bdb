//! Application services.

pub mod analytics;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
