//! Order types and the order-writer validation boundary.
//!
//! An [`Order`] is a point-in-time snapshot: its line items and `created_at`
//! never change after the insert, no matter what happens to the live catalog
//! or what later updates touch. [`CreateOrder`] is the only way in, and it is
//! validated fail-fast before anything is written.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orchard_core::{OrderId, OrderStatus, ProductId, UserId};

/// One line of an order: a snapshot copy of a cart line at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quantity: u32,
}

/// Shipping address embedded in an order. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Returns the name of the first blank field, checked in declaration order.
    #[must_use]
    pub fn first_blank_field(&self) -> Option<&'static str> {
        let fields: [(&'static str, &str); 5] = [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];
        fields
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
    }
}

/// A persisted order record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub shipping_address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Input for creating an order.
///
/// Unknown fields are rejected outright rather than silently dropped, so a
/// malformed client payload fails before any persistence attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrder {
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub shipping_address: Address,
}

/// Validation failures for [`CreateOrder`], checked fail-fast in order:
/// items, per-line price/quantity, total, address fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("items are required")]
    MissingItems,
    #[error("item `{name}`: unit price must be positive")]
    NonPositivePrice { name: String },
    #[error("item `{name}`: quantity must be at least 1")]
    ZeroQuantity { name: String },
    #[error("valid total is required")]
    InvalidTotal,
    #[error("shipping address field `{0}` is required")]
    MissingAddressField(&'static str),
}

impl OrderValidationError {
    /// The input field this error points at, for structured error responses.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingItems | Self::NonPositivePrice { .. } | Self::ZeroQuantity { .. } => {
                "items"
            }
            Self::InvalidTotal => "total",
            Self::MissingAddressField(field) => *field,
        }
    }
}

impl CreateOrder {
    /// Validate the draft before persistence.
    ///
    /// # Errors
    ///
    /// Returns the first failing check: missing items, a non-positive line
    /// price, a zero quantity, a non-positive total, or a blank address field.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.items.is_empty() {
            return Err(OrderValidationError::MissingItems);
        }

        for item in &self.items {
            if item.unit_price <= Decimal::ZERO {
                return Err(OrderValidationError::NonPositivePrice {
                    name: item.name.clone(),
                });
            }
            if item.quantity < 1 {
                return Err(OrderValidationError::ZeroQuantity {
                    name: item.name.clone(),
                });
            }
        }

        if self.total <= Decimal::ZERO {
            return Err(OrderValidationError::InvalidTotal);
        }

        if let Some(field) = self.shipping_address.first_blank_field() {
            return Err(OrderValidationError::MissingAddressField(field));
        }

        Ok(())
    }
}

/// Partial update for an order.
///
/// Absent fields are left untouched; line items and `created_at` are not
/// part of the patch surface at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_address() -> Address {
        Address {
            street: "12 Ridge Road".to_string(),
            city: "Mudgee".to_string(),
            state: "NSW".to_string(),
            postal_code: "2850".to_string(),
            country: "Australia".to_string(),
        }
    }

    fn sample_item(name: &str, price: Decimal, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: ProductId::new(1),
            name: name.to_string(),
            unit_price: price,
            image_url: None,
            quantity,
        }
    }

    fn valid_draft() -> CreateOrder {
        CreateOrder {
            items: vec![sample_item("Honey", Decimal::new(1000, 2), 2)],
            total: Decimal::new(2000, 2),
            shipping_address: sample_address(),
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(valid_draft().validate().is_ok());
    }

    #[test]
    fn test_empty_items_rejected_first() {
        let mut draft = valid_draft();
        draft.items.clear();
        draft.total = Decimal::ZERO; // also invalid, but items must win
        assert_eq!(
            draft.validate().unwrap_err(),
            OrderValidationError::MissingItems
        );
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut draft = valid_draft();
        draft.items = vec![sample_item("Freebie", Decimal::ZERO, 1)];
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, OrderValidationError::NonPositivePrice { .. }));
        assert_eq!(err.field(), "items");
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut draft = valid_draft();
        draft.items = vec![sample_item("Honey", Decimal::new(1000, 2), 0)];
        assert!(matches!(
            draft.validate().unwrap_err(),
            OrderValidationError::ZeroQuantity { .. }
        ));
    }

    #[test]
    fn test_non_positive_total_rejected() {
        let mut draft = valid_draft();
        draft.total = Decimal::ZERO;
        let err = draft.validate().unwrap_err();
        assert_eq!(err, OrderValidationError::InvalidTotal);
        assert_eq!(err.field(), "total");
    }

    #[test]
    fn test_blank_city_names_the_field() {
        let mut draft = valid_draft();
        draft.shipping_address.city = String::new();
        let err = draft.validate().unwrap_err();
        assert_eq!(err, OrderValidationError::MissingAddressField("city"));
        assert_eq!(err.field(), "city");
        assert_eq!(
            err.to_string(),
            "shipping address field `city` is required"
        );
    }

    #[test]
    fn test_whitespace_only_address_field_is_blank() {
        let mut draft = valid_draft();
        draft.shipping_address.country = "   ".to_string();
        assert_eq!(
            draft.validate().unwrap_err(),
            OrderValidationError::MissingAddressField("country")
        );
    }

    #[test]
    fn test_create_order_rejects_unknown_fields() {
        let json = r#"{
            "items": [],
            "total": "1.00",
            "shipping_address": {
                "street": "a", "city": "b", "state": "c",
                "postal_code": "d", "country": "e"
            },
            "status": "shipped"
        }"#;
        let result: Result<CreateOrder, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_order_patch_rejects_unknown_fields() {
        let result: Result<OrderPatch, _> =
            serde_json::from_str(r#"{"items": [], "status": "shipped"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_order_patch_accepts_partial_updates() {
        let patch: OrderPatch = serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
        assert_eq!(patch.status, Some(OrderStatus::Processing));
        assert!(patch.tracking_number.is_none());
    }
}
