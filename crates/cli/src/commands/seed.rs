//! Seed the catalog with sample categories and products.

use rust_decimal::Decimal;
use tracing::info;

use orchard_storefront::db::{CategoryRepository, ProductRepository, RepositoryError};
use orchard_storefront::models::product::NewProduct;

const CATEGORIES: &[&str] = &["pantry", "preserves", "orchard"];

/// Sample products: (name, description, price in cents, category).
const PRODUCTS: &[(&str, &str, i64, &str)] = &[
    (
        "Raw Honey",
        "500g jar of raw wildflower honey from our own hives",
        1450,
        "pantry",
    ),
    (
        "Plum Jam",
        "Small-batch jam from late-season blood plums",
        850,
        "preserves",
    ),
    (
        "Apple Cider Vinegar",
        "Unfiltered cider vinegar, aged in oak",
        1200,
        "pantry",
    ),
    (
        "Heritage Apple Box",
        "Mixed 2kg box of heritage apple varieties",
        1800,
        "orchard",
    ),
    (
        "Quince Paste",
        "Traditional quince paste for the cheese board",
        950,
        "preserves",
    ),
];

/// Insert sample categories and products.
///
/// Existing categories are left alone; products are inserted as new rows.
///
/// # Errors
///
/// Returns an error if the database connection or any insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let categories = CategoryRepository::new(&pool);
    for name in CATEGORIES {
        match categories.create(name).await {
            Ok(category) => info!("Created category `{}`", category.name),
            Err(RepositoryError::Conflict(_)) => info!("Category `{name}` already exists"),
            Err(e) => return Err(e.into()),
        }
    }

    let products = ProductRepository::new(&pool);
    for (name, description, price_cents, category) in PRODUCTS {
        let product = products
            .create(&NewProduct {
                name: (*name).to_string(),
                description: (*description).to_string(),
                price: Decimal::new(*price_cents, 2),
                image_url: None,
                category: Some((*category).to_string()),
            })
            .await?;
        info!("Created product `{}` (id {})", product.name, product.id);
    }

    info!("Seeding complete!");
    Ok(())
}
