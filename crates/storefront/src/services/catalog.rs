//! Catalog service: cached reads over the product repository.
//!
//! Listing pages are cached for a short TTL keyed by the full query; any
//! catalog write drops the whole cache. Single-product reads go straight to
//! the database - they back cart adds, where staleness would be visible.

use sqlx::PgPool;

use orchard_core::{CategoryId, ProductId};

use crate::config::CatalogConfig;
use crate::db::products::{CategoryRepository, ProductRepository};
use crate::db::RepositoryError;
use crate::models::product::{Category, NewProduct, Product, ProductPage, ProductPatch, ProductQuery};

/// Cache key covering every listing parameter.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct ListKey {
    page: u32,
    limit: u32,
    search: Option<String>,
    category: Option<String>,
}

impl From<&ProductQuery> for ListKey {
    fn from(query: &ProductQuery) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            search: query.search.clone(),
            category: query.category.clone(),
        }
    }
}

/// Cached catalog reads plus admin-side writes.
pub struct CatalogService {
    pool: PgPool,
    pages: moka::future::Cache<ListKey, ProductPage>,
}

impl CatalogService {
    /// Create the service with the configured cache TTL.
    #[must_use]
    pub fn new(pool: PgPool, config: &CatalogConfig) -> Self {
        let pages = moka::future::Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Self { pool, pages }
    }

    /// List products, serving repeated queries from cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the underlying query fails.
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, RepositoryError> {
        let key = ListKey::from(query);
        if let Some(page) = self.pages.get(&key).await {
            return Ok(page);
        }

        let page = ProductRepository::new(&self.pool).list(query).await?;
        self.pages.insert(key, page.clone()).await;
        Ok(page)
    }

    /// Get a product by ID (uncached).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).get(id).await
    }

    /// Create a product and invalidate cached pages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let product = ProductRepository::new(&self.pool).create(new).await?;
        self.pages.invalidate_all();
        Ok(product)
    }

    /// Update a product and invalidate cached pages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, RepositoryError> {
        let product = ProductRepository::new(&self.pool).update(id, patch).await?;
        self.pages.invalidate_all();
        Ok(product)
    }

    /// Delete a product and invalidate cached pages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let deleted = ProductRepository::new(&self.pool).delete(id).await?;
        if deleted {
            self.pages.invalidate_all();
        }
        Ok(deleted)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        CategoryRepository::new(&self.pool).list().await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    pub async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        CategoryRepository::new(&self.pool).create(name).await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        CategoryRepository::new(&self.pool).delete(id).await
    }
}
