//! Catalog product operations.

use catalog_store::{CatalogStore, NewProduct, Product, ProductId};

use crate::error::DomainError;
use crate::validation;

/// Service for managing catalog products.
pub struct ProductService<S: CatalogStore> {
    store: S,
}

impl<S: CatalogStore> ProductService<S> {
    /// Creates a new product service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists all products ordered by id.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.store.list_products().await?)
    }

    /// Adds a product to the catalog.
    ///
    /// The name is trimmed and must be non-empty; the price must be positive.
    #[tracing::instrument(skip(self))]
    pub async fn add_product(&self, name: &str, unit_price: f64) -> Result<Product, DomainError> {
        let product = NewProduct::new(
            validation::product_name(name)?,
            validation::unit_price(unit_price)?,
        );

        let product = self.store.insert_product(product).await?;
        metrics::counter!("products_created_total").increment(1);
        tracing::info!(product_id = %product.id, "product added");
        Ok(product)
    }

    /// Loads a product by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, DomainError> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| DomainError::product_not_found(id))
    }

    /// Replaces a product's name and unit price.
    ///
    /// Line items created earlier keep the total they were priced at.
    #[tracing::instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        name: &str,
        unit_price: f64,
    ) -> Result<Product, DomainError> {
        let product = NewProduct::new(
            validation::product_name(name)?,
            validation::unit_price(unit_price)?,
        );

        self.store
            .update_product(id, product)
            .await?
            .ok_or_else(|| DomainError::product_not_found(id))
    }
}
