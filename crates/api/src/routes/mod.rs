//! HTTP route handlers and the state they share.

pub mod ops;
pub mod orders;
pub mod products;

use catalog_store::CatalogStore;
use domain::{OrderService, ProductService};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: CatalogStore> {
    pub products: ProductService<S>,
    pub orders: OrderService<S>,
}

impl<S: CatalogStore + Clone> AppState<S> {
    /// Builds both services over one store handle.
    pub fn new(store: S) -> Self {
        Self {
            products: ProductService::new(store.clone()),
            orders: OrderService::new(store),
        }
    }
}

/// Parses a numeric path segment.
pub(crate) fn parse_id(id: &str) -> Result<i64, ApiError> {
    id.trim()
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
