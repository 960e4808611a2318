//! Domain error types.

use catalog_store::{OrderId, ProductId, StoreError};
use thiserror::Error;

/// Caller input that breaks a business rule.
///
/// Nothing written by the rejected request is kept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("order number required")]
    OrderNumberRequired,

    #[error("order number longer than {max} characters")]
    OrderNumberTooLong { max: usize },

    #[error("duplicate order number: {order_number}")]
    DuplicateOrderNumber { order_number: String },

    #[error("order must contain at least one item")]
    NoItems,

    #[error("invalid quantity {qty} for product {product_id} (must be greater than 0)")]
    InvalidQuantity { product_id: ProductId, qty: i32 },

    #[error("total price for product {product_id} is out of range")]
    TotalOutOfRange { product_id: ProductId },

    #[error("product name required")]
    ProductNameRequired,

    #[error("product name longer than {max} characters")]
    ProductNameTooLong { max: usize },

    #[error("invalid unit price {price} (must be greater than 0)")]
    InvalidPrice { price: f64 },

    #[error("status required")]
    StatusRequired,

    #[error("status longer than {max} characters")]
    StatusTooLong { max: usize },
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request was rejected by a business rule.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced product or order does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The store failed or rejected the operation.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl DomainError {
    pub fn product_not_found(id: ProductId) -> Self {
        DomainError::NotFound {
            entity: "product",
            id: id.as_i64(),
        }
    }

    pub fn order_not_found(id: OrderId) -> Self {
        DomainError::NotFound {
            entity: "order",
            id: id.as_i64(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            // The unique constraint caught a duplicate the pre-check missed.
            StoreError::DuplicateOrderNumber { order_number } => {
                DomainError::Validation(ValidationError::DuplicateOrderNumber { order_number })
            }
            other => DomainError::Store(other),
        }
    }
}
