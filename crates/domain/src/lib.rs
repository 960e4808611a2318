//! Domain layer for the catalog and orders service.
//!
//! This crate provides:
//! - ProductService for adding and maintaining catalog products
//! - OrderService for the transactional order workflow
//! - Hydrated read models joining orders, items and products
//! - Input validation shared by both services

pub mod error;
pub mod order;
pub mod product;
pub mod validation;

pub use error::{DomainError, ValidationError};
pub use order::{CreateOrder, OrderItemView, OrderLine, OrderService, OrderView};
pub use product::ProductService;
