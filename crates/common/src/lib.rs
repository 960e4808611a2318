//! Shared types used across the catalog and orders crates.

pub mod types;

pub use types::{OrderId, OrderItemId, ProductId};
