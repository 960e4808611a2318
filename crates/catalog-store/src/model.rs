//! Row types for the `products`, `orders` and `order_items` relations.
//!
//! Rows reference each other only through their foreign key fields. Joining an
//! order with its items and products happens explicitly at read time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderItemId, ProductId};

/// Status assigned to every newly created order.
pub const DEFAULT_ORDER_STATUS: &str = "Pending";

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub unit_price: f64,
    pub created_at: DateTime<Utc>,
}

/// Column values for inserting or replacing a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub unit_price: f64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            unit_price,
        }
    }
}

/// An order header row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A line item row. `total_price` is fixed when the row is inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub qty: i32,
    pub total_price: f64,
}

/// Column values for inserting a line item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub qty: i32,
    pub total_price: f64,
}

/// A line item joined with the current state of the product it references.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRow {
    pub item: OrderItem,
    pub product: Product,
}
