//! Hydrated read models.
//!
//! An order is returned together with its items, and every item carries the
//! current row of the product it references. Only `total_price` is a snapshot
//! taken when the order was placed.

use std::collections::HashMap;

use catalog_store::{
    CatalogStore, Order, OrderId, OrderItemId, OrderItemRow, OrderQuery, Product, ProductId,
};
use chrono::{DateTime, Utc};

use crate::error::DomainError;

/// A line item joined with its product.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemView {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub qty: i32,
    pub total_price: f64,
    pub product: Product,
}

impl From<OrderItemRow> for OrderItemView {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.item.id,
            product_id: row.item.product_id,
            qty: row.item.qty,
            total_price: row.item.total_price,
            product: row.product,
        }
    }
}

/// An order with all of its items.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub id: OrderId,
    pub order_number: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    pub(crate) fn new(order: Order, items: Vec<OrderItemView>) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            status: order.status,
            created_at: order.created_at,
            items,
        }
    }

    /// Returns the number of line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// Loads the orders matching `query` with their items and products.
///
/// Issues one query for the order rows and one for all of their items, then
/// groups the items by order in memory.
pub(crate) async fn load<S: CatalogStore>(
    store: &S,
    query: OrderQuery,
) -> Result<Vec<OrderView>, DomainError> {
    let orders = store.fetch_orders(query).await?;
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
    let rows = store.fetch_items_for_orders(&order_ids).await?;

    let mut items_by_order: HashMap<OrderId, Vec<OrderItemView>> = HashMap::new();
    for row in rows {
        items_by_order
            .entry(row.item.order_id)
            .or_default()
            .push(OrderItemView::from(row));
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            OrderView::new(order, items)
        })
        .collect())
}
