use async_trait::async_trait;

use crate::{
    NewOrderItem, NewProduct, Order, OrderId, OrderItem, OrderItemRow, OrderQuery, Product,
    ProductId, Result,
};

/// Core trait for catalog store implementations.
///
/// A catalog store persists products, orders and order items. Single-row
/// operations are atomic on their own; multi-row writes that must succeed or
/// fail together go through a [`CatalogTransaction`] obtained from
/// [`CatalogStore::begin`]. All implementations must be thread-safe.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Transaction handle returned by [`CatalogStore::begin`].
    type Transaction: CatalogTransaction;

    /// Starts a new transaction.
    ///
    /// Nothing written through the handle is visible to other callers until
    /// it is committed. Dropping the handle without committing rolls back.
    async fn begin(&self) -> Result<Self::Transaction>;

    /// Lists all products ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Retrieves a product by id.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Inserts a product and returns it with its assigned id.
    async fn insert_product(&self, product: NewProduct) -> Result<Product>;

    /// Replaces the name and unit price of a product.
    ///
    /// Returns None if the product doesn't exist. Existing order items are
    /// not touched.
    async fn update_product(&self, id: ProductId, product: NewProduct)
    -> Result<Option<Product>>;

    /// Retrieves order rows matching a query, ordered by id.
    async fn fetch_orders(&self, query: OrderQuery) -> Result<Vec<Order>>;

    /// Retrieves the items of the given orders, each joined with its product.
    ///
    /// Rows are ordered by order id, then item id.
    async fn fetch_items_for_orders(&self, order_ids: &[OrderId]) -> Result<Vec<OrderItemRow>>;

    /// Overwrites the status of an order.
    ///
    /// Returns None if the order doesn't exist.
    async fn update_order_status(&self, id: OrderId, status: &str) -> Result<Option<Order>>;

    /// Deletes an order together with all of its items.
    ///
    /// Returns false if the order doesn't exist.
    async fn delete_order(&self, id: OrderId) -> Result<bool>;
}

/// Writes that make up one atomic unit of work.
#[async_trait]
pub trait CatalogTransaction: Send {
    /// Inserts an order header and returns it with its generated id.
    ///
    /// Fails with `DuplicateOrderNumber` if the number is already taken.
    async fn insert_order(&mut self, order_number: &str, status: &str) -> Result<Order>;

    /// Retrieves a product by id as seen by this transaction.
    async fn get_product(&mut self, id: ProductId) -> Result<Option<Product>>;

    /// Inserts a line item linked to an order created in this transaction.
    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem>;

    /// Makes all writes of this transaction visible.
    async fn commit(self) -> Result<()>;

    /// Discards all writes of this transaction.
    async fn rollback(self) -> Result<()>;
}

/// Extension trait providing convenience methods for catalog stores.
#[async_trait]
pub trait CatalogStoreExt: CatalogStore {
    /// Retrieves a single order row by id.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self
            .fetch_orders(OrderQuery::by_id(id))
            .await?
            .into_iter()
            .next())
    }

    /// Checks whether an order with this number exists.
    async fn order_number_exists(&self, order_number: &str) -> Result<bool> {
        Ok(!self
            .fetch_orders(OrderQuery::by_number(order_number))
            .await?
            .is_empty())
    }
}

// Blanket implementation for all CatalogStore implementations
impl<T: CatalogStore + ?Sized> CatalogStoreExt for T {}
