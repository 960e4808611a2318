use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::{
    NewOrderItem, NewProduct, Order, OrderId, OrderItem, OrderItemId, OrderItemRow, OrderQuery,
    Product, ProductId, Result, StoreError,
    store::{CatalogStore, CatalogTransaction},
};

/// The three relations plus their id sequences.
#[derive(Debug, Clone, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    items: BTreeMap<OrderItemId, OrderItem>,
    product_seq: i64,
    order_seq: i64,
    item_seq: i64,
}

fn next_val(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

fn check(condition: bool, constraint: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(StoreError::ConstraintViolation(constraint.to_string()))
    }
}

impl Tables {
    fn insert_product(&mut self, product: NewProduct) -> Result<Product> {
        check(product.unit_price > 0.0, "products_unit_price_check")?;

        let id = ProductId::new(next_val(&mut self.product_seq));
        let row = Product {
            id,
            name: product.name,
            unit_price: product.unit_price,
            created_at: Utc::now(),
        };
        self.products.insert(id, row.clone());
        Ok(row)
    }

    fn insert_order(&mut self, order_number: &str, status: &str) -> Result<Order> {
        // unique constraint on orders.order_number
        if self
            .orders
            .values()
            .any(|o| o.order_number == order_number)
        {
            return Err(StoreError::DuplicateOrderNumber {
                order_number: order_number.to_string(),
            });
        }

        let id = OrderId::new(next_val(&mut self.order_seq));
        let row = Order {
            id,
            order_number: order_number.to_string(),
            status: status.to_string(),
            created_at: Utc::now(),
        };
        self.orders.insert(id, row.clone());
        Ok(row)
    }

    fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        check(item.qty > 0, "order_items_qty_check")?;
        check(
            self.orders.contains_key(&item.order_id),
            "order_items_order_id_fkey",
        )?;
        check(
            self.products.contains_key(&item.product_id),
            "order_items_product_id_fkey",
        )?;

        let id = OrderItemId::new(next_val(&mut self.item_seq));
        let row = OrderItem {
            id,
            order_id: item.order_id,
            product_id: item.product_id,
            qty: item.qty,
            total_price: item.total_price,
        };
        self.items.insert(id, row.clone());
        Ok(row)
    }
}

/// In-memory catalog store implementation for testing.
///
/// This implementation keeps all rows in memory and provides the same
/// interface and constraint behaviour as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of order item rows stored.
    pub async fn item_count(&self) -> usize {
        self.tables.read().await.items.len()
    }

    /// Clears all rows and resets the id sequences.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction> {
        // Holding the write guard serializes transactions against each other
        // and against every other write.
        let guard = self.tables.clone().write_owned().await;
        let staged = (*guard).clone();
        Ok(InMemoryTransaction { guard, staged })
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.values().cloned().collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        self.tables.write().await.insert_product(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: NewProduct,
    ) -> Result<Option<Product>> {
        check(product.unit_price > 0.0, "products_unit_price_check")?;

        let mut tables = self.tables.write().await;
        Ok(tables.products.get_mut(&id).map(|row| {
            row.name = product.name;
            row.unit_price = product.unit_price;
            row.clone()
        }))
    }

    async fn fetch_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .filter(|o| query.matches(o))
            .cloned()
            .collect())
    }

    async fn fetch_items_for_orders(&self, order_ids: &[OrderId]) -> Result<Vec<OrderItemRow>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .items
            .values()
            .filter(|item| order_ids.contains(&item.order_id))
            .filter_map(|item| {
                tables.products.get(&item.product_id).map(|product| OrderItemRow {
                    item: item.clone(),
                    product: product.clone(),
                })
            })
            .collect();
        rows.sort_by_key(|row| (row.item.order_id, row.item.id));
        Ok(rows)
    }

    async fn update_order_status(&self, id: OrderId, status: &str) -> Result<Option<Order>> {
        let mut tables = self.tables.write().await;
        Ok(tables.orders.get_mut(&id).map(|row| {
            row.status = status.to_string();
            row.clone()
        }))
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.orders.remove(&id).is_none() {
            return Ok(false);
        }
        // ON DELETE CASCADE
        tables.items.retain(|_, item| item.order_id != id);
        Ok(true)
    }
}

/// Transaction over the in-memory store.
///
/// Writes go to a private copy of the tables that replaces the shared state
/// on commit. The exclusive lock is held until the handle is consumed or
/// dropped.
pub struct InMemoryTransaction {
    guard: OwnedRwLockWriteGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl CatalogTransaction for InMemoryTransaction {
    async fn insert_order(&mut self, order_number: &str, status: &str) -> Result<Order> {
        self.staged.insert_order(order_number, status)
    }

    async fn get_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.staged.products.get(&id).cloned())
    }

    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        self.staged.insert_order_item(item)
    }

    async fn commit(self) -> Result<()> {
        let Self { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CatalogStoreExt;

    async fn store_with_widget() -> (InMemoryCatalogStore, Product) {
        let store = InMemoryCatalogStore::new();
        let widget = store
            .insert_product(NewProduct::new("Widget", 9.5))
            .await
            .unwrap();
        (store, widget)
    }

    async fn create_order(
        store: &InMemoryCatalogStore,
        order_number: &str,
        product: &Product,
        qty: i32,
    ) -> Order {
        let mut tx = store.begin().await.unwrap();
        let order = tx.insert_order(order_number, "Pending").await.unwrap();
        tx.insert_order_item(NewOrderItem {
            order_id: order.id,
            product_id: product.id,
            qty,
            total_price: product.unit_price * f64::from(qty),
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();
        order
    }

    #[tokio::test]
    async fn products_get_sequential_ids() {
        let store = InMemoryCatalogStore::new();
        let a = store.insert_product(NewProduct::new("A", 1.0)).await.unwrap();
        let b = store.insert_product(NewProduct::new("B", 2.0)).await.unwrap();

        assert_eq!(a.id, ProductId::new(1));
        assert_eq!(b.id, ProductId::new(2));

        let listed = store.list_products().await.unwrap();
        assert_eq!(listed, vec![a, b]);
    }

    #[tokio::test]
    async fn non_positive_price_violates_check() {
        let store = InMemoryCatalogStore::new();
        let result = store.insert_product(NewProduct::new("Free", 0.0)).await;
        assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let (store, widget) = store_with_widget().await;
        let order = create_order(&store, "A-1", &widget, 3).await;

        let orders = store.fetch_orders(OrderQuery::all()).await.unwrap();
        assert_eq!(orders, vec![order.clone()]);

        let items = store.fetch_items_for_orders(&[order.id]).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item.total_price, 28.5);
        assert_eq!(items[0].product, widget);
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let (store, widget) = store_with_widget().await;

        {
            let mut tx = store.begin().await.unwrap();
            let order = tx.insert_order("A-1", "Pending").await.unwrap();
            tx.insert_order_item(NewOrderItem {
                order_id: order.id,
                product_id: widget.id,
                qty: 1,
                total_price: widget.unit_price,
            })
            .await
            .unwrap();
        }

        assert!(!store.order_number_exists("A-1").await.unwrap());
        assert_eq!(store.item_count().await, 0);
    }

    #[tokio::test]
    async fn explicit_rollback_discards_writes() {
        let store = InMemoryCatalogStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_order("A-1", "Pending").await.unwrap();
        tx.rollback().await.unwrap();

        assert!(store.fetch_orders(OrderQuery::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_order_number_is_rejected() {
        let (store, widget) = store_with_widget().await;
        create_order(&store, "A-1", &widget, 1).await;

        let mut tx = store.begin().await.unwrap();
        let result = tx.insert_order("A-1", "Pending").await;
        assert!(matches!(
            result,
            Err(StoreError::DuplicateOrderNumber { ref order_number }) if order_number == "A-1"
        ));
    }

    #[tokio::test]
    async fn item_requires_existing_product() {
        let store = InMemoryCatalogStore::new();
        let mut tx = store.begin().await.unwrap();
        let order = tx.insert_order("A-1", "Pending").await.unwrap();

        let result = tx
            .insert_order_item(NewOrderItem {
                order_id: order.id,
                product_id: ProductId::new(999),
                qty: 1,
                total_price: 1.0,
            })
            .await;
        assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn delete_cascades_to_items() {
        let (store, widget) = store_with_widget().await;
        let first = create_order(&store, "A-1", &widget, 1).await;
        let second = create_order(&store, "A-2", &widget, 2).await;

        assert!(store.delete_order(first.id).await.unwrap());
        assert!(!store.delete_order(first.id).await.unwrap());

        assert!(store.get_order(first.id).await.unwrap().is_none());
        assert!(
            store
                .fetch_items_for_orders(&[first.id])
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            store
                .fetch_items_for_orders(&[second.id])
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn update_product_leaves_item_totals_alone() {
        let (store, widget) = store_with_widget().await;
        let order = create_order(&store, "A-1", &widget, 3).await;

        let updated = store
            .update_product(widget.id, NewProduct::new("Widget", 20.0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.unit_price, 20.0);

        let items = store.fetch_items_for_orders(&[order.id]).await.unwrap();
        assert_eq!(items[0].item.total_price, 28.5);
        assert_eq!(items[0].product.unit_price, 20.0);
    }

    #[tokio::test]
    async fn update_status_of_missing_order() {
        let store = InMemoryCatalogStore::new();
        let result = store
            .update_order_status(OrderId::new(1), "Shipped")
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
