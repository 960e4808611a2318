//! Order service running the create/list/update/delete workflow.

use catalog_store::{
    CatalogStore, CatalogStoreExt, CatalogTransaction, DEFAULT_ORDER_STATUS, NewOrderItem,
    OrderId, OrderItemRow, OrderQuery,
};

use crate::error::{DomainError, ValidationError};
use crate::validation;

use super::view::{self, OrderItemView, OrderView};
use super::CreateOrder;

/// Service for managing orders.
///
/// Owns a handle to the catalog store and enforces the cross-entity rules:
/// order numbers are unique, every line references an existing product, and an
/// order is written together with all of its items or not at all.
pub struct OrderService<S: CatalogStore> {
    store: S,
}

impl<S: CatalogStore> OrderService<S> {
    /// Creates a new order service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an order and its items in a single transaction.
    ///
    /// Each line's `total_price` is computed from the product's unit price at
    /// this moment. Lines are processed in the given order and the first
    /// missing product aborts the whole order.
    #[tracing::instrument(skip(self, cmd), fields(order_number = %cmd.order_number))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<OrderView, DomainError> {
        match self.insert_order(cmd).await {
            Ok(order) => {
                metrics::counter!("orders_created_total").increment(1);
                tracing::info!(order_id = %order.id, "order created");
                Ok(order)
            }
            Err(err) => {
                metrics::counter!("orders_rejected_total").increment(1);
                tracing::warn!(error = %err, "order rejected");
                Err(err)
            }
        }
    }

    /// Writes the order and its items, returning them as read inside the
    /// transaction.
    async fn insert_order(&self, cmd: CreateOrder) -> Result<OrderView, DomainError> {
        let order_number = validation::order_number(&cmd.order_number)?;

        if self.store.order_number_exists(&order_number).await? {
            return Err(ValidationError::DuplicateOrderNumber { order_number }.into());
        }

        if cmd.items.is_empty() {
            return Err(ValidationError::NoItems.into());
        }
        for line in &cmd.items {
            validation::quantity(line.product_id, line.qty)?;
        }

        // Any early return below drops `tx`, which rolls it back.
        let mut tx = self.store.begin().await?;
        let order = tx.insert_order(&order_number, DEFAULT_ORDER_STATUS).await?;
        let mut items = Vec::with_capacity(cmd.items.len());

        for line in &cmd.items {
            let Some(product) = tx.get_product(line.product_id).await? else {
                tx.rollback().await?;
                return Err(DomainError::product_not_found(line.product_id));
            };

            let total_price = product.unit_price * f64::from(line.qty);
            if !total_price.is_finite() {
                tx.rollback().await?;
                return Err(ValidationError::TotalOutOfRange {
                    product_id: line.product_id,
                }
                .into());
            }

            let item = tx
                .insert_order_item(NewOrderItem {
                    order_id: order.id,
                    product_id: product.id,
                    qty: line.qty,
                    total_price,
                })
                .await?;
            items.push(OrderItemView::from(OrderItemRow { item, product }));
        }

        tx.commit().await?;
        Ok(OrderView::new(order, items))
    }

    /// Lists all orders by id, each with its items and their products.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderView>, DomainError> {
        view::load(&self.store, OrderQuery::all()).await
    }

    /// Loads a single hydrated order.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderView, DomainError> {
        view::load(&self.store, OrderQuery::by_id(order_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::order_not_found(order_id))
    }

    /// Overwrites the status label of an order.
    ///
    /// Any non-empty label is accepted; there is no transition graph.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        new_status: &str,
    ) -> Result<OrderView, DomainError> {
        if self.store.get_order(order_id).await?.is_none() {
            return Err(DomainError::order_not_found(order_id));
        }

        let status = validation::status(new_status)?;

        self.store
            .update_order_status(order_id, &status)
            .await?
            .ok_or_else(|| DomainError::order_not_found(order_id))?;

        metrics::counter!("order_status_updates_total").increment(1);
        tracing::info!(%order_id, %status, "order status updated");
        self.get_order(order_id).await
    }

    /// Deletes an order and all of its items.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), DomainError> {
        if !self.store.delete_order(order_id).await? {
            return Err(DomainError::order_not_found(order_id));
        }

        metrics::counter!("orders_deleted_total").increment(1);
        tracing::info!(%order_id, "order deleted");
        Ok(())
    }
}
