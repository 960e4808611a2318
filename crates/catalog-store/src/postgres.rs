use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, postgres::PgRow};

use crate::{
    NewOrderItem, NewProduct, Order, OrderId, OrderItem, OrderItemId, OrderItemRow, OrderQuery,
    Product, ProductId, Result, StoreError,
    store::{CatalogStore, CatalogTransaction},
};

const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";

/// Maps foreign key and check violations to `ConstraintViolation`.
fn constraint_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_foreign_key_violation() || db_err.is_check_violation())
    {
        return StoreError::ConstraintViolation(
            db_err
                .constraint()
                .unwrap_or_else(|| db_err.message())
                .to_string(),
        );
    }
    StoreError::Database(e)
}

fn row_to_product(row: &PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        unit_price: row.try_get("unit_price")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_order(row: &PgRow) -> Result<Order> {
    Ok(Order {
        id: OrderId::new(row.try_get("id")?),
        order_number: row.try_get("order_number")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_order_item(row: &PgRow) -> Result<OrderItem> {
    Ok(OrderItem {
        id: OrderItemId::new(row.try_get("id")?),
        order_id: OrderId::new(row.try_get("order_id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        qty: row.try_get("qty")?,
        total_price: row.try_get("total_price")?,
    })
}

fn row_to_item_row(row: &PgRow) -> Result<OrderItemRow> {
    let item = row_to_order_item(row)?;
    let product = Product {
        id: item.product_id,
        name: row.try_get("product_name")?,
        unit_price: row.try_get("product_unit_price")?,
        created_at: row.try_get("product_created_at")?,
    };
    Ok(OrderItemRow { item, product })
}

/// PostgreSQL-backed catalog store implementation.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Creates a new PostgreSQL catalog store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        tracing::info!("running catalog schema migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    type Transaction = PostgresTransaction;

    async fn begin(&self) -> Result<PostgresTransaction> {
        let tx = self.pool.begin().await?;
        Ok(PostgresTransaction { tx })
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, unit_price, created_at
            FROM products
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_product).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, unit_price, created_at FROM products WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, unit_price)
            VALUES ($1, $2)
            RETURNING id, name, unit_price, created_at
            "#,
        )
        .bind(&product.name)
        .bind(product.unit_price)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)?;

        row_to_product(&row)
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: NewProduct,
    ) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            UPDATE products SET name = $2, unit_price = $3
            WHERE id = $1
            RETURNING id, name, unit_price, created_at
            "#,
        )
        .bind(id.as_i64())
        .bind(&product.name)
        .bind(product.unit_price)
        .fetch_optional(&self.pool)
        .await
        .map_err(constraint_error)?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn fetch_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let mut sql =
            String::from("SELECT id, order_number, status, created_at FROM orders WHERE 1=1");
        let mut param_count = 0;

        if query.order_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND id = ${param_count}"));
        }
        if query.order_number.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND order_number = ${param_count}"));
        }

        sql.push_str(" ORDER BY id ASC");

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(id) = query.order_id {
            sqlx_query = sqlx_query.bind(id.as_i64());
        }
        if let Some(number) = query.order_number {
            sqlx_query = sqlx_query.bind(number);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_order).collect()
    }

    async fn fetch_items_for_orders(&self, order_ids: &[OrderId]) -> Result<Vec<OrderItemRow>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = order_ids.iter().map(OrderId::as_i64).collect();
        let rows = sqlx::query(
            r#"
            SELECT i.id, i.order_id, i.product_id, i.qty, i.total_price,
                   p.name AS product_name,
                   p.unit_price AS product_unit_price,
                   p.created_at AS product_created_at
            FROM order_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.order_id = ANY($1)
            ORDER BY i.order_id ASC, i.id ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_item_row).collect()
    }

    async fn update_order_status(&self, id: OrderId, status: &str) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            UPDATE orders SET status = $2
            WHERE id = $1
            RETURNING id, order_number, status, created_at
            "#,
        )
        .bind(id.as_i64())
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(constraint_error)?;

        row.as_ref().map(row_to_order).transpose()
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        // order_items rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Transaction over a pooled PostgreSQL connection.
///
/// Dropping the handle without calling `commit` rolls the transaction back.
pub struct PostgresTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl CatalogTransaction for PostgresTransaction {
    async fn insert_order(&mut self, order_number: &str, status: &str) -> Result<Order> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (order_number, status)
            VALUES ($1, $2)
            RETURNING id, order_number, status, created_at
            "#,
        )
        .bind(order_number)
        .bind(status)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some(ORDER_NUMBER_CONSTRAINT)
            {
                return StoreError::DuplicateOrderNumber {
                    order_number: order_number.to_string(),
                };
            }
            constraint_error(e)
        })?;

        row_to_order(&row)
    }

    async fn get_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, unit_price, created_at FROM products WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        let row = sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, qty, total_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, product_id, qty, total_price
            "#,
        )
        .bind(item.order_id.as_i64())
        .bind(item.product_id.as_i64())
        .bind(item.qty)
        .bind(item.total_price)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(constraint_error)?;

        row_to_order_item(&row)
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        tracing::debug!("rolling back catalog transaction");
        self.tx.rollback().await?;
        Ok(())
    }
}
