//! Order workflow against PostgreSQL
//!
//! Runs the services over `PostgresCatalogStore` so that rollbacks and the
//! unique constraint are exercised on a real database. Run with:
//!
//! ```bash
//! cargo test -p domain --test postgres_service
//! ```

use std::sync::Arc;
use std::time::Duration;

use catalog_store::{
    CatalogStore, CatalogStoreExt, CatalogTransaction, PostgresCatalogStore, ProductId,
};
use domain::{
    CreateOrder, DomainError, OrderLine, OrderService, ProductService, ValidationError,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_catalog_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Both services over one freshly truncated store
async fn create_services() -> (
    ProductService<PostgresCatalogStore>,
    OrderService<PostgresCatalogStore>,
) {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_items, orders, products RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    let store = PostgresCatalogStore::new(pool);
    (ProductService::new(store.clone()), OrderService::new(store))
}

async fn count_rows(store: &PostgresCatalogStore, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn missing_third_line_leaves_no_rows() {
    let (products, orders) = create_services().await;
    let widget = products.add_product("Widget", 9.5).await.unwrap();
    let gadget = products.add_product("Gadget", 1.25).await.unwrap();

    let err = orders
        .create_order(
            CreateOrder::new("A-2", vec![])
                .with_line(widget.id, 2)
                .with_line(gadget.id, 4)
                .with_line(ProductId::new(999), 1),
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "product 999 not found");
    assert!(!orders.store().order_number_exists("A-2").await.unwrap());
    assert_eq!(count_rows(orders.store(), "orders").await, 0);
    assert_eq!(count_rows(orders.store(), "order_items").await, 0);
}

#[tokio::test]
#[serial]
async fn created_order_is_priced_and_hydrated() {
    let (products, orders) = create_services().await;
    let widget = products.add_product("Widget", 9.5).await.unwrap();

    let created = orders
        .create_order(CreateOrder::new("A-1", vec![OrderLine::new(widget.id, 3)]))
        .await
        .unwrap();

    assert_eq!(created.status, "Pending");
    assert_eq!(created.items[0].total_price, 28.5);
    assert_eq!(orders.get_order(created.id).await.unwrap(), created);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn concurrent_creates_with_same_number_yield_one_order() {
    let (products, orders) = create_services().await;
    let widget = products.add_product("Widget", 9.5).await.unwrap();
    let orders = Arc::new(orders);

    let attempts = (0..8).map(|_| {
        let orders = orders.clone();
        let cmd = CreateOrder::new("RACE-1", vec![OrderLine::new(widget.id, 1)]);
        tokio::spawn(async move { orders.create_order(cmd).await })
    });

    let results: Vec<_> = futures_util::future::join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(
            result,
            Err(DomainError::Validation(
                ValidationError::DuplicateOrderNumber { .. }
            ))
        ));
    }

    assert_eq!(count_rows(orders.store(), "orders").await, 1);
    assert_eq!(count_rows(orders.store(), "order_items").await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn unique_constraint_rejects_order_hidden_from_precheck() {
    let (products, orders) = create_services().await;
    let widget = products.add_product("Widget", 9.5).await.unwrap();
    let orders = Arc::new(orders);

    // Uncommitted, so the service's existence check cannot see it.
    let mut competing = orders.store().begin().await.unwrap();
    competing.insert_order("RACE-2", "Pending").await.unwrap();

    let attempt = {
        let orders = orders.clone();
        let cmd = CreateOrder::new("RACE-2", vec![OrderLine::new(widget.id, 1)]);
        tokio::spawn(async move { orders.create_order(cmd).await })
    };

    // Let the service block on the unique index before the competitor commits.
    tokio::time::sleep(Duration::from_millis(300)).await;
    competing.commit().await.unwrap();

    let err = attempt.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::DuplicateOrderNumber { ref order_number })
            if order_number == "RACE-2"
    ));
    assert_eq!(count_rows(orders.store(), "orders").await, 1);
    assert_eq!(count_rows(orders.store(), "order_items").await, 0);
}
