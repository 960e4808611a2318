pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::{OrderId, OrderItemId, ProductId};
pub use error::{Result, StoreError};
pub use memory::{InMemoryCatalogStore, InMemoryTransaction};
pub use model::{
    DEFAULT_ORDER_STATUS, NewOrderItem, NewProduct, Order, OrderItem, OrderItemRow, Product,
};
pub use postgres::{PostgresCatalogStore, PostgresTransaction};
pub use query::OrderQuery;
pub use store::{CatalogStore, CatalogStoreExt, CatalogTransaction};
