//! Order aggregate: commands, hydrated views and the order service.

mod commands;
mod service;
mod view;

pub use commands::{CreateOrder, OrderLine};
pub use service::OrderService;
pub use view::{OrderItemView, OrderView};
