//! Order commands.

use catalog_store::ProductId;

/// One requested line of a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub qty: i32,
}

impl OrderLine {
    pub fn new(product_id: ProductId, qty: i32) -> Self {
        Self { product_id, qty }
    }
}

/// Command to create an order together with its line items.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// Caller-supplied business key, unique across orders.
    pub order_number: String,

    /// Requested lines, processed in this order.
    pub items: Vec<OrderLine>,
}

impl CreateOrder {
    /// Creates a new CreateOrder command.
    pub fn new(order_number: impl Into<String>, items: Vec<OrderLine>) -> Self {
        Self {
            order_number: order_number.into(),
            items,
        }
    }

    /// Appends a line to the command.
    pub fn with_line(mut self, product_id: ProductId, qty: i32) -> Self {
        self.items.push(OrderLine::new(product_id, qty));
        self
    }
}
