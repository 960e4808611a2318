use crate::{Order, OrderId};

/// Builder for selecting order rows.
///
/// An empty query selects every order. Results are always ordered by id.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// Filter by order id.
    pub order_id: Option<OrderId>,

    /// Filter by exact order number.
    pub order_number: Option<String>,
}

impl OrderQuery {
    /// Creates a query matching all orders.
    pub fn all() -> Self {
        Self::default()
    }

    /// Creates a query for a single order id.
    pub fn by_id(order_id: OrderId) -> Self {
        Self {
            order_id: Some(order_id),
            ..Default::default()
        }
    }

    /// Creates a query for a single order number.
    pub fn by_number(order_number: impl Into<String>) -> Self {
        Self {
            order_number: Some(order_number.into()),
            ..Default::default()
        }
    }

    /// Returns true if the order row satisfies every filter.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(id) = self.order_id
            && order.id != id
        {
            return false;
        }
        if let Some(ref number) = self.order_number
            && &order.order_number != number
        {
            return false;
        }
        true
    }
}
