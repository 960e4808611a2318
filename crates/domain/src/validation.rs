//! Input normalization and business-rule checks.
//!
//! Length limits mirror the column sizes in the schema.

use catalog_store::ProductId;

use crate::error::ValidationError;

pub const PRODUCT_NAME_MAX_LEN: usize = 100;
pub const ORDER_NUMBER_MAX_LEN: usize = 50;
pub const STATUS_MAX_LEN: usize = 20;

fn trimmed(
    value: &str,
    max: usize,
    empty: ValidationError,
    too_long: fn(usize) -> ValidationError,
) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(empty);
    }
    if value.chars().count() > max {
        return Err(too_long(max));
    }
    Ok(value.to_string())
}

/// Trims an order number and checks it is present and fits the column.
pub fn order_number(value: &str) -> Result<String, ValidationError> {
    trimmed(
        value,
        ORDER_NUMBER_MAX_LEN,
        ValidationError::OrderNumberRequired,
        |max| ValidationError::OrderNumberTooLong { max },
    )
}

/// Trims a product name and checks it is present and fits the column.
pub fn product_name(value: &str) -> Result<String, ValidationError> {
    trimmed(
        value,
        PRODUCT_NAME_MAX_LEN,
        ValidationError::ProductNameRequired,
        |max| ValidationError::ProductNameTooLong { max },
    )
}

/// Trims an order status and checks it is present and fits the column.
pub fn status(value: &str) -> Result<String, ValidationError> {
    trimmed(
        value,
        STATUS_MAX_LEN,
        ValidationError::StatusRequired,
        |max| ValidationError::StatusTooLong { max },
    )
}

pub fn unit_price(price: f64) -> Result<f64, ValidationError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(ValidationError::InvalidPrice { price })
    }
}

pub fn quantity(product_id: ProductId, qty: i32) -> Result<i32, ValidationError> {
    if qty > 0 {
        Ok(qty)
    } else {
        Err(ValidationError::InvalidQuantity { product_id, qty })
    }
}
