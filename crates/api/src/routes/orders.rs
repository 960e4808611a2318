//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog_store::{CatalogStore, OrderId, ProductId};
use domain::{CreateOrder, OrderItemView, OrderLine, OrderView};
use serde::{Deserialize, Serialize};

use super::products::ProductResponse;
use super::{AppState, parse_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub order_number: String,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub qty: i32,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub order_number: String,
    pub status: String,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: i64,
    pub qty: i32,
    pub total_price: f64,
    pub product: ProductResponse,
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(item: OrderItemView) -> Self {
        Self {
            id: item.id.as_i64(),
            product_id: item.product_id.as_i64(),
            qty: item.qty,
            total_price: item.total_price,
            product: item.product.into(),
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        Self {
            id: order.id.as_i64(),
            order_number: order.order_number,
            status: order.status,
            created_at: order.created_at.to_rfc3339(),
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

impl From<CreateOrderRequest> for CreateOrder {
    fn from(req: CreateOrderRequest) -> Self {
        let items = req
            .items
            .into_iter()
            .map(|item| OrderLine::new(ProductId::new(item.product_id), item.qty))
            .collect();
        CreateOrder::new(req.order_number, items)
    }
}

// -- Handlers --

/// GET /api/orders: list all orders with their items.
#[tracing::instrument(skip(state))]
pub async fn list<S: CatalogStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.list_orders().await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// POST /api/orders: create an order and its items atomically.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CatalogStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = state.orders.create_order(req.into()).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /api/orders/{id}: load a single order with its items.
#[tracing::instrument(skip(state))]
pub async fn get<S: CatalogStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::new(parse_id(&id)?);
    let order = state.orders.get_order(order_id).await?;
    Ok(Json(order.into()))
}

/// PATCH /api/orders/{id}/status: overwrite the order status.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: CatalogStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::new(parse_id(&id)?);
    let order = state.orders.update_status(order_id, &req.status).await?;
    Ok(Json(order.into()))
}

/// DELETE /api/orders/{id}: delete an order and its items.
#[tracing::instrument(skip(state))]
pub async fn delete<S: CatalogStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id = OrderId::new(parse_id(&id)?);
    state.orders.delete_order(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
