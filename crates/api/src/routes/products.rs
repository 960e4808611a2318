//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog_store::{CatalogStore, Product, ProductId};
use serde::{Deserialize, Serialize};

use super::{AppState, parse_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub unit_price: f64,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub unit_price: f64,
    pub created_at: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name,
            unit_price: product.unit_price,
            created_at: product.created_at.to_rfc3339(),
        }
    }
}

// -- Handlers --

/// GET /api/products: list the catalog by id.
#[tracing::instrument(skip(state))]
pub async fn list<S: CatalogStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.products.list_products().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// POST /api/products: add a product.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CatalogStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = state
        .products
        .add_product(&req.name, req.unit_price)
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /api/products/{id}: load a single product.
#[tracing::instrument(skip(state))]
pub async fn get<S: CatalogStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = ProductId::new(parse_id(&id)?);
    let product = state.products.get_product(product_id).await?;
    Ok(Json(product.into()))
}

/// PUT /api/products/{id}: replace a product's name and price.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: CatalogStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = ProductId::new(parse_id(&id)?);
    let product = state
        .products
        .update_product(product_id, &req.name, req.unit_price)
        .await?;
    Ok(Json(product.into()))
}
