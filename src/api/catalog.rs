//! Product catalog handlers.

use super::{AppState, extract::AdminSession, success};
use crate::{
    core::product::{self, CatalogProduct, ProductInput},
    entities::product as product_entity,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;

/// GET /api/products - Active products by name
pub async fn list_catalog(State(state): State<AppState>) -> Result<Json<Vec<CatalogProduct>>> {
    Ok(Json(product::list_catalog(&state.db).await?))
}

/// GET /api/products/{id} - One active product
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<product_entity::Model>> {
    Ok(Json(product::get_active_product(&state.db, id).await?))
}

/// GET /api/admin/products - Every product, including inactive ones
pub async fn admin_list(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<product_entity::Model>>> {
    Ok(Json(product::list_all_products(&state.db).await?))
}

/// POST /api/admin/products (also POST /api/products)
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<ProductInput>,
) -> Result<Json<product_entity::Model>> {
    Ok(Json(product::create_product(&state.db, input).await?))
}

/// PUT /api/admin/products/{id}
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
    Json(input): Json<ProductInput>,
) -> Result<Json<product_entity::Model>> {
    Ok(Json(product::update_product(&state.db, id, input).await?))
}

/// DELETE /api/admin/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    product::delete_product(&state.db, id).await?;
    Ok(success())
}
