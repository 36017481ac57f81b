//! Promotions, brand assets, vendor resources, and home page copy.
//!
//! Reads are public; writes need an admin session.

use super::{AppState, extract::AdminSession, success};
use crate::{
    core::{
        asset::{self, AssetInput},
        home::{self, HomeContentInput},
        promotion::{self, PromotionDetail, PromotionInput},
        resource::{self, ResourceInput},
    },
    entities::{
        asset as asset_entity, home_content, promotion as promotion_entity,
        resource as resource_entity,
    },
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;

// Promotions //
//************//

/// GET /api/promotions - Active promotions, newest first
pub async fn list_promotions(
    State(state): State<AppState>,
) -> Result<Json<Vec<promotion_entity::Model>>> {
    Ok(Json(promotion::list_active_promotions(&state.db).await?))
}

/// GET /api/promotions/{id} - One active promotion with decoded content
pub async fn get_promotion(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PromotionDetail>> {
    Ok(Json(promotion::get_active_promotion_detail(&state.db, id).await?))
}

/// GET /api/admin/promotions
pub async fn admin_list_promotions(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<promotion_entity::Model>>> {
    Ok(Json(promotion::list_all_promotions(&state.db).await?))
}

/// POST /api/admin/promotions
pub async fn create_promotion(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<PromotionInput>,
) -> Result<Json<promotion_entity::Model>> {
    Ok(Json(promotion::create_promotion(&state.db, input).await?))
}

/// PUT /api/admin/promotions/{id}
pub async fn update_promotion(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
    Json(input): Json<PromotionInput>,
) -> Result<Json<promotion_entity::Model>> {
    Ok(Json(promotion::update_promotion(&state.db, id, input).await?))
}

/// DELETE /api/admin/promotions/{id}
pub async fn delete_promotion(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    promotion::delete_promotion(&state.db, id).await?;
    Ok(success())
}

// Assets //
//********//

/// GET /api/assets
pub async fn list_assets(State(state): State<AppState>) -> Result<Json<Vec<asset_entity::Model>>> {
    Ok(Json(asset::list_assets(&state.db).await?))
}

/// GET /api/admin/assets
pub async fn admin_list_assets(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<asset_entity::Model>>> {
    Ok(Json(asset::list_assets(&state.db).await?))
}

/// POST /api/admin/assets
pub async fn create_asset(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<AssetInput>,
) -> Result<Json<asset_entity::Model>> {
    Ok(Json(asset::create_asset(&state.db, input).await?))
}

/// PUT /api/admin/assets/{id}
pub async fn update_asset(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
    Json(input): Json<AssetInput>,
) -> Result<Json<asset_entity::Model>> {
    Ok(Json(asset::update_asset(&state.db, id, input).await?))
}

/// DELETE /api/admin/assets/{id}
pub async fn delete_asset(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    asset::delete_asset(&state.db, id).await?;
    Ok(success())
}

// Resources //
//***********//

/// GET /api/resources
pub async fn list_resources(
    State(state): State<AppState>,
) -> Result<Json<Vec<resource_entity::Model>>> {
    Ok(Json(resource::list_resources(&state.db).await?))
}

/// GET /api/admin/resources
pub async fn admin_list_resources(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<resource_entity::Model>>> {
    Ok(Json(resource::list_resources(&state.db).await?))
}

/// POST /api/admin/resources
pub async fn create_resource(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<ResourceInput>,
) -> Result<Json<resource_entity::Model>> {
    Ok(Json(resource::create_resource(&state.db, input).await?))
}

/// PUT /api/admin/resources/{id}
pub async fn update_resource(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
    Json(input): Json<ResourceInput>,
) -> Result<Json<resource_entity::Model>> {
    Ok(Json(resource::update_resource(&state.db, id, input).await?))
}

/// DELETE /api/admin/resources/{id}
pub async fn delete_resource(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    resource::delete_resource(&state.db, id).await?;
    Ok(success())
}

// Home //
//******//

/// GET /api/home
pub async fn get_home(State(state): State<AppState>) -> Result<Json<home_content::Model>> {
    Ok(Json(home::get_home_content(&state.db).await?))
}

/// GET /api/admin/home
pub async fn admin_get_home(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<home_content::Model>> {
    Ok(Json(home::get_home_content(&state.db).await?))
}

/// PUT /api/admin/home
pub async fn update_home(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<HomeContentInput>,
) -> Result<Json<home_content::Model>> {
    Ok(Json(home::update_home_content(&state.db, input).await?))
}
