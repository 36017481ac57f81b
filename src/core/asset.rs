//! Brand asset business logic - Downloadable logos, templates, and guides.

use crate::{
    core::{non_blank, required},
    entities::{Asset, asset},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Request body for creating or updating an asset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetInput {
    /// Display title
    pub title: String,
    /// Grouping shown on the assets page
    pub category: String,
    /// Short description
    pub description: Option<String>,
    /// Download link
    pub file_url: String,
}

/// Lists all assets grouped by category, then title.
pub async fn list_assets(db: &DatabaseConnection) -> Result<Vec<asset::Model>> {
    Asset::find()
        .order_by_asc(asset::Column::Category)
        .order_by_asc(asset::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn get_asset(db: &DatabaseConnection, asset_id: i64) -> Result<asset::Model> {
    Asset::find_by_id(asset_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Asset", asset_id))
}

/// Creates an asset. Title, category, and file URL are required.
pub async fn create_asset(db: &DatabaseConnection, input: AssetInput) -> Result<asset::Model> {
    let now = chrono::Utc::now();
    let asset = asset::ActiveModel {
        title: Set(required("Title", &input.title)?),
        category: Set(required("Category", &input.category)?),
        description: Set(non_blank(input.description)),
        file_url: Set(required("File URL", &input.file_url)?),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let asset = asset.insert(db).await?;
    info!(asset_id = asset.id, "Created asset {}", asset.title);
    Ok(asset)
}

/// Replaces an asset's fields.
pub async fn update_asset(
    db: &DatabaseConnection,
    asset_id: i64,
    input: AssetInput,
) -> Result<asset::Model> {
    let title = required("Title", &input.title)?;
    let category = required("Category", &input.category)?;
    let file_url = required("File URL", &input.file_url)?;
    let mut asset: asset::ActiveModel = get_asset(db, asset_id).await?.into();

    asset.title = Set(title);
    asset.category = Set(category);
    asset.description = Set(non_blank(input.description));
    asset.file_url = Set(file_url);
    asset.updated_at = Set(chrono::Utc::now());

    asset.update(db).await.map_err(Into::into)
}

/// Deletes an asset.
pub async fn delete_asset(db: &DatabaseConnection, asset_id: i64) -> Result<()> {
    let result = Asset::delete_by_id(asset_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Asset", asset_id));
    }
    info!(asset_id, "Deleted asset");
    Ok(())
}
