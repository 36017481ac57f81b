//! Asset entity - Downloadable brand files (logos, guidelines, photography).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Asset database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the asset
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display title
    pub title: String,
    /// Grouping used by the assets page (e.g., "Logos")
    pub category: String,
    /// Optional description
    pub description: Option<String>,
    /// Where the file is hosted
    pub file_url: String,
    /// When the asset was created
    pub created_at: DateTimeUtc,
    /// When the asset was last modified
    pub updated_at: DateTimeUtc,
}

/// `Asset` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
