//! Home content entity - Singleton row holding the landing page hero copy.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Home content database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "home_content")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Hero heading
    pub hero_title: String,
    /// Hero paragraph
    pub hero_text: String,
    /// When the copy was last modified
    pub updated_at: DateTimeUtc,
}

/// `HomeContent` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
