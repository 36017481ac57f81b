//! Promotion entity - Marketing programs shown on the promotions carousel.
//!
//! `content_json` holds a free-form JSON object (overview, how it works,
//! timeline, ...) rendered by the promotion detail page.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Promotion database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promotions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the promotion
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display title
    pub title: String,
    /// Link target of the call to action
    pub url: String,
    /// Teaser text
    pub blurb: String,
    /// Banner image
    pub image_url: Option<String>,
    /// Call to action label
    pub cta_label: Option<String>,
    /// Listed publicly when true
    pub active: bool,
    /// JSON object with the detail page sections
    pub content_json: String,
    /// When the promotion was created
    pub created_at: DateTimeUtc,
    /// When the promotion was last changed
    pub updated_at: DateTimeUtc,
}

/// Promotions have no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
