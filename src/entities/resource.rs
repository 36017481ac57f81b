//! Resource entity - Helpful links and documents for vendors.
//!
//! A resource points at an external `url`, a hosted `file_url`, or both.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Resource database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resources")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the resource
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display title
    pub title: String,
    /// Grouping shown on the resources page
    pub category: String,
    /// Short description
    pub description: Option<String>,
    /// External link
    pub url: Option<String>,
    /// Hosted document
    pub file_url: Option<String>,
    /// When the resource was created
    pub created_at: DateTimeUtc,
    /// When the resource was last changed
    pub updated_at: DateTimeUtc,
}

/// Resources have no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
