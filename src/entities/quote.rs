//! Quote entity - A vendor's cart of requested products.
//!
//! A quote starts `pending` and can be edited until the vendor submits it, at
//! which point it becomes `submitted` and is read-only.

use sea_orm::entity::prelude::*;
use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a quote
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    /// Still being assembled; items may be added or removed
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Sent to the admins; no further edits
    #[sea_orm(string_value = "submitted")]
    Submitted,
}

/// Quote database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quotes")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the quote
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the quote
    pub user_id: i64,
    /// Optional label given on submission
    pub name: Option<String>,
    /// Pending or submitted
    pub status: QuoteStatus,
    /// When the quote was created
    pub created_at: DateTimeUtc,
    /// When the quote was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Quote and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each quote belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One quote has many items
    #[sea_orm(has_many = "super::quote_item::Entity")]
    Items,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::quote_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
