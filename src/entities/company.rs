//! Company entity - Vendor organisations and their billing address.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Company database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the company
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Company display name
    pub name: String,
    /// Billing street address
    pub street: Option<String>,
    /// Billing city
    pub city: Option<String>,
    /// Billing state or region
    pub state: Option<String>,
    /// Billing postal code
    pub zip: Option<String>,
    /// Billing country
    pub country: Option<String>,
    /// When the company was created
    pub created_at: DateTimeUtc,
    /// When the company was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Company and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One company has many users
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
    /// One company has many invoices
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
