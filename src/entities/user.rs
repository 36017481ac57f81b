//! User entity - Portal accounts for vendors and administrators.
//!
//! Vendors optionally belong to a company; that link scopes which quotes and
//! invoices they can see. The password hash is never serialized.

use sea_orm::entity::prelude::*;
use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

/// Role claim carried by every session
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Vendor user browsing the catalog and submitting requests
    #[default]
    #[sea_orm(string_value = "vendor")]
    Vendor,
    /// Administrator managing portal content
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login email, unique across all users
    #[sea_orm(unique)]
    pub email: String,
    /// Display name
    pub name: Option<String>,
    /// bcrypt hash of the password
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Vendor or admin
    pub role: Role,
    /// Company the user acts for, if any
    pub company_id: Option<i64>,
    /// When the user was created
    pub created_at: DateTimeUtc,
    /// When the user was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each user optionally belongs to one company
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
    /// One user has many quotes
    #[sea_orm(has_many = "super::quote::Entity")]
    Quotes,
    /// One user has many POTM applications
    #[sea_orm(has_many = "super::potm_application::Entity")]
    PotmApplications,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::quote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotes.def()
    }
}

impl Related<super::potm_application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PotmApplications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
