//! POTM application entity - A vendor's request to be featured in a month.

use sea_orm::entity::prelude::*;
use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

/// Review state of an application
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Awaiting review
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted; the month is reserved for it
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Declined
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// POTM application database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "potm_applications")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Applicant
    pub user_id: i64,
    /// Requested month, `YYYY-MM`
    pub month_key: String,
    /// Company to feature
    pub company_name: String,
    /// Person to contact about the feature
    pub contact_name: String,
    /// Contact email
    pub contact_email: String,
    /// Product to feature
    pub product_name: String,
    /// Pitch for the product
    pub description: String,
    /// Product page link
    pub link: Option<String>,
    /// Anything else the applicant wants to add
    pub notes: Option<String>,
    /// Review state
    pub status: ApplicationStatus,
    /// When the application was submitted
    pub created_at: DateTimeUtc,
    /// When the application was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `PotmApplication` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each application belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
