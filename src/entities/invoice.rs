//! Invoice entity - Billing documents issued to a company.
//!
//! Invoice numbers follow `INV-<year>-<seq>` and are unique. The `total` column
//! always equals the sum of the invoice's item totals; it is recomputed by
//! `core::invoice` whenever items change. `billing_address` is a JSON object
//! snapshot of the address at issue time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the invoice
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-facing number, e.g. `INV-2026-007`
    #[sea_orm(unique)]
    pub invoice_number: String,
    /// Billed company
    pub company_id: i64,
    /// User the invoice was raised for, if any
    pub user_id: Option<i64>,
    /// Quote the invoice was generated from, if any
    pub quote_id: Option<i64>,
    /// Issue date
    pub invoice_date: Date,
    /// Payment due date
    pub due_date: Option<Date>,
    /// JSON object with street/city/state/zip/country
    pub billing_address: String,
    /// Free-form notes printed on the invoice
    pub notes: Option<String>,
    /// Sum of item totals
    pub total: f64,
    /// When the invoice was created
    pub created_at: DateTimeUtc,
    /// When the invoice was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each invoice is billed to one company
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
    /// Each invoice optionally references one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each invoice optionally references the quote it came from
    #[sea_orm(
        belongs_to = "super::quote::Entity",
        from = "Column::QuoteId",
        to = "super::quote::Column::Id"
    )]
    Quote,
    /// One invoice has many items
    #[sea_orm(has_many = "super::invoice_item::Entity")]
    Items,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::invoice_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
