//! POTM month entity - One "Product of the Month" calendar slot.
//!
//! Slots are keyed by `YYYY-MM`. A slot is `reserved` while an approved
//! application holds it and carries a `"<company> - <product>"` label.

use sea_orm::entity::prelude::*;
use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

/// Availability of a calendar slot
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MonthStatus {
    /// Accepting applications
    #[default]
    #[sea_orm(string_value = "open")]
    Open,
    /// Held by an approved application
    #[sea_orm(string_value = "reserved")]
    Reserved,
}

/// POTM month database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "potm_months")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Calendar key, `YYYY-MM`
    #[sea_orm(unique)]
    pub month_key: String,
    /// Open or reserved
    pub status: MonthStatus,
    /// Label of the reservation, if reserved
    pub reserved_label: Option<String>,
    /// When the slot was last modified
    pub updated_at: DateTimeUtc,
}

/// `PotmMonth` is linked to applications by `month_key`, not by foreign key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
