//! Product entity - Co-branded catalog items vendors can request quotes for.
//!
//! Images are stored as a JSON-encoded list of URLs in `images_json`; use
//! [`Model::images`] to decode them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Premium T-Shirt")
    pub name: String,
    /// Catalog category (e.g., "Apparel")
    pub category: String,
    /// Long-form description
    pub description: Option<String>,
    /// JSON array of image URLs
    pub images_json: String,
    /// Where and how co-branding can be applied
    pub co_branding_notes: Option<String>,
    /// Unit price in dollars, if published
    pub price: Option<f64>,
    /// Available quantity, if tracked
    pub quantity: Option<i32>,
    /// Inactive products are hidden from the public catalog
    pub active: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Decodes the stored image list, treating malformed JSON as empty.
    #[must_use]
    pub fn images(&self) -> Vec<String> {
        serde_json::from_str(&self.images_json).unwrap_or_default()
    }
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product appears in many quote items
    #[sea_orm(has_many = "super::quote_item::Entity")]
    QuoteItems,
    /// One product appears in many invoice items
    #[sea_orm(has_many = "super::invoice_item::Entity")]
    InvoiceItems,
}

impl Related<super::quote_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuoteItems.def()
    }
}

impl Related<super::invoice_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
