//! Product business logic - Handles all catalog operations.
//!
//! The public catalog shows only active products; admins see and manage every
//! product. A product that appears on a quote or invoice cannot be deleted, only
//! deactivated, so historical documents keep their references.

use crate::{
    core::{non_blank, required, validate_price},
    entities::{InvoiceItem, Product, QuoteItem, invoice_item, product, quote_item},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request body for creating or updating a product.
///
/// Images may be given as a full list or as a single `imageUrl`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductInput {
    /// Product name, required
    pub name: String,
    /// Catalog category, required
    pub category: String,
    /// Catalog description
    pub description: Option<String>,
    /// Cover image; defaults to the first of `images`
    pub image_url: Option<String>,
    /// Gallery URLs; omitted keeps the stored list
    pub images: Option<Vec<String>>,
    /// Co-branding guidance
    pub co_branding_notes: Option<String>,
    /// Unit price
    pub price: Option<f64>,
    /// Units in stock
    pub quantity: Option<i32>,
    /// Shown in the catalog; defaults to true
    pub active: Option<bool>,
}

impl ProductInput {
    /// Image list from `images`, falling back to `imageUrl`; `None` if neither was sent.
    fn image_list(&self) -> Option<Vec<String>> {
        if let Some(images) = &self.images {
            return Some(
                images
                    .iter()
                    .map(|url| url.trim().to_string())
                    .filter(|url| !url.is_empty())
                    .collect(),
            );
        }
        non_blank(self.image_url.clone()).map(|url| vec![url])
    }
}

/// An active catalog product with its decoded images and quote popularity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    /// The product row
    #[serde(flatten)]
    pub product: product::Model,
    /// Decoded gallery URLs
    pub images: Vec<String>,
    /// Number of quote lines that requested this product
    pub quote_item_count: u64,
}

fn validate_input(input: &ProductInput) -> Result<(String, String)> {
    let name = required("Product name", &input.name)?;
    let category = required("Category", &input.category)?;
    if let Some(price) = input.price {
        validate_price(price)?;
    }
    if input.quantity.is_some_and(|quantity| quantity < 0) {
        return Err(Error::validation("Quantity cannot be negative"));
    }
    Ok((name, category))
}

/// Lists active products by name, with how often each was quoted.
pub async fn list_catalog(db: &DatabaseConnection) -> Result<Vec<CatalogProduct>> {
    let products = Product::find()
        .filter(product::Column::Active.eq(true))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await?;

    let mut catalog = Vec::with_capacity(products.len());
    for product in products {
        let quote_item_count = QuoteItem::find()
            .filter(quote_item::Column::ProductId.eq(product.id))
            .count(db)
            .await?;
        catalog.push(CatalogProduct {
            images: product.images(),
            product,
            quote_item_count,
        });
    }
    Ok(catalog)
}

/// Lists every product, active or not, by name.
pub async fn list_all_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by id.
pub async fn get_product<C>(db: &C, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))
}

/// Retrieves a product for the public catalog; inactive products are reported as missing.
pub async fn get_active_product<C>(db: &C, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let product = get_product(db, product_id).await?;
    if !product.active {
        return Err(Error::not_found("Product", product_id));
    }
    Ok(product)
}

/// Creates a product. New products are active unless `active` is `false`.
///
/// # Errors
/// - [`Error::Validation`] if name or category is blank, or quantity is negative
/// - [`Error::InvalidAmount`] if the price is negative or not finite
pub async fn create_product(db: &DatabaseConnection, input: ProductInput) -> Result<product::Model> {
    let (name, category) = validate_input(&input)?;
    let images = input.image_list().unwrap_or_default();
    let now = chrono::Utc::now();

    let product = product::ActiveModel {
        name: Set(name),
        category: Set(category),
        description: Set(non_blank(input.description)),
        images_json: Set(serde_json::to_string(&images)?),
        co_branding_notes: Set(non_blank(input.co_branding_notes)),
        price: Set(input.price),
        quantity: Set(input.quantity),
        active: Set(input.active.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let product = product.insert(db).await?;
    info!(product_id = product.id, "Created product {}", product.name);
    Ok(product)
}

/// Updates a product. The stored images are kept when the input carries none.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    input: ProductInput,
) -> Result<product::Model> {
    let (name, category) = validate_input(&input)?;
    let existing = get_product(db, product_id).await?;
    let images = input.image_list();
    let mut product: product::ActiveModel = existing.into();

    product.name = Set(name);
    product.category = Set(category);
    product.description = Set(non_blank(input.description));
    if let Some(images) = images {
        product.images_json = Set(serde_json::to_string(&images)?);
    }
    product.co_branding_notes = Set(non_blank(input.co_branding_notes));
    product.price = Set(input.price);
    product.quantity = Set(input.quantity);
    product.active = Set(input.active.unwrap_or(true));
    product.updated_at = Set(chrono::Utc::now());

    product.update(db).await.map_err(Into::into)
}

/// Deletes a product that no quote or invoice line references.
///
/// # Errors
/// - [`Error::NotFound`] if the product does not exist
/// - [`Error::Validation`] if quote or invoice items reference it
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let product = get_product(db, product_id).await?;
    let quoted = QuoteItem::find()
        .filter(quote_item::Column::ProductId.eq(product_id))
        .count(db)
        .await?;
    let invoiced = InvoiceItem::find()
        .filter(invoice_item::Column::ProductId.eq(product_id))
        .count(db)
        .await?;
    if quoted + invoiced > 0 {
        return Err(Error::validation(
            "Cannot delete a product that appears on quotes or invoices. Deactivate it instead.",
        ));
    }

    Product::delete_by_id(product_id).exec(db).await?;
    info!(product_id, "Deleted product {}", product.name);
    Ok(())
}
