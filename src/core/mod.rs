//! Core business logic - framework-agnostic portal operations.
//!
//! Every function takes a database connection (or transaction) and returns
//! structured data; the HTTP layer in [`crate::api`] only translates requests
//! and responses.

/// Brand asset management
pub mod asset;
/// Company management and billing addresses
pub mod company;
/// Landing page copy
pub mod home;
/// Invoice creation, numbering, and totals
pub mod invoice;
/// Invoice document rendering
pub mod invoice_pdf;
/// Product of the Month calendar and applications
pub mod potm;
/// Catalog management
pub mod product;
/// Promotion management
pub mod promotion;
/// Quote cart lifecycle
pub mod quote;
/// Vendor resource management
pub mod resource;
/// Idempotent content seeding
pub mod seed;
/// User accounts
pub mod user;

use crate::errors::{Error, Result};

/// Trims an optional string and turns blank values into `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims a required string field, rejecting blank values.
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Rejects negative or non-finite prices.
pub(crate) fn validate_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(price)
}
