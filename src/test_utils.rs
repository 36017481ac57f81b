//! Shared test utilities for the vendor portal.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    api::AppState,
    auth::AuthKeys,
    config::AppConfig,
    core::{
        company::{self, CompanyInput},
        potm::ApplicationInput,
        product::{self, ProductInput},
        user::{self, NewUserInput},
    },
    entities::{self, Role},
    errors::Result,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Arc;

/// Password given to every fixture user.
pub const TEST_PASSWORD: &str = "correct-horse";

/// Signing secret used by [`test_state`].
pub const TEST_JWT_SECRET: &[u8] = b"test-secret";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = crate::config::database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test company with a Springfield billing address.
pub async fn create_test_company(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::company::Model> {
    company::create_company(
        db,
        CompanyInput {
            name: name.to_string(),
            street: Some("1 Main St".to_string()),
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            zip: Some("62701".to_string()),
            country: None,
        },
    )
    .await
}

/// Creates a vendor user with [`TEST_PASSWORD`].
pub async fn create_test_vendor(
    db: &DatabaseConnection,
    email: &str,
    company_id: Option<i64>,
) -> Result<entities::user::Model> {
    user::create_user(
        db,
        NewUserInput {
            email: email.to_string(),
            name: Some("Test Vendor".to_string()),
            password: TEST_PASSWORD.to_string(),
            role: Some(Role::Vendor),
            company_id,
        },
    )
    .await
}

/// Creates an admin user with [`TEST_PASSWORD`] and no company.
pub async fn create_test_admin(
    db: &DatabaseConnection,
    email: &str,
) -> Result<entities::user::Model> {
    user::create_user(
        db,
        NewUserInput {
            email: email.to_string(),
            name: Some("Test Admin".to_string()),
            password: TEST_PASSWORD.to_string(),
            role: Some(Role::Admin),
            company_id: None,
        },
    )
    .await
}

/// Creates an active product in the "Apparel" category.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: Option<f64>,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        ProductInput {
            name: name.to_string(),
            category: "Apparel".to_string(),
            price,
            ..Default::default()
        },
    )
    .await
}

/// Inserts a bare invoice row with a fixed number, bypassing numbering.
pub async fn create_test_invoice_row(
    db: &DatabaseConnection,
    company_id: i64,
    invoice_number: &str,
) -> Result<entities::invoice::Model> {
    let now = chrono::Utc::now();
    let invoice = entities::invoice::ActiveModel {
        invoice_number: Set(invoice_number.to_string()),
        company_id: Set(company_id),
        user_id: Set(None),
        quote_id: Set(None),
        invoice_date: Set(now.date_naive()),
        due_date: Set(None),
        billing_address: Set("{}".to_string()),
        notes: Set(None),
        total: Set(0.0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(invoice.insert(db).await?)
}

/// A complete POTM application from "Acme" for "Widget".
pub fn test_application_input(month_key: &str) -> ApplicationInput {
    ApplicationInput {
        month_key: month_key.to_string(),
        company_name: "Acme".to_string(),
        contact_name: "Ada".to_string(),
        contact_email: "ada@acme.test".to_string(),
        product_name: "Widget".to_string(),
        description: "A very good widget".to_string(),
        link: None,
        notes: None,
    }
}

/// Application state over `db` with a fixed signing secret and default config.
pub fn test_state(db: DatabaseConnection) -> AppState {
    AppState {
        db,
        auth: Arc::new(AuthKeys::new(TEST_JWT_SECRET, 1)),
        config: Arc::new(AppConfig::default()),
    }
}
