//! Idempotent seeding of initial content from `[seed]` in `config.toml`.
//!
//! Rows are matched by name (companies, products) or title (promotions, assets,
//! resources). Missing rows are inserted; rows that already exist are skipped so
//! that admin edits survive a restart. Everything runs in one transaction.

use crate::{
    auth,
    config::settings::{AssetSeed, CompanySeed, ProductSeed, PromotionSeed, ResourceSeed, SeedConfig},
    core::potm,
    entities::{
        Asset, Company, Product, Promotion, Resource, Role, User, asset, company, product,
        promotion, resource, user,
    },
    errors::{Error, Result},
};
use chrono::Datelike;
use sea_orm::{PaginatorTrait, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Number of rows inserted by a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Companies inserted
    pub companies: u32,
    /// Products inserted
    pub products: u32,
    /// Promotions inserted
    pub promotions: u32,
    /// Assets inserted
    pub assets: u32,
    /// Resources inserted
    pub resources: u32,
    /// POTM months inserted
    pub months: u32,
    /// Whether the admin account was created
    pub admin_created: bool,
}

async fn seed_company<C>(db: &C, seed: &CompanySeed) -> Result<bool>
where
    C: ConnectionTrait,
{
    let exists = Company::find()
        .filter(company::Column::Name.eq(seed.name.as_str()))
        .count(db)
        .await?
        > 0;
    if exists {
        debug!("Company '{}' already exists. Skipping.", seed.name);
        return Ok(false);
    }
    let now = chrono::Utc::now();
    company::ActiveModel {
        name: Set(seed.name.clone()),
        street: Set(seed.street.clone()),
        city: Set(seed.city.clone()),
        state: Set(seed.state.clone()),
        zip: Set(seed.zip.clone()),
        country: Set(seed.country.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Inserting NEW company '{}'", seed.name);
    Ok(true)
}

async fn seed_product<C>(db: &C, seed: &ProductSeed) -> Result<bool>
where
    C: ConnectionTrait,
{
    let exists = Product::find()
        .filter(product::Column::Name.eq(seed.name.as_str()))
        .count(db)
        .await?
        > 0;
    if exists {
        debug!("Product '{}' already exists. Skipping.", seed.name);
        return Ok(false);
    }
    let now = chrono::Utc::now();
    product::ActiveModel {
        name: Set(seed.name.clone()),
        category: Set(seed.category.clone()),
        description: Set(seed.description.clone()),
        images_json: Set(serde_json::to_string(&seed.images)?),
        co_branding_notes: Set(seed.co_branding_notes.clone()),
        price: Set(seed.price),
        quantity: Set(None),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Inserting NEW product '{}'", seed.name);
    Ok(true)
}

async fn seed_promotion<C>(db: &C, seed: &PromotionSeed) -> Result<bool>
where
    C: ConnectionTrait,
{
    let exists = Promotion::find()
        .filter(promotion::Column::Title.eq(seed.title.as_str()))
        .count(db)
        .await?
        > 0;
    if exists {
        debug!("Promotion '{}' already exists. Skipping.", seed.title);
        return Ok(false);
    }
    let content_json = match &seed.content {
        Some(table) => serde_json::to_string(table)?,
        None => "{}".to_string(),
    };
    let now = chrono::Utc::now();
    promotion::ActiveModel {
        title: Set(seed.title.clone()),
        url: Set(seed.url.clone()),
        blurb: Set(seed.blurb.clone()),
        image_url: Set(seed.image_url.clone()),
        cta_label: Set(seed.cta_label.clone()),
        active: Set(true),
        content_json: Set(content_json),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Inserting NEW promotion '{}'", seed.title);
    Ok(true)
}

async fn seed_asset<C>(db: &C, seed: &AssetSeed) -> Result<bool>
where
    C: ConnectionTrait,
{
    let exists = Asset::find()
        .filter(asset::Column::Title.eq(seed.title.as_str()))
        .count(db)
        .await?
        > 0;
    if exists {
        debug!("Asset '{}' already exists. Skipping.", seed.title);
        return Ok(false);
    }
    let now = chrono::Utc::now();
    asset::ActiveModel {
        title: Set(seed.title.clone()),
        category: Set(seed.category.clone()),
        description: Set(seed.description.clone()),
        file_url: Set(seed.file_url.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Inserting NEW asset '{}'", seed.title);
    Ok(true)
}

async fn seed_resource<C>(db: &C, seed: &ResourceSeed) -> Result<bool>
where
    C: ConnectionTrait,
{
    if seed.url.is_none() && seed.file_url.is_none() {
        warn!("Resource '{}' has neither url nor file_url. Skipping.", seed.title);
        return Ok(false);
    }
    let exists = Resource::find()
        .filter(resource::Column::Title.eq(seed.title.as_str()))
        .count(db)
        .await?
        > 0;
    if exists {
        debug!("Resource '{}' already exists. Skipping.", seed.title);
        return Ok(false);
    }
    let now = chrono::Utc::now();
    resource::ActiveModel {
        title: Set(seed.title.clone()),
        category: Set(seed.category.clone()),
        description: Set(seed.description.clone()),
        url: Set(seed.url.clone()),
        file_url: Set(seed.file_url.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Inserting NEW resource '{}'", seed.title);
    Ok(true)
}

async fn seed_admin<C>(db: &C, seed: &SeedConfig, password: Option<String>) -> Result<bool>
where
    C: ConnectionTrait,
{
    let (Some(email), Some(password)) = (&seed.admin_email, password) else {
        debug!("No admin email or password configured. Skipping admin seed.");
        return Ok(false);
    };
    let email = email.trim().to_lowercase();
    let exists = User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .count(db)
        .await?
        > 0;
    if exists {
        debug!("Admin '{}' already exists. Skipping.", email);
        return Ok(false);
    }
    if password.chars().count() < 8 {
        return Err(Error::Config {
            message: "Seed admin password must be at least 8 characters".to_string(),
        });
    }

    let now = chrono::Utc::now();
    user::ActiveModel {
        email: Set(email.clone()),
        name: Set(seed.admin_name.clone()),
        password_hash: Set(auth::hash_password(password).await?),
        role: Set(Role::Admin),
        company_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Inserting NEW admin user '{}'", email);
    Ok(true)
}

/// Seeds configured content, the POTM months of the seed year, and the admin user.
///
/// The admin is only created when both `seed.admin_email` and `admin_password`
/// are present.
#[instrument(skip(db, seed, admin_password))]
pub async fn seed_database(
    db: &DatabaseConnection,
    seed: &SeedConfig,
    admin_password: Option<String>,
) -> Result<SeedReport> {
    info!(
        "Starting to seed content. Found {} companies, {} products, {} promotions, {} assets, {} resources in config.",
        seed.companies.len(),
        seed.products.len(),
        seed.promotions.len(),
        seed.assets.len(),
        seed.resources.len()
    );
    let mut report = SeedReport::default();
    let txn = db.begin().await?;

    for company in &seed.companies {
        report.companies += u32::from(seed_company(&txn, company).await?);
    }
    for product in &seed.products {
        report.products += u32::from(seed_product(&txn, product).await?);
    }
    for promotion in &seed.promotions {
        report.promotions += u32::from(seed_promotion(&txn, promotion).await?);
    }
    for asset in &seed.assets {
        report.assets += u32::from(seed_asset(&txn, asset).await?);
    }
    for resource in &seed.resources {
        report.resources += u32::from(seed_resource(&txn, resource).await?);
    }

    let year = seed.potm_year.unwrap_or_else(|| chrono::Utc::now().year());
    report.months = potm::ensure_year(&txn, year).await?;
    report.admin_created = seed_admin(&txn, seed, admin_password).await?;

    txn.commit().await?;
    info!(?report, "Finished seeding content.");
    Ok(report)
}
