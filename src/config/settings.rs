//! Application settings loaded from `config.toml`.
//!
//! The file describes non-secret settings: where to listen, how long sessions
//! last, and what content to seed on first run. Secrets (`JWT_SECRET`,
//! `SEED_ADMIN_PASSWORD`, `DATABASE_URL`) are read from the environment
//! directly before use and never stored here.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_VAR: &str = "PORTAL_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Session settings
    pub auth: AuthConfig,
    /// Initial content
    pub seed: SeedConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:3000`
    pub bind_address: String,
    /// Browser origins allowed to call the API with credentials; empty disables CORS
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// How long an issued session token stays valid
    pub token_ttl_hours: u64,
    /// Mark the session cookie `Secure`; enable when served over HTTPS
    pub secure_cookie: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: 8,
            secure_cookie: false,
        }
    }
}

/// Content seeded into an empty (or partially filled) database
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Email of the bootstrap admin account
    pub admin_email: Option<String>,
    /// Display name of the bootstrap admin account
    pub admin_name: Option<String>,
    /// Year whose 12 POTM months are created; defaults to the current year
    pub potm_year: Option<i32>,
    /// Companies to create, matched by name
    pub companies: Vec<CompanySeed>,
    /// Catalog products to create, matched by name
    pub products: Vec<ProductSeed>,
    /// Promotions to create, matched by title
    pub promotions: Vec<PromotionSeed>,
    /// Brand assets to create, matched by title
    pub assets: Vec<AssetSeed>,
    /// Vendor resources to create, matched by title
    pub resources: Vec<ResourceSeed>,
}

/// Seeded company
#[derive(Debug, Clone, Deserialize)]
pub struct CompanySeed {
    /// Matched against existing companies
    pub name: String,
    /// Street line of the billing address
    #[serde(default)]
    pub street: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// State or region
    #[serde(default)]
    pub state: Option<String>,
    /// Postal code
    #[serde(default)]
    pub zip: Option<String>,
    /// Country
    #[serde(default)]
    pub country: Option<String>,
}

/// Seeded catalog product
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    /// Matched against existing products
    pub name: String,
    /// Catalog category
    pub category: String,
    /// Catalog description
    #[serde(default)]
    pub description: Option<String>,
    /// Image URLs; the first one becomes the cover image
    #[serde(default)]
    pub images: Vec<String>,
    /// Co-branding guidance shown to vendors
    #[serde(default)]
    pub co_branding_notes: Option<String>,
    /// Unit price; unpriced products are quoted on request
    #[serde(default)]
    pub price: Option<f64>,
}

/// Seeded promotion
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionSeed {
    /// Matched against existing promotions
    pub title: String,
    /// Call to action link
    pub url: String,
    /// Teaser text
    pub blurb: String,
    /// Banner image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Call to action label
    #[serde(default)]
    pub cta_label: Option<String>,
    /// Inline TOML table stored as the promotion's JSON content
    #[serde(default)]
    pub content: Option<toml::Table>,
}

/// Seeded brand asset
#[derive(Debug, Clone, Deserialize)]
pub struct AssetSeed {
    /// Matched against existing assets
    pub title: String,
    /// Grouping shown on the assets page
    pub category: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Download link
    pub file_url: String,
}

/// Seeded vendor resource
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceSeed {
    /// Matched against existing resources
    pub title: String,
    /// Grouping shown on the resources page
    pub category: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// External link
    #[serde(default)]
    pub url: Option<String>,
    /// Hosted document
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the application configuration from `$PORTAL_CONFIG` or `./config.toml`.
///
/// A missing file is not an error; defaults are used instead. A file that
/// exists but cannot be parsed is.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        warn!("Config file {} not found, using defaults", path);
        return Ok(AppConfig::default());
    }
    let config = load_config(&path)?;
    info!("Loaded configuration from {}", path);
    Ok(config)
}
