//! Promotion business logic - Marketing programs and their detail content.

use crate::{
    core::{non_blank, required},
    entities::{Promotion, promotion},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Request body for creating or updating a promotion.
///
/// `content` must be a JSON object when present; omitting it keeps the stored content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromotionInput {
    /// Display title, required
    pub title: String,
    /// Call to action link, required
    pub url: String,
    /// Teaser text, required
    pub blurb: String,
    /// Banner image
    pub image_url: Option<String>,
    /// Call to action label
    pub cta_label: Option<String>,
    /// Listed publicly; defaults to true
    pub active: Option<bool>,
    /// Detail page sections as a JSON object
    pub content: Option<Value>,
}

/// A promotion with its content decoded for the detail page.
#[derive(Debug, Clone, Serialize)]
pub struct PromotionDetail {
    /// The promotion row
    #[serde(flatten)]
    pub promotion: promotion::Model,
    /// Decoded `content_json`
    pub content: Value,
}

impl PromotionDetail {
    /// Decodes `content_json`; malformed content is shown as an empty object.
    #[must_use]
    pub fn from_model(promotion: promotion::Model) -> Self {
        let content = serde_json::from_str::<Value>(&promotion.content_json)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        Self { promotion, content }
    }
}

fn encode_content(content: Option<&Value>) -> Result<Option<String>> {
    match content {
        None => Ok(None),
        Some(value @ Value::Object(_)) => Ok(Some(serde_json::to_string(value)?)),
        Some(_) => Err(Error::validation("Promotion content must be a JSON object")),
    }
}

/// Lists active promotions, newest first.
pub async fn list_active_promotions(db: &DatabaseConnection) -> Result<Vec<promotion::Model>> {
    Promotion::find()
        .filter(promotion::Column::Active.eq(true))
        .order_by_desc(promotion::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists all promotions, newest first.
pub async fn list_all_promotions(db: &DatabaseConnection) -> Result<Vec<promotion::Model>> {
    Promotion::find()
        .order_by_desc(promotion::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a promotion by id.
pub async fn get_promotion(db: &DatabaseConnection, promotion_id: i64) -> Result<promotion::Model> {
    Promotion::find_by_id(promotion_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Promotion", promotion_id))
}

/// Public detail view: inactive promotions are reported as missing.
pub async fn get_active_promotion_detail(
    db: &DatabaseConnection,
    promotion_id: i64,
) -> Result<PromotionDetail> {
    let promotion = get_promotion(db, promotion_id).await?;
    if !promotion.active {
        return Err(Error::not_found("Promotion", promotion_id));
    }
    Ok(PromotionDetail::from_model(promotion))
}

/// Creates a promotion; content defaults to `{}`.
pub async fn create_promotion(
    db: &DatabaseConnection,
    input: PromotionInput,
) -> Result<promotion::Model> {
    let title = required("Title", &input.title)?;
    let url = required("URL", &input.url)?;
    let content_json = encode_content(input.content.as_ref())?.unwrap_or_else(|| "{}".to_string());
    let now = chrono::Utc::now();

    let promotion = promotion::ActiveModel {
        title: Set(title),
        url: Set(url),
        blurb: Set(input.blurb.trim().to_string()),
        image_url: Set(non_blank(input.image_url)),
        cta_label: Set(non_blank(input.cta_label)),
        active: Set(input.active.unwrap_or(true)),
        content_json: Set(content_json),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let promotion = promotion.insert(db).await?;
    info!(promotion_id = promotion.id, "Created promotion {}", promotion.title);
    Ok(promotion)
}

/// Updates a promotion.
pub async fn update_promotion(
    db: &DatabaseConnection,
    promotion_id: i64,
    input: PromotionInput,
) -> Result<promotion::Model> {
    let title = required("Title", &input.title)?;
    let url = required("URL", &input.url)?;
    let content_json = encode_content(input.content.as_ref())?;
    let mut promotion: promotion::ActiveModel = get_promotion(db, promotion_id).await?.into();

    promotion.title = Set(title);
    promotion.url = Set(url);
    promotion.blurb = Set(input.blurb.trim().to_string());
    promotion.image_url = Set(non_blank(input.image_url));
    promotion.cta_label = Set(non_blank(input.cta_label));
    promotion.active = Set(input.active.unwrap_or(true));
    if let Some(content_json) = content_json {
        promotion.content_json = Set(content_json);
    }
    promotion.updated_at = Set(chrono::Utc::now());

    promotion.update(db).await.map_err(Into::into)
}

/// Deletes a promotion.
pub async fn delete_promotion(db: &DatabaseConnection, promotion_id: i64) -> Result<()> {
    let result = Promotion::delete_by_id(promotion_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Promotion", promotion_id));
    }
    info!(promotion_id, "Deleted promotion");
    Ok(())
}
