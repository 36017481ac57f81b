//! Landing page copy. A single row, created with default text on first read.

use crate::{
    core::required,
    entities::{HomeContent, home_content},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

const DEFAULT_HERO_TITLE: &str = "Strengthening Our Brand Together";
const DEFAULT_HERO_TEXT: &str = "We love partnering with our manufacturers to create powerful \
marketing opportunities that benefit us all. By working together, we strengthen our brands, \
reach more customers, and build lasting relationships that drive mutual success. Explore our \
collaborative marketing programs designed to amplify your products and grow our shared \
customer base.";

/// Request body for updating the hero copy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomeContentInput {
    /// Headline of the landing page
    pub hero_title: String,
    /// Body copy under the headline
    pub hero_text: String,
}

/// Returns the home content row, inserting the default copy if none exists.
pub async fn get_home_content<C>(db: &C) -> Result<home_content::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = HomeContent::find()
        .order_by_asc(home_content::Column::Id)
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let content = home_content::ActiveModel {
        hero_title: Set(DEFAULT_HERO_TITLE.to_string()),
        hero_text: Set(DEFAULT_HERO_TEXT.to_string()),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let content = content.insert(db).await?;
    info!("Created default home content");
    Ok(content)
}

/// Replaces the hero copy.
pub async fn update_home_content(
    db: &DatabaseConnection,
    input: HomeContentInput,
) -> Result<home_content::Model> {
    let hero_title = required("Hero title", &input.hero_title)?;
    let hero_text = required("Hero text", &input.hero_text)?;
    let mut content: home_content::ActiveModel = get_home_content(db).await?.into();

    content.hero_title = Set(hero_title);
    content.hero_text = Set(hero_text);
    content.updated_at = Set(chrono::Utc::now());

    content.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_get_creates_default_once() -> Result<()> {
        let db = setup_test_db().await?;
        let first = get_home_content(&db).await?;
        assert_eq!(first.hero_title, DEFAULT_HERO_TITLE);

        let second = get_home_content(&db).await?;
        assert_eq!(first.id, second.id);
        assert_eq!(HomeContent::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_home_content() -> Result<()> {
        let db = setup_test_db().await?;
        let updated = update_home_content(
            &db,
            HomeContentInput {
                hero_title: "Welcome".to_string(),
                hero_text: "Partner with us".to_string(),
            },
        )
        .await?;
        assert_eq!(updated.hero_title, "Welcome");
        assert_eq!(get_home_content(&db).await?.hero_text, "Partner with us");

        let result = update_home_content(&db, HomeContentInput::default()).await;
        assert!(result.is_err());
        Ok(())
    }
}
