//! Vendor resource business logic - Guides and links, each with a URL, a file, or both.

use crate::{
    core::{non_blank, required},
    entities::{Resource, resource},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Request body for creating or updating a resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceInput {
    /// Display title
    pub title: String,
    /// Grouping shown on the resources page
    pub category: String,
    /// Short description
    pub description: Option<String>,
    /// External link
    pub url: Option<String>,
    /// Hosted document
    pub file_url: Option<String>,
}

struct ValidResource {
    title: String,
    category: String,
    url: Option<String>,
    file_url: Option<String>,
}

fn validate(input: &ResourceInput) -> Result<ValidResource> {
    let title = required("Title", &input.title)?;
    let category = required("Category", &input.category)?;
    let url = non_blank(input.url.clone());
    let file_url = non_blank(input.file_url.clone());
    if url.is_none() && file_url.is_none() {
        return Err(Error::validation("A resource needs a URL or a file URL"));
    }
    Ok(ValidResource {
        title,
        category,
        url,
        file_url,
    })
}

/// Lists all resources grouped by category, then title.
pub async fn list_resources(db: &DatabaseConnection) -> Result<Vec<resource::Model>> {
    Resource::find()
        .order_by_asc(resource::Column::Category)
        .order_by_asc(resource::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a resource.
///
/// # Errors
/// - [`Error::Validation`] if title or category is blank, or neither link is given
pub async fn create_resource(
    db: &DatabaseConnection,
    input: ResourceInput,
) -> Result<resource::Model> {
    let valid = validate(&input)?;
    let now = chrono::Utc::now();
    let resource = resource::ActiveModel {
        title: Set(valid.title),
        category: Set(valid.category),
        description: Set(non_blank(input.description)),
        url: Set(valid.url),
        file_url: Set(valid.file_url),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let resource = resource.insert(db).await?;
    info!(resource_id = resource.id, "Created resource {}", resource.title);
    Ok(resource)
}

/// Replaces a resource's fields.
pub async fn update_resource(
    db: &DatabaseConnection,
    resource_id: i64,
    input: ResourceInput,
) -> Result<resource::Model> {
    let valid = validate(&input)?;
    let mut resource: resource::ActiveModel = Resource::find_by_id(resource_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Resource", resource_id))?
        .into();

    resource.title = Set(valid.title);
    resource.category = Set(valid.category);
    resource.description = Set(non_blank(input.description));
    resource.url = Set(valid.url);
    resource.file_url = Set(valid.file_url);
    resource.updated_at = Set(chrono::Utc::now());

    resource.update(db).await.map_err(Into::into)
}

/// Deletes a resource.
pub async fn delete_resource(db: &DatabaseConnection, resource_id: i64) -> Result<()> {
    let result = Resource::delete_by_id(resource_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Resource", resource_id));
    }
    info!(resource_id, "Deleted resource");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_resource_needs_a_link() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_resource(
            &db,
            ResourceInput {
                title: "Guide".to_string(),
                category: "Guides".to_string(),
                url: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_update_delete_resource() -> Result<()> {
        let db = setup_test_db().await?;
        let resource = create_resource(
            &db,
            ResourceInput {
                title: "Co-op Guide".to_string(),
                category: "Guides".to_string(),
                file_url: Some("https://cdn.example.com/coop.pdf".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(resource.url, None);

        let updated = update_resource(
            &db,
            resource.id,
            ResourceInput {
                title: "Co-op Guide".to_string(),
                category: "Guides".to_string(),
                url: Some("https://example.com/coop".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.url.as_deref(), Some("https://example.com/coop"));
        assert_eq!(updated.file_url, None);
        assert_eq!(list_resources(&db).await?.len(), 1);

        delete_resource(&db, resource.id).await?;
        assert!(list_resources(&db).await?.is_empty());
        Ok(())
    }
}
