//! Group service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidationError};
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{
    entities::group::{self, SLUG_MAX_LEN, TITLE_MAX_LEN},
    repositories::GroupRepository,
};

/// Input for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = TITLE_MAX_LEN))]
    pub title: String,

    #[validate(length(min = 1, max = SLUG_MAX_LEN), custom(function = "slug_chars"))]
    pub slug: String,

    #[serde(default)]
    pub description: String,
}

fn slug_chars(value: &str) -> Result<(), ValidationError> {
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("slug"))
    }
}

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a group. Slugs are unique.
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        if self.group_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Group with slug '{}' already exists",
                input.slug
            )));
        }

        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(input.slug),
            description: Set(input.description),
            created_at: Set(Utc::now().into()),
        };

        let group = self.group_repo.create(model).await?;
        tracing::info!(slug = %group.slug, "Group created");
        Ok(group)
    }

    /// Get a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }

    /// All groups, ordered by title.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }

    /// Delete a group. Its posts lose their group but stay.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.group_repo.get_by_id(id).await?;
        self.group_repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn input(slug: &str) -> CreateGroupInput {
        CreateGroupInput {
            title: "Тестовая группа".to_string(),
            slug: slug.to_string(),
            description: "Тестовое описание".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_slug() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = GroupService::new(GroupRepository::new(db));

        let result = service.create(input("not a slug")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_taken_slug() {
        let existing = group::Model {
            id: "g1".to_string(),
            title: "Старая".to_string(),
            slug: "test-slug".to_string(),
            description: String::new(),
            created_at: Utc::now().into(),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = GroupService::new(GroupRepository::new(db));

        let result = service.create(input("test-slug")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
