//! Group repository.

use std::sync::Arc;

use yatube_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entities::{Group, group};

/// Repository for group operations.
#[derive(Clone)]
pub struct GroupRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find group by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<group::Model>> {
        Group::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get group by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::GroupNotFound(id.to_string()))
    }

    /// Find groups by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<group::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Group::find()
            .filter(group::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find group by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<group::Model>> {
        Group::find()
            .filter(group::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get group by slug, returning error if not found.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::GroupNotFound(slug.to_string()))
    }

    /// All groups, ordered by title (for form choices).
    pub async fn find_all(&self) -> AppResult<Vec<group::Model>> {
        Group::find()
            .order_by_asc(group::Column::Title)
            .order_by_asc(group::Column::Slug)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new group.
    pub async fn create(&self, model: group::ActiveModel) -> AppResult<group::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a group.
    pub async fn update(&self, model: group::ActiveModel) -> AppResult<group::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a group. Its posts stay, with their group cleared.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Group::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_group(id: &str, slug: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            title: "Название".to_string(),
            slug: slug.to_string(),
            description: "Тестовое описание".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_slug_found() {
        let group = create_test_group("g1", "test-slug");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[group.clone()]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.find_by_slug("test-slug").await.unwrap();

        assert_eq!(result, Some(group));
    }

    #[tokio::test]
    async fn test_get_by_slug_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.get_by_slug("missing").await;

        assert!(matches!(result, Err(AppError::GroupNotFound(slug)) if slug == "missing"));
    }

    #[tokio::test]
    async fn test_find_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_group("g1", "a"),
                    create_test_group("g2", "b"),
                ]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let groups = repo.find_all().await.unwrap();

        assert_eq!(groups.len(), 2);
    }
}
