//! Post repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, sea_query::Query,
};
use yatube_common::{AppError, AppResult};

use crate::{
    entities::{Follow, Post, follow, post},
    pagination::{POSTS_PER_PAGE, Page, PageNumber, paginate_query},
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post together with its comments.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count posts written by a user.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All posts, newest first.
    ///
    /// Ties on `created_at` fall back to the ID, which is time-ordered too.
    #[must_use]
    pub fn latest() -> Select<Post> {
        Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
    }

    /// Posts published into a group, newest first.
    #[must_use]
    pub fn by_group(group_id: &str) -> Select<Post> {
        Self::latest().filter(post::Column::GroupId.eq(group_id))
    }

    /// Posts written by a user, newest first.
    #[must_use]
    pub fn by_author(author_id: &str) -> Select<Post> {
        Self::latest().filter(post::Column::AuthorId.eq(author_id))
    }

    /// Posts by every author the user follows, newest first.
    #[must_use]
    pub fn feed_for(user_id: &str) -> Select<Post> {
        let followed = Query::select()
            .column(follow::Column::AuthorId)
            .from(Follow)
            .and_where(follow::Column::UserId.eq(user_id))
            .to_owned();

        Self::latest().filter(post::Column::AuthorId.in_subquery(followed))
    }

    /// Fetch one page of a post query.
    pub async fn page(&self, query: Select<Post>, page: PageNumber) -> AppResult<Page<post::Model>> {
        paginate_query(self.db.as_ref(), query, page, POSTS_PER_PAGE).await
    }
}
