//! Follow service.

use chrono::Utc;
use sea_orm::Set;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{entities::follow, repositories::FollowRepository};

/// What a follow request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// A new edge was created.
    Followed,
    /// The edge already existed; nothing changed.
    AlreadyFollowing,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository) -> Self {
        Self {
            follow_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow an author. Following twice is a no-op; following yourself is refused.
    pub async fn follow(&self, user_id: &str, author_id: &str) -> AppResult<FollowOutcome> {
        if user_id == author_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        if self.follow_repo.is_following(user_id, author_id).await? {
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            author_id: Set(author_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        match self.follow_repo.create(model).await {
            Ok(_) => {
                tracing::info!(user_id = %user_id, author_id = %author_id, "Followed author");
                Ok(FollowOutcome::Followed)
            }
            // A concurrent request may have inserted the same edge first
            Err(e) => {
                if self.follow_repo.is_following(user_id, author_id).await? {
                    Ok(FollowOutcome::AlreadyFollowing)
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Stop following an author. Returns whether an edge was removed.
    pub async fn unfollow(&self, user_id: &str, author_id: &str) -> AppResult<bool> {
        let removed = self.follow_repo.delete_by_pair(user_id, author_id).await?;
        if removed {
            tracing::info!(user_id = %user_id, author_id = %author_id, "Unfollowed author");
        }
        Ok(removed)
    }

    /// Check if a user follows an author.
    pub async fn is_following(&self, user_id: &str, author_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(user_id, author_id).await
    }
}
