//! Comment service.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use validator::Validate;
use yatube_common::{AppResult, IdGenerator};
use yatube_db::{
    entities::{comment, user},
    repositories::{CommentRepository, PostRepository, UserRepository},
};

use crate::forms::CommentForm;

/// A comment with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub comment: comment::Model,
    pub author: user::Model,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a post.
    pub async fn add(
        &self,
        post_id: &str,
        author_id: &str,
        form: CommentForm,
    ) -> AppResult<comment::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        form.validate()?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id),
            author_id: Set(author_id.to_string()),
            text: Set(form.text),
            created_at: Set(Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = %comment.id, post_id = %comment.post_id, "Comment added");
        Ok(comment)
    }

    /// Comments on a post with their authors, oldest first.
    pub async fn list_for_post(&self, post_id: &str) -> AppResult<Vec<CommentView>> {
        let comments = self.comment_repo.find_by_post(post_id).await?;

        let mut author_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                let author = authors.get(&comment.author_id).cloned()?;
                Some(CommentView { comment, author })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use yatube_common::AppError;
    use yatube_db::entities::post;

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            username_lower: id.to_string(),
            name: None,
            password: None,
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_comment(id: &str, author_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: "p1".to_string(),
            author_id: author_id.to_string(),
            text: "Комментарий".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_add_to_missing_post() {
        let empty = || Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let posts = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = CommentService::new(
            CommentRepository::new(empty()),
            PostRepository::new(posts),
            UserRepository::new(empty()),
        );

        let result = service
            .add(
                "missing",
                "u1",
                CommentForm {
                    text: "Комментарий".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_for_post_attaches_authors() {
        let comments = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_comment("c1", "u1"),
                    create_test_comment("c2", "u2"),
                ]])
                .into_connection(),
        );
        let users = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1"), create_test_user("u2")]])
                .into_connection(),
        );
        let service = CommentService::new(
            CommentRepository::new(comments),
            PostRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            UserRepository::new(users),
        );

        let views = service.list_for_post("p1").await.unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].comment.id, "c1");
        assert_eq!(views[1].author.id, "u2");
    }
}
