//! Post service: publishing, editing and every post listing.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{Select, Set};
use serde::Serialize;
use validator::Validate;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{
    Page, PageNumber,
    entities::{Post, group, post, user},
    repositories::{FollowRepository, GroupRepository, PostRepository, UserRepository},
};

use crate::forms::PostForm;

/// A post with the rows its pages always show next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    pub post: post::Model,
    pub author: user::Model,
    pub group: Option<group::Model>,
}

/// Group page: the group plus its posts.
#[derive(Debug, Clone, Serialize)]
pub struct GroupPage {
    pub group: group::Model,
    pub posts: Page<PostView>,
}

/// Profile page: an author, their posts and the viewer's relation to them.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
    pub author: user::Model,
    pub posts: Page<PostView>,
    /// Whether the viewer follows the author; false for anonymous viewers.
    pub following: bool,
    /// Whether the viewer is the author.
    pub is_self: bool,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        follow_repo: FollowRepository,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            group_repo,
            follow_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a new post.
    ///
    /// `image` is the storage key of an already stored upload.
    pub async fn create(
        &self,
        author_id: &str,
        form: PostForm,
        image: Option<String>,
    ) -> AppResult<post::Model> {
        form.validate()?;
        let group_id = self.resolve_group(form.group_id()).await?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(form.text),
            author_id: Set(author_id.to_string()),
            group_id: Set(group_id),
            image: Set(image),
            created_at: Set(Utc::now().into()),
        };

        let post = self.post_repo.create(model).await?;
        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");
        Ok(post)
    }

    /// Edit a post. Only its author may do so.
    ///
    /// A `None` image keeps the current one. The publication time never
    /// changes.
    pub async fn edit(
        &self,
        post_id: &str,
        editor_id: &str,
        form: PostForm,
        image: Option<String>,
    ) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != editor_id {
            return Err(AppError::Forbidden(
                "Only the author can edit this post".to_string(),
            ));
        }

        form.validate()?;
        let group_id = self.resolve_group(form.group_id()).await?;

        let mut active: post::ActiveModel = post.into();
        active.text = Set(form.text);
        active.group_id = Set(group_id);
        if let Some(image) = image {
            active.image = Set(Some(image));
        }

        let post = self.post_repo.update(active).await?;
        tracing::info!(post_id = %post.id, "Post edited");
        Ok(post)
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Get a post together with its author and group.
    pub async fn get_view(&self, id: &str) -> AppResult<PostView> {
        let post = self.post_repo.get_by_id(id).await?;
        let author = self.user_repo.get_by_id(&post.author_id).await?;
        let group = match &post.group_id {
            Some(group_id) => self.group_repo.find_by_id(group_id).await?,
            None => None,
        };
        Ok(PostView {
            post,
            author,
            group,
        })
    }

    /// Number of posts an author has written.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        self.post_repo.count_by_author(author_id).await
    }

    /// All posts, newest first.
    pub async fn index_page(&self, page: PageNumber) -> AppResult<Page<PostView>> {
        self.page_of(PostRepository::latest(), page).await
    }

    /// A group and its posts. Unknown slugs are not found.
    pub async fn group_page(&self, slug: &str, page: PageNumber) -> AppResult<GroupPage> {
        let group = self.group_repo.get_by_slug(slug).await?;
        let posts = self
            .page_of(PostRepository::by_group(&group.id), page)
            .await?;
        Ok(GroupPage { group, posts })
    }

    /// An author's profile as seen by `viewer_id`.
    pub async fn profile_page(
        &self,
        username: &str,
        viewer_id: Option<&str>,
        page: PageNumber,
    ) -> AppResult<ProfilePage> {
        let author = self.user_repo.get_by_username(username).await?;
        let posts = self
            .page_of(PostRepository::by_author(&author.id), page)
            .await?;

        let is_self = viewer_id == Some(author.id.as_str());
        let following = match viewer_id {
            Some(viewer) if !is_self => self.follow_repo.is_following(viewer, &author.id).await?,
            _ => false,
        };

        Ok(ProfilePage {
            author,
            posts,
            following,
            is_self,
        })
    }

    /// Posts by the authors a user follows.
    pub async fn feed_page(&self, user_id: &str, page: PageNumber) -> AppResult<Page<PostView>> {
        self.page_of(PostRepository::feed_for(user_id), page).await
    }

    async fn resolve_group(&self, group_id: Option<&str>) -> AppResult<Option<String>> {
        let Some(group_id) = group_id else {
            return Ok(None);
        };
        match self.group_repo.find_by_id(group_id).await? {
            Some(group) => Ok(Some(group.id)),
            None => Err(AppError::Validation(
                "Выберите корректную группу.".to_string(),
            )),
        }
    }

    async fn page_of(&self, query: Select<Post>, page: PageNumber) -> AppResult<Page<PostView>> {
        let page = self.post_repo.page(query, page).await?;
        self.attach(page).await
    }

    /// Load authors and groups for a page of posts in two batched queries.
    async fn attach(&self, page: Page<post::Model>) -> AppResult<Page<PostView>> {
        let mut author_ids: Vec<String> = page.items().iter().map(|p| p.author_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut group_ids: Vec<String> = page
            .items()
            .iter()
            .filter_map(|p| p.group_id.clone())
            .collect();
        group_ids.sort_unstable();
        group_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        let groups: HashMap<String, group::Model> = self
            .group_repo
            .find_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();

        page.try_map(|post| {
            let author = authors
                .get(&post.author_id)
                .cloned()
                .ok_or_else(|| AppError::UserNotFound(post.author_id.clone()))?;
            let group = post.group_id.as_ref().and_then(|id| groups.get(id)).cloned();
            Ok(PostView {
                post,
                author,
                group,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            text: "Тестовый пост".to_string(),
            author_id: author_id.to_string(),
            group_id: None,
            image: None,
            created_at: Utc::now().into(),
        }
    }

    fn service_with_posts(db: sea_orm::DatabaseConnection) -> PostService {
        let db = Arc::new(db);
        let empty = || Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        PostService::new(
            PostRepository::new(db),
            UserRepository::new(empty()),
            GroupRepository::new(empty()),
            FollowRepository::new(empty()),
        )
    }

    #[tokio::test]
    async fn test_edit_by_non_author_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1", "author")]])
            .into_connection();

        let service = service_with_posts(db);
        let result = service
            .edit(
                "p1",
                "someone-else",
                PostForm {
                    text: "Изменённый текст".to_string(),
                    group: None,
                },
                None,
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_text_before_touching_db() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = service_with_posts(db);
        let result = service
            .create(
                "author",
                PostForm {
                    text: " ".to_string(),
                    group: None,
                },
                None,
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let service = service_with_posts(db);
        let result = service.get("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}
