//! Database integration tests.
//!
//! These run against an in-memory `SQLite` database unless
//! `TEST_DATABASE_URL` points somewhere else.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use yatube_db::{
    PageNumber,
    entities::{comment, follow, group, post, user},
    repositories::{
        CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
    },
    test_utils::TestDatabase,
};

struct Fixture {
    db: TestDatabase,
    users: UserRepository,
    groups: GroupRepository,
    posts: PostRepository,
    comments: CommentRepository,
    follows: FollowRepository,
}

async fn setup() -> Fixture {
    let db = TestDatabase::new().await.expect("Failed to set up test database");
    let conn = db.shared();

    Fixture {
        users: UserRepository::new(Arc::clone(&conn)),
        groups: GroupRepository::new(Arc::clone(&conn)),
        posts: PostRepository::new(Arc::clone(&conn)),
        comments: CommentRepository::new(Arc::clone(&conn)),
        follows: FollowRepository::new(conn),
        db,
    }
}

impl Fixture {
    async fn user(&self, username: &str) -> user::Model {
        self.users
            .create(user::ActiveModel {
                id: Set(format!("user-{username}")),
                username: Set(username.to_string()),
                username_lower: Set(username.to_lowercase()),
                name: Set(None),
                password: Set(None),
                token: Set(None),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap()
    }

    async fn group(&self, slug: &str) -> group::Model {
        self.groups
            .create(group::ActiveModel {
                id: Set(format!("group-{slug}")),
                title: Set(format!("Группа {slug}")),
                slug: Set(slug.to_string()),
                description: Set("Тестовое описание".to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap()
    }

    /// Create posts `{prefix}-00`, `{prefix}-01`, ... one minute apart, oldest first.
    async fn posts(
        &self,
        prefix: &str,
        author: &user::Model,
        group: Option<&group::Model>,
        n: usize,
    ) -> Vec<post::Model> {
        let start = Utc::now() - Duration::hours(1);
        let mut created = Vec::with_capacity(n);
        for i in 0..n {
            let minutes = i64::try_from(i).unwrap();
            created.push(
                self.posts
                    .create(post::ActiveModel {
                        id: Set(format!("{prefix}-{i:02}")),
                        text: Set(format!("Тестовый пост {i}")),
                        author_id: Set(author.id.clone()),
                        group_id: Set(group.map(|g| g.id.clone())),
                        image: Set(None),
                        created_at: Set((start + Duration::minutes(minutes)).into()),
                    })
                    .await
                    .unwrap(),
            );
        }
        created
    }

    async fn follow(&self, user: &user::Model, author: &user::Model) {
        self.follows
            .create(follow::ActiveModel {
                id: Set(format!("{}-{}", user.id, author.id)),
                user_id: Set(user.id.clone()),
                author_id: Set(author.id.clone()),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_thirteen_posts_paginate_ten_then_three() {
    let fx = setup().await;
    let author = fx.user("auth").await;
    let group = fx.group("test-slug").await;
    fx.posts("p", &author, Some(&group), 13).await;

    for query in [
        PostRepository::latest(),
        PostRepository::by_group(&group.id),
        PostRepository::by_author(&author.id),
    ] {
        let first = fx.posts.page(query.clone(), PageNumber::FIRST).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first.count(), 13);
        assert_eq!(first.items()[0].id, "p-12");

        let second = fx.posts.page(query, PageNumber::new(2)).await.unwrap();
        assert_eq!(second.len(), 3);
        assert_eq!(second.items()[2].id, "p-00");
    }
}

#[tokio::test]
async fn test_page_beyond_end_and_empty_listing() {
    let fx = setup().await;
    let author = fx.user("auth").await;
    fx.posts("p", &author, None, 13).await;

    let page = fx
        .posts
        .page(PostRepository::latest(), PageNumber::new(50))
        .await
        .unwrap();
    assert_eq!(page.number(), 2);
    assert_eq!(page.len(), 3);

    let empty = fx
        .posts
        .page(PostRepository::by_author("nobody"), PageNumber::new(4))
        .await
        .unwrap();
    assert_eq!(empty.number(), 1);
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_post_moves_between_groups() {
    let fx = setup().await;
    let author = fx.user("auth").await;
    let first = fx.group("first").await;
    let second = fx.group("second").await;
    let post = fx.posts("p", &author, Some(&first), 1).await.remove(0);

    let mut active: post::ActiveModel = post.into();
    active.group_id = Set(Some(second.id.clone()));
    fx.posts.update(active).await.unwrap();

    let old = fx
        .posts
        .page(PostRepository::by_group(&first.id), PageNumber::FIRST)
        .await
        .unwrap();
    let new = fx
        .posts
        .page(PostRepository::by_group(&second.id), PageNumber::FIRST)
        .await
        .unwrap();
    assert!(old.is_empty());
    assert_eq!(new.len(), 1);
}

#[tokio::test]
async fn test_deleting_group_keeps_posts() {
    let fx = setup().await;
    let author = fx.user("auth").await;
    let group = fx.group("doomed").await;
    let post = fx.posts("p", &author, Some(&group), 1).await.remove(0);

    fx.groups.delete(&group.id).await.unwrap();

    let kept = fx.posts.get_by_id(&post.id).await.unwrap();
    assert_eq!(kept.group_id, None);
}

#[tokio::test]
async fn test_deleting_author_cascades() {
    let fx = setup().await;
    let author = fx.user("auth").await;
    let reader = fx.user("reader").await;
    let post = fx.posts("p", &author, None, 1).await.remove(0);
    fx.comments
        .create(comment::ActiveModel {
            id: Set("c1".to_string()),
            post_id: Set(post.id.clone()),
            author_id: Set(reader.id.clone()),
            text: Set("Комментарий".to_string()),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();
    fx.follow(&reader, &author).await;

    fx.users.delete(&author.id).await.unwrap();

    assert!(fx.posts.find_by_id(&post.id).await.unwrap().is_none());
    assert_eq!(fx.comments.count_by_post(&post.id).await.unwrap(), 0);
    assert!(!fx.follows.is_following(&reader.id, &author.id).await.unwrap());
}

#[tokio::test]
async fn test_deleting_commenter_removes_their_comments_only() {
    let fx = setup().await;
    let author = fx.user("auth").await;
    let reader = fx.user("reader").await;
    let post = fx.posts("p", &author, None, 1).await.remove(0);
    for (id, commenter) in [("c1", &reader), ("c2", &author)] {
        fx.comments
            .create(comment::ActiveModel {
                id: Set(id.to_string()),
                post_id: Set(post.id.clone()),
                author_id: Set(commenter.id.clone()),
                text: Set(format!("Комментарий {id}")),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
    }

    fx.users.delete(&reader.id).await.unwrap();

    let kept = fx.posts.get_by_id(&post.id).await.unwrap();
    assert_eq!(kept.author_id, author.id);
    assert_eq!(fx.comments.count_by_post(&post.id).await.unwrap(), 1);
    let remaining = comment::Entity::find()
        .filter(comment::Column::AuthorId.eq(reader.id.as_str()))
        .count(fx.db.connection())
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_feed_contains_only_followed_authors() {
    let fx = setup().await;
    let author = fx.user("auth").await;
    let other = fx.user("other").await;
    let reader = fx.user("reader").await;
    let stranger = fx.user("stranger").await;
    fx.posts("a", &author, None, 2).await;
    fx.posts("o", &other, None, 1).await;
    fx.follow(&reader, &author).await;

    let feed = fx
        .posts
        .page(PostRepository::feed_for(&reader.id), PageNumber::FIRST)
        .await
        .unwrap();
    assert_eq!(feed.count(), 2);
    assert!(feed.items().iter().all(|p| p.author_id == author.id));

    let empty = fx
        .posts
        .page(PostRepository::feed_for(&stranger.id), PageNumber::FIRST)
        .await
        .unwrap();
    assert!(empty.is_empty());

    assert!(fx.follows.delete_by_pair(&reader.id, &author.id).await.unwrap());
    let after = fx
        .posts
        .page(PostRepository::feed_for(&reader.id), PageNumber::FIRST)
        .await
        .unwrap();
    assert!(after.is_empty());
}

#[tokio::test]
async fn test_duplicate_follow_is_rejected() {
    let fx = setup().await;
    let author = fx.user("auth").await;
    let reader = fx.user("reader").await;
    fx.follow(&reader, &author).await;

    let duplicate = fx
        .follows
        .create(follow::ActiveModel {
            id: Set("dup".to_string()),
            user_id: Set(reader.id.clone()),
            author_id: Set(author.id.clone()),
            created_at: Set(Utc::now().into()),
        })
        .await;

    assert!(duplicate.is_err());
    let edges = follow::Entity::find()
        .filter(follow::Column::AuthorId.eq(author.id.as_str()))
        .count(fx.db.connection())
        .await
        .unwrap();
    assert_eq!(edges, 1);
}

#[tokio::test]
async fn test_username_lookup_is_case_insensitive() {
    let fx = setup().await;
    let user = fx.user("Leo").await;

    let found = fx.users.get_by_username("leo").await.unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.username, "Leo");
}
