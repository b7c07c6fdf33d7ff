//! Service tests against a migrated in-memory database.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use yatube_core::{
    CommentService, FollowOutcome, FollowService, GroupService, PageNumber, PostService,
    UserService,
    forms::{CommentForm, PostForm, SignupForm},
    services::CreateGroupInput,
};
use yatube_db::{
    entities::{group, user},
    repositories::{
        CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
    },
    test_utils::TestDatabase,
};

struct Services {
    _db: TestDatabase,
    users: UserService,
    groups: GroupService,
    posts: PostService,
    comments: CommentService,
    follows: FollowService,
}

async fn setup() -> Services {
    let db = TestDatabase::new().await.unwrap();
    let conn = db.shared();

    let user_repo = UserRepository::new(Arc::clone(&conn));
    let group_repo = GroupRepository::new(Arc::clone(&conn));
    let post_repo = PostRepository::new(Arc::clone(&conn));
    let comment_repo = CommentRepository::new(Arc::clone(&conn));
    let follow_repo = FollowRepository::new(conn);

    Services {
        users: UserService::new(user_repo.clone()),
        groups: GroupService::new(group_repo.clone()),
        posts: PostService::new(
            post_repo.clone(),
            user_repo.clone(),
            group_repo,
            follow_repo.clone(),
        ),
        comments: CommentService::new(comment_repo, post_repo, user_repo),
        follows: FollowService::new(follow_repo),
        _db: db,
    }
}

impl Services {
    async fn user(&self, username: &str) -> user::Model {
        self.users
            .signup(SignupForm {
                username: username.to_string(),
                name: None,
                password: "password123".to_string(),
                password_confirmation: "password123".to_string(),
            })
            .await
            .unwrap()
    }

    async fn group(&self, slug: &str) -> group::Model {
        self.groups
            .create(CreateGroupInput {
                title: format!("Группа {slug}"),
                slug: slug.to_string(),
                description: "Тестовое описание".to_string(),
            })
            .await
            .unwrap()
    }

    async fn post(&self, author: &user::Model, text: &str, group: Option<&group::Model>) -> String {
        self.posts
            .create(
                &author.id,
                PostForm {
                    text: text.to_string(),
                    group: group.map(|g| g.id.clone()),
                },
                None,
            )
            .await
            .unwrap()
            .id
    }
}

#[tokio::test]
async fn test_post_leaves_group_listing_when_group_changes() {
    let s = setup().await;
    let author = s.user("auth").await;
    let first = s.group("first").await;
    let second = s.group("second").await;
    let post_id = s.post(&author, "Тестовый пост", Some(&first)).await;

    let page = s.posts.group_page("first", PageNumber::FIRST).await.unwrap();
    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts.items()[0].group.as_ref().map(|g| g.slug.as_str()), Some("first"));

    s.posts
        .edit(
            &post_id,
            &author.id,
            PostForm {
                text: "Изменённый пост".to_string(),
                group: Some(second.id.clone()),
            },
            None,
        )
        .await
        .unwrap();

    let old = s.posts.group_page("first", PageNumber::FIRST).await.unwrap();
    let new = s.posts.group_page("second", PageNumber::FIRST).await.unwrap();
    assert!(old.posts.is_empty());
    assert_eq!(new.posts.items()[0].post.text, "Изменённый пост");
}

#[tokio::test]
async fn test_edit_keeps_publication_time() {
    let s = setup().await;
    let author = s.user("auth").await;
    let post_id = s.post(&author, "Тестовый пост", None).await;
    let before = s.posts.get(&post_id).await.unwrap();

    let after = s
        .posts
        .edit(
            &post_id,
            &author.id,
            PostForm {
                text: "Другой текст".to_string(),
                group: None,
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.author_id, before.author_id);
}

#[tokio::test]
async fn test_unknown_group_choice_is_rejected() {
    let s = setup().await;
    let author = s.user("auth").await;

    let result = s
        .posts
        .create(
            &author.id,
            PostForm {
                text: "Тестовый пост".to_string(),
                group: Some("no-such-group".to_string()),
            },
            None,
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_follow_unfollow_restores_feed_count() {
    let s = setup().await;
    let author = s.user("auth").await;
    let reader = s.user("reader").await;
    let stranger = s.user("stranger").await;
    s.post(&author, "Пост автора", None).await;

    let before = s.posts.feed_page(&reader.id, PageNumber::FIRST).await.unwrap().count();

    assert_eq!(
        s.follows.follow(&reader.id, &author.id).await.unwrap(),
        FollowOutcome::Followed
    );
    assert_eq!(
        s.follows.follow(&reader.id, &author.id).await.unwrap(),
        FollowOutcome::AlreadyFollowing
    );
    let following = s.posts.feed_page(&reader.id, PageNumber::FIRST).await.unwrap();
    assert_eq!(following.count(), before + 1);
    assert_eq!(following.items()[0].author.username, "auth");

    let stranger_feed = s.posts.feed_page(&stranger.id, PageNumber::FIRST).await.unwrap();
    assert!(stranger_feed.is_empty());

    assert!(s.follows.unfollow(&reader.id, &author.id).await.unwrap());
    assert!(!s.follows.unfollow(&reader.id, &author.id).await.unwrap());
    let after = s.posts.feed_page(&reader.id, PageNumber::FIRST).await.unwrap();
    assert_eq!(after.count(), before);
}

#[tokio::test]
async fn test_profile_shows_follow_state() {
    let s = setup().await;
    let author = s.user("auth").await;
    let reader = s.user("reader").await;
    s.post(&author, "Пост", None).await;
    s.follows.follow(&reader.id, &author.id).await.unwrap();

    let seen_by_reader = s
        .posts
        .profile_page("auth", Some(&reader.id), PageNumber::FIRST)
        .await
        .unwrap();
    assert!(seen_by_reader.following);
    assert!(!seen_by_reader.is_self);
    assert_eq!(seen_by_reader.posts.count(), 1);

    let seen_by_self = s
        .posts
        .profile_page("auth", Some(&author.id), PageNumber::FIRST)
        .await
        .unwrap();
    assert!(!seen_by_self.following);
    assert!(seen_by_self.is_self);

    let anonymous = s.posts.profile_page("auth", None, PageNumber::FIRST).await.unwrap();
    assert!(!anonymous.following);
}

#[tokio::test]
async fn test_comments_listed_oldest_first() {
    let s = setup().await;
    let author = s.user("auth").await;
    let post_id = s.post(&author, "Пост", None).await;

    for text in ["первый", "второй"] {
        s.comments
            .add(
                &post_id,
                &author.id,
                CommentForm {
                    text: text.to_string(),
                },
            )
            .await
            .unwrap();
    }

    let comments = s.comments.list_for_post(&post_id).await.unwrap();
    let texts: Vec<&str> = comments.iter().map(|c| c.comment.text.as_str()).collect();
    assert_eq!(texts, ["первый", "второй"]);
}

#[tokio::test]
async fn test_login_and_logout_rotate_token() {
    let s = setup().await;
    let user = s.user("leo").await;
    let token = user.token.clone().unwrap();

    let found = s.users.authenticate_by_token(&token).await.unwrap();
    assert_eq!(found.id, user.id);

    s.users.logout(&user.id).await.unwrap();
    assert!(s.users.authenticate_by_token(&token).await.is_err());

    let again = s.users.authenticate("LEO", "password123").await.unwrap();
    assert_eq!(again.id, user.id);
}
