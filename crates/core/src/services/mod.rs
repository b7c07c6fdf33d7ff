//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod follow;
pub mod group;
pub mod image;
pub mod post;
pub mod user;

pub use comment::{CommentService, CommentView};
pub use follow::{FollowOutcome, FollowService};
pub use group::{CreateGroupInput, GroupService};
pub use image::{INVALID_IMAGE_MESSAGE, ImageKind, ImageService, MAX_IMAGE_BYTES};
pub use post::{GroupPage, PostService, PostView, ProfilePage};
pub use user::UserService;
