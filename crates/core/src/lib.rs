//! Core business logic for yatube-rs.

pub mod forms;
pub mod services;

pub use services::*;

/// Page-number pagination, shared by every post listing.
pub use yatube_db::pagination;
pub use yatube_db::{POSTS_PER_PAGE, Page, PageNumber};
