//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    /// Lowercased username, used for case-insensitive lookups
    #[sea_orm(unique)]
    pub username_lower: String,

    /// Display name
    #[sea_orm(nullable)]
    pub name: Option<String>,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    #[sea_orm(nullable)]
    pub password: Option<String>,

    /// Session token
    #[serde(skip_serializing)]
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Name to show on pages: the display name, or the username without one.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
