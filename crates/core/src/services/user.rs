//! User service: registration and session tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::Set;
use validator::Validate;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{entities::user, repositories::UserRepository};

use crate::forms::{LoginForm, SignupForm};

fn username_conflict() -> AppError {
    AppError::Conflict("Пользователь с таким именем уже существует.".to_string())
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user. The returned user carries a fresh session token.
    pub async fn signup(&self, form: SignupForm) -> AppResult<user::Model> {
        form.validate()?;

        if self.username_taken(&form.username).await? {
            return Err(username_conflict());
        }

        let password_hash = hash_password(&form.password)?;
        let name = form
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username_lower: Set(form.username.to_lowercase()),
            username: Set(form.username.clone()),
            name: Set(name),
            password: Set(Some(password_hash)),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(Utc::now().into()),
        };

        let user = match self.user_repo.create(model).await {
            Ok(user) => user,
            // A concurrent signup may have taken the name first
            Err(e) => {
                return if self.username_taken(&form.username).await? {
                    Err(username_conflict())
                } else {
                    Err(e)
                };
            }
        };
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    async fn username_taken(&self, username: &str) -> AppResult<bool> {
        Ok(self.user_repo.find_by_username(username).await?.is_some())
    }

    /// Check credentials and return the user with a usable session token.
    pub async fn login(&self, form: &LoginForm) -> AppResult<user::Model> {
        form.validate()?;
        let user = self.authenticate(&form.username, &form.password).await?;

        if user.token.is_some() {
            return Ok(user);
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        self.user_repo.update(active).await
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let password_hash = user.password.as_deref().ok_or(AppError::Unauthorized)?;
        if !verify_password(password, password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Authenticate a user by session token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// End every session of a user by rotating their token.
    pub async fn logout(&self, user_id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        self.user_repo.update(active).await?;

        tracing::debug!(user_id = %user_id, "Session token rotated");
        Ok(())
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_username(username).await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
