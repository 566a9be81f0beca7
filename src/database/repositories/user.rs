//! User repository implementation
//!
//! The identity provider owns user creation in production; the create path
//! here exists for bootstrap and test seeding.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{CreateUserRequest, User, UserRole};
use crate::utils::errors::GatherlyError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

const USER_COLUMNS: &str = "id, name, email, picture, role, status, created_at, updated_at";

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, GatherlyError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, picture, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, picture, role, status, created_at, updated_at
            "#,
        )
        .bind(request.name)
        .bind(request.email)
        .bind(request.picture.unwrap_or_default())
        .bind(request.role.unwrap_or(UserRole::User))
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, GatherlyError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, GatherlyError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64, GatherlyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
