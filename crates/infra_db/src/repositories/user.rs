//! User account repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DatabaseError;

const USER_COLUMNS: &str = "id, email, name, password_hash, registered_at, is_active, is_admin";

/// Repository for API user accounts
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a user by normalized email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, DatabaseError> {
        let user = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Retrieves a user by id
    pub async fn get_by_id(&self, user_id: i64) -> Result<UserRow, DatabaseError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("User", user_id))
    }

    /// Inserts a user
    ///
    /// # Errors
    ///
    /// `DatabaseError::DuplicateEntry` if the email is registered
    pub async fn insert(&self, user: &NewUserRow) -> Result<UserRow, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, name, password_hash, is_active, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

/// A users table row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub registered_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_admin: bool,
}

/// Data for inserting a user row
#[derive(Debug, Clone)]
pub struct NewUserRow {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
}
