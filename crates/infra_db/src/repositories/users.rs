//! User repository implementation
//!
//! Users live in `users`; each password or OAuth account is one row of
//! `user_credentials`. Writes that touch both tables run in a single
//! transaction.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Credential kind stored for password rows
pub const KIND_PASSWORD: &str = "password";
/// Credential kind stored for OAuth rows
pub const KIND_OAUTH: &str = "oauth";

const USER_COLUMNS: &str = "id, name, email, image, is_admin, created_at, updated_at";

/// Database row for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for a user credential
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CredentialRow {
    pub user_id: Uuid,
    pub kind: String,
    pub password_hash: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
}

/// Repository for users and their credentials
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a user by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<UserRow, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("User", id))
    }

    /// Finds a user by normalized email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Finds the earliest-registered user with the given name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<UserRow>, DatabaseError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE name = $1 ORDER BY created_at, id LIMIT 1"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Finds the user linked to an OAuth account
    pub async fn find_by_oauth(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<UserRow>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.name, u.email, u.image, u.is_admin, u.created_at, u.updated_at
            FROM users u
            JOIN user_credentials c ON c.user_id = u.id
            WHERE c.kind = 'oauth' AND c.provider = $1 AND c.provider_id = $2
            "#,
        )
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Lists all users in registration order
    pub async fn list(&self) -> Result<Vec<UserRow>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Loads the credentials of one user
    pub async fn credentials_for(&self, user_id: Uuid) -> Result<Vec<CredentialRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT user_id, kind, password_hash, provider, provider_id
            FROM user_credentials
            WHERE user_id = $1
            ORDER BY kind, provider
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Loads the credentials of many users at once
    pub async fn credentials_for_many(&self, user_ids: &[Uuid]) -> Result<Vec<CredentialRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT user_id, kind, password_hash, provider, provider_id
            FROM user_credentials
            WHERE user_id = ANY($1)
            ORDER BY user_id, kind, provider
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Inserts a user and its credentials in one transaction
    pub async fn insert(&self, user: &UserRow, credentials: &[CredentialRow]) -> Result<UserRow, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.image)
            .bind(user.is_admin)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        insert_credentials(&mut tx, credentials).await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Overwrites a user and replaces its credentials in one transaction
    pub async fn update(&self, user: &UserRow, credentials: &[CredentialRow]) -> Result<UserRow, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE users
            SET name = $2, email = $3, image = $4, is_admin = $5, updated_at = $6
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.image)
            .bind(user.is_admin)
            .bind(user.updated_at)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("User", user.id))?;

        sqlx::query("DELETE FROM user_credentials WHERE user_id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
        insert_credentials(&mut tx, credentials).await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Deletes a user; memberships, bills and expenses cascade
    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("User", id));
        }
        Ok(())
    }
}

async fn insert_credentials(conn: &mut PgConnection, credentials: &[CredentialRow]) -> Result<(), DatabaseError> {
    for credential in credentials {
        sqlx::query(
            r#"
            INSERT INTO user_credentials (user_id, kind, password_hash, provider, provider_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(credential.user_id)
        .bind(&credential.kind)
        .bind(&credential.password_hash)
        .bind(&credential.provider)
        .bind(&credential.provider_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
