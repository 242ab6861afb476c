//! PostgreSQL User Adapter
//!
//! Implements `UserPort` over `UserRepository`. A `User` is split into one
//! `users` row plus one `user_credentials` row per credential, and
//! reassembled on the way out.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId};
use domain_identity::{Credential, User, UserPort};

use crate::error::DatabaseError;
use crate::repositories::users::{CredentialRow, UserRepository, UserRow, KIND_OAUTH, KIND_PASSWORD};

use super::check_pool;

/// PostgreSQL-backed implementation of the UserPort trait
#[derive(Debug, Clone)]
pub struct PostgresUserAdapter {
    repository: UserRepository,
    pool: PgPool,
}

impl PostgresUserAdapter {
    /// Creates a new PostgreSQL user adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &UserRepository {
        &self.repository
    }

    async fn hydrate(&self, row: UserRow) -> Result<User, DatabaseError> {
        let credentials = self.repository.credentials_for(row.id).await?;
        row_to_user(row, credentials)
    }

    async fn hydrate_optional(&self, row: Option<UserRow>) -> Result<Option<User>, PortError> {
        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }
}

impl DomainPort for PostgresUserAdapter {}

#[async_trait]
impl HealthCheckable for PostgresUserAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        check_pool(&self.pool, "postgres-user-adapter").await
    }
}

#[async_trait]
impl UserPort for PostgresUserAdapter {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_user(&self, id: UserId) -> Result<User, PortError> {
        debug!("Fetching user by ID");
        let row = self.repository.get_by_id(id.into()).await?;
        Ok(self.hydrate(row).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError> {
        let row = self.repository.find_by_email(email).await?;
        self.hydrate_optional(row).await
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, PortError> {
        let row = self.repository.find_by_name(name).await?;
        self.hydrate_optional(row).await
    }

    #[instrument(skip(self))]
    async fn find_by_oauth(&self, provider: &str, provider_id: &str) -> Result<Option<User>, PortError> {
        let row = self.repository.find_by_oauth(provider, provider_id).await?;
        self.hydrate_optional(row).await
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, PortError> {
        let rows = self.repository.list().await?;
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut credentials = self.repository.credentials_for_many(&ids).await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            let (mine, rest): (Vec<_>, Vec<_>) = credentials.drain(..).partition(|c| c.user_id == row.id);
            credentials = rest;
            users.push(row_to_user(row, mine)?);
        }
        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: &User) -> Result<User, PortError> {
        let (row, credentials) = user_to_rows(user);
        let stored = self.repository.insert(&row, &credentials).await?;
        Ok(row_to_user(stored, credentials)?)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update_user(&self, user: &User) -> Result<User, PortError> {
        let (row, credentials) = user_to_rows(user);
        let stored = self.repository.update(&row, &credentials).await?;
        Ok(row_to_user(stored, credentials)?)
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn delete_user(&self, id: UserId) -> Result<(), PortError> {
        Ok(self.repository.delete(id.into()).await?)
    }
}

/// Splits a user into its table rows
fn user_to_rows(user: &User) -> (UserRow, Vec<CredentialRow>) {
    let user_id: Uuid = user.id.into();
    let row = UserRow {
        id: user_id,
        name: user.name.clone(),
        email: user.email.clone(),
        image: user.image.clone(),
        is_admin: user.is_admin,
        created_at: user.created_at,
        updated_at: user.updated_at,
    };
    let credentials = user
        .credentials
        .iter()
        .map(|credential| match credential {
            Credential::Password { password_hash } => CredentialRow {
                user_id,
                kind: KIND_PASSWORD.to_string(),
                password_hash: Some(password_hash.clone()),
                provider: None,
                provider_id: None,
            },
            Credential::OAuth { provider, provider_id } => CredentialRow {
                user_id,
                kind: KIND_OAUTH.to_string(),
                password_hash: None,
                provider: Some(provider.clone()),
                provider_id: Some(provider_id.clone()),
            },
        })
        .collect();
    (row, credentials)
}

/// Reassembles a user from its table rows
fn row_to_user(row: UserRow, credentials: Vec<CredentialRow>) -> Result<User, DatabaseError> {
    let credentials = credentials
        .into_iter()
        .map(row_to_credential)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(User {
        id: UserId::from_uuid(row.id),
        name: row.name,
        email: row.email,
        image: row.image,
        is_admin: row.is_admin,
        credentials,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_credential(row: CredentialRow) -> Result<Credential, DatabaseError> {
    match (row.kind.as_str(), row.password_hash, row.provider, row.provider_id) {
        (KIND_PASSWORD, Some(password_hash), None, None) => Ok(Credential::Password { password_hash }),
        (KIND_OAUTH, None, Some(provider), Some(provider_id)) => Ok(Credential::OAuth { provider, provider_id }),
        (kind, ..) => Err(DatabaseError::CorruptRow(format!(
            "credential of kind '{}' for user {} has an invalid shape",
            kind, row.user_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rows_roundtrip() {
        let user = User::new("Alice", "alice@example.com")
            .with_credential(Credential::Password { password_hash: "$argon2id$v=19$x".into() })
            .with_credential(Credential::oauth("github", "42"));

        let (row, credentials) = user_to_rows(&user);
        assert_eq!(credentials.len(), 2);
        assert_eq!(credentials[0].kind, KIND_PASSWORD);
        assert_eq!(credentials[1].provider.as_deref(), Some("github"));

        let restored = row_to_user(row, credentials).unwrap();
        assert_eq!(restored.id, user.id);
        assert_eq!(restored.password_hash(), Some("$argon2id$v=19$x"));
        assert!(restored.has_oauth("github", "42"));
    }

    #[test]
    fn test_malformed_credential_is_rejected() {
        let row = CredentialRow {
            user_id: Uuid::nil(),
            kind: KIND_OAUTH.to_string(),
            password_hash: Some("hash".into()),
            provider: None,
            provider_id: None,
        };
        assert!(matches!(row_to_credential(row), Err(DatabaseError::CorruptRow(_))));
    }
}
