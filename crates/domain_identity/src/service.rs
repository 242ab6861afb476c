//! Identity application service

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use core_kernel::{PortError, UserId};

use crate::error::IdentityError;
use crate::password::{hash_password, verify_password};
use crate::ports::UserPort;
use crate::principal::Principal;
use crate::user::{Credential, MemberRef, User};
use crate::validation::{check_email, check_name, check_password, normalize_email, ValidationResult};

/// Input for password registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Profile asserted by an OAuth provider after a successful sign-in
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub provider: String,
    pub provider_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    /// Set only when a trusted caller vouches that the provider verified
    /// the email; required for linking to an existing account
    pub email_verified: bool,
}

/// Partial update of a user's profile
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Registration, sign-in and user management
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserPort>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserPort>) -> Self {
        Self { users }
    }

    /// Registers a user with a password credential
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<User, IdentityError> {
        let email = normalize_email(&registration.email);

        let mut result = ValidationResult::ok();
        check_name(&registration.name, &mut result);
        check_email(&email, &mut result);
        check_password(&registration.password, &mut result);
        result.into_result()?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(IdentityError::EmailTaken(email));
        }

        let password_hash = hash_password(&registration.password)?;
        let user = User::new(registration.name.trim(), email.clone())
            .with_credential(Credential::Password { password_hash });

        let user = self
            .users
            .create_user(&user)
            .await
            .map_err(|e| email_conflict(e, &email))?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verifies an email and password pair
    ///
    /// Unknown email, missing password credential and wrong password all
    /// fail with the same `InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let email = normalize_email(email);
        let user = self.users.find_by_email(&email).await?;

        let verified = user.filter(|u| {
            u.password_hash()
                .map(|hash| verify_password(password, hash))
                .unwrap_or(false)
        });

        match verified {
            Some(user) => {
                info!(user_id = %user.id, "User logged in");
                Ok(user)
            }
            None => {
                warn!("Login rejected");
                Err(IdentityError::InvalidCredentials)
            }
        }
    }

    /// Resolves an OAuth sign-in to a canonical user
    ///
    /// Looks up the linked account first, then links the account to an
    /// existing user with the same email, and otherwise creates a user.
    #[instrument(skip(self, profile), fields(provider = %profile.provider))]
    pub async fn sign_in_with_oauth(&self, profile: OAuthProfile) -> Result<User, IdentityError> {
        let email = normalize_email(&profile.email);

        let mut result = ValidationResult::ok();
        check_email(&email, &mut result);
        if profile.provider_id.trim().is_empty() {
            result.add_error("Provider account id is required");
        }
        result.into_result()?;

        if let Some(user) = self
            .users
            .find_by_oauth(&profile.provider, &profile.provider_id)
            .await?
        {
            return Ok(user);
        }

        let credential = Credential::oauth(profile.provider.clone(), profile.provider_id.clone());

        if let Some(mut user) = self.users.find_by_email(&email).await? {
            if !profile.email_verified {
                warn!(user_id = %user.id, "OAuth link refused for unverified email");
                return Err(IdentityError::EmailTaken(email));
            }
            user.add_credential(credential);
            if user.image.is_none() {
                user.image = profile.image;
            }
            let user = self.users.update_user(&user).await?;
            info!(user_id = %user.id, "OAuth account linked to existing user");
            return Ok(user);
        }

        let name = profile
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        let user = User::new(name, email.clone())
            .with_image(profile.image)
            .with_credential(credential);
        let user = self
            .users
            .create_user(&user)
            .await
            .map_err(|e| email_conflict(e, &email))?;

        info!(user_id = %user.id, "User created from OAuth sign-in");
        Ok(user)
    }

    /// Retrieves a user
    pub async fn get_user(&self, id: UserId) -> Result<User, IdentityError> {
        self.users.get_user(id).await.map_err(IdentityError::from_lookup)
    }

    /// Lists all users
    pub async fn list_users(&self) -> Result<Vec<User>, IdentityError> {
        Ok(self.users.list_users().await?)
    }

    /// Updates a user's name and/or email
    ///
    /// Only the user themselves or an admin may update a profile.
    #[instrument(skip(self, update), fields(principal = %principal.user_id, user_id = %id))]
    pub async fn update_user(
        &self,
        principal: &Principal,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, IdentityError> {
        if !principal.can_act_for(id) {
            return Err(IdentityError::Forbidden("cannot modify another user".to_string()));
        }
        if update.name.is_none() && update.email.is_none() {
            return Err(IdentityError::Validation("Nothing to update".to_string()));
        }

        let mut user = self.get_user(id).await?;

        let mut result = ValidationResult::ok();
        if let Some(name) = &update.name {
            check_name(name, &mut result);
        }
        let email = update.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            check_email(email, &mut result);
        }
        result.into_result()?;

        if let Some(name) = update.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = email {
            user.email = email;
        }
        user.updated_at = Utc::now();

        let email = user.email.clone();
        self.users
            .update_user(&user)
            .await
            .map_err(|e| email_conflict(e, &email))
    }

    /// Deletes a user
    ///
    /// Only the user themselves or an admin may delete an account.
    #[instrument(skip(self), fields(principal = %principal.user_id, user_id = %id))]
    pub async fn delete_user(&self, principal: &Principal, id: UserId) -> Result<(), IdentityError> {
        if !principal.can_act_for(id) {
            return Err(IdentityError::Forbidden("cannot delete another user".to_string()));
        }
        self.users
            .delete_user(id)
            .await
            .map_err(IdentityError::from_lookup)?;
        info!("User deleted");
        Ok(())
    }

    /// Resolves a user named by id, email or name
    pub async fn find_member(&self, member: &MemberRef) -> Result<User, IdentityError> {
        let found = match member {
            MemberRef::Id(id) => {
                return self.get_user(*id).await;
            }
            MemberRef::Email(email) => self.users.find_by_email(&normalize_email(email)).await?,
            MemberRef::Name(name) => self.users.find_by_name(name.trim()).await?,
        };
        found.ok_or_else(|| IdentityError::not_found(member))
    }
}

fn email_conflict(err: PortError, email: &str) -> IdentityError {
    if err.is_conflict() {
        IdentityError::EmailTaken(email.to_string())
    } else {
        IdentityError::Port(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockUserPort;

    fn service() -> IdentityService {
        IdentityService::new(Arc::new(MockUserPort::new()))
    }

    fn registration(name: &str, email: &str) -> Registration {
        Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: "hunter2hunter2".to_string(),
        }
    }

    fn google(provider_id: &str, email: &str) -> OAuthProfile {
        OAuthProfile {
            provider: "google".to_string(),
            provider_id: provider_id.to_string(),
            email: email.to_string(),
            name: Some("Gina".to_string()),
            image: Some("https://img.example/g.png".to_string()),
            email_verified: true,
        }
    }

    #[tokio::test]
    async fn test_register_normalizes_email_and_hashes_password() {
        let user = service()
            .register(registration("Alice", " Alice@Example.com "))
            .await
            .unwrap();

        assert_eq!(user.email, "alice@example.com");
        let hash = user.password_hash().unwrap();
        assert_ne!(hash, "hunter2hunter2");
        assert!(verify_password("hunter2hunter2", hash));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let svc = service();
        svc.register(registration("Alice", "alice@example.com")).await.unwrap();

        let err = svc
            .register(registration("Other", "ALICE@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let err = service()
            .register(Registration {
                name: " ".to_string(),
                email: "nope".to_string(),
                password: "short".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let svc = service();
        svc.register(registration("Alice", "alice@example.com")).await.unwrap();
        svc.sign_in_with_oauth(google("g-1", "oauth-only@example.com")).await.unwrap();

        let wrong_password = svc.login("alice@example.com", "wrong-password").await;
        let unknown_email = svc.login("nobody@example.com", "hunter2hunter2").await;
        let no_password = svc.login("oauth-only@example.com", "hunter2hunter2").await;

        for result in [wrong_password, unknown_email, no_password] {
            assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
        }
        assert!(svc.login("ALICE@example.com", "hunter2hunter2").await.is_ok());
    }

    #[tokio::test]
    async fn test_oauth_links_to_existing_password_user() {
        let svc = service();
        let registered = svc.register(registration("Alice", "alice@example.com")).await.unwrap();

        let signed_in = svc.sign_in_with_oauth(google("g-42", "alice@example.com")).await.unwrap();
        assert_eq!(signed_in.id, registered.id);
        assert!(signed_in.has_oauth("google", "g-42"));
        assert!(signed_in.password_hash().is_some());

        // Second sign-in resolves through the linked account
        let again = svc.sign_in_with_oauth(google("g-42", "changed@example.com")).await.unwrap();
        assert_eq!(again.id, registered.id);
        assert_eq!(svc.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oauth_unverified_email_does_not_link() {
        let svc = service();
        let registered = svc.register(registration("Alice", "alice@example.com")).await.unwrap();

        let profile = OAuthProfile {
            email_verified: false,
            ..google("attacker", "alice@example.com")
        };
        let err = svc.sign_in_with_oauth(profile).await.unwrap_err();
        assert!(matches!(err, IdentityError::EmailTaken(_)));

        let stored = svc.get_user(registered.id).await.unwrap();
        assert!(!stored.has_oauth("google", "attacker"));
    }

    #[tokio::test]
    async fn test_oauth_creates_new_user() {
        let user = service()
            .sign_in_with_oauth(google("g-7", "new@example.com"))
            .await
            .unwrap();
        assert_eq!(user.name, "Gina");
        assert!(user.password_hash().is_none());
        assert_eq!(user.oauth_account(), Some(("google", "g-7")));
    }

    #[tokio::test]
    async fn test_update_requires_self_or_admin() {
        let svc = service();
        let alice = svc.register(registration("Alice", "alice@example.com")).await.unwrap();
        let bob = svc.register(registration("Bob", "bob@example.com")).await.unwrap();

        let update = ProfileUpdate {
            name: Some("Mallory".to_string()),
            email: None,
        };
        let err = svc
            .update_user(&Principal::from(&bob), alice.id, update.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Forbidden(_)));

        let updated = svc
            .update_user(&Principal::admin(bob.id), alice.id, update)
            .await
            .unwrap();
        assert_eq!(updated.name, "Mallory");
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let svc = service();
        let alice = svc.register(registration("Alice", "alice@example.com")).await.unwrap();
        svc.register(registration("Bob", "bob@example.com")).await.unwrap();

        let err = svc
            .update_user(
                &Principal::from(&alice),
                alice.id,
                ProfileUpdate {
                    name: None,
                    email: Some("Bob@example.com".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn test_find_member_precedence() {
        let svc = service();
        let alice = svc.register(registration("Alice", "alice@example.com")).await.unwrap();
        let bob = svc.register(registration("Bob", "bob@example.com")).await.unwrap();

        let by_id = MemberRef::pick(Some(alice.id), Some("bob@example.com".into()), None).unwrap();
        assert_eq!(svc.find_member(&by_id).await.unwrap().id, alice.id);

        let by_email = MemberRef::pick(None, Some("BOB@example.com".into()), Some("Alice".into())).unwrap();
        assert_eq!(svc.find_member(&by_email).await.unwrap().id, bob.id);

        let by_name = MemberRef::pick(None, Some("  ".into()), Some("Alice".into())).unwrap();
        assert_eq!(svc.find_member(&by_name).await.unwrap().id, alice.id);

        let missing = MemberRef::Email("ghost@example.com".into());
        assert!(matches!(
            svc.find_member(&missing).await,
            Err(IdentityError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let svc = service();
        let alice = svc.register(registration("Alice", "alice@example.com")).await.unwrap();
        let bob = svc.register(registration("Bob", "bob@example.com")).await.unwrap();

        assert!(matches!(
            svc.delete_user(&Principal::from(&bob), alice.id).await,
            Err(IdentityError::Forbidden(_))
        ));
        svc.delete_user(&Principal::from(&alice), alice.id).await.unwrap();
        assert!(matches!(
            svc.get_user(alice.id).await,
            Err(IdentityError::UserNotFound(_))
        ));
    }
}
