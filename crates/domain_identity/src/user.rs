//! User aggregate and credentials
//!
//! A user signs in either with a password or through an OAuth provider.
//! Both paths resolve to the same `User`: credentials are a list on the
//! user rather than separate account types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::UserId;

/// A way of proving a user's identity
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Argon2id PHC string
    Password { password_hash: String },
    /// External identity provider account
    OAuth { provider: String, provider_id: String },
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Password { .. } => f
                .debug_struct("Password")
                .field("password_hash", &"<redacted>")
                .finish(),
            Credential::OAuth { provider, provider_id } => f
                .debug_struct("OAuth")
                .field("provider", provider)
                .field("provider_id", provider_id)
                .finish(),
        }
    }
}

impl Credential {
    /// Builds an OAuth credential
    pub fn oauth(provider: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Credential::OAuth {
            provider: provider.into(),
            provider_id: provider_id.into(),
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub is_admin: bool,
    /// Never serialized
    #[serde(skip)]
    pub credentials: Vec<Credential>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user without credentials
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            image: None,
            is_admin: false,
            credentials: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a credential
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.add_credential(credential);
        self
    }

    /// Sets the avatar URL
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Adds a credential, replacing any existing credential of the same kind
    ///
    /// A user holds at most one password and one account per OAuth provider.
    pub fn add_credential(&mut self, credential: Credential) {
        self.credentials.retain(|existing| !same_slot(existing, &credential));
        self.credentials.push(credential);
        self.updated_at = Utc::now();
    }

    /// Returns the stored password hash, if the user has a password
    pub fn password_hash(&self) -> Option<&str> {
        self.credentials.iter().find_map(|c| match c {
            Credential::Password { password_hash } => Some(password_hash.as_str()),
            _ => None,
        })
    }

    /// Returns the first linked OAuth account as `(provider, provider_id)`
    pub fn oauth_account(&self) -> Option<(&str, &str)> {
        self.credentials.iter().find_map(|c| match c {
            Credential::OAuth { provider, provider_id } => {
                Some((provider.as_str(), provider_id.as_str()))
            }
            _ => None,
        })
    }

    /// Returns true if the given OAuth account is linked to this user
    pub fn has_oauth(&self, provider: &str, provider_id: &str) -> bool {
        self.credentials.iter().any(|c| {
            matches!(c, Credential::OAuth { provider: p, provider_id: id } if p == provider && id == provider_id)
        })
    }
}

fn same_slot(a: &Credential, b: &Credential) -> bool {
    match (a, b) {
        (Credential::Password { .. }, Credential::Password { .. }) => true,
        (Credential::OAuth { provider: pa, .. }, Credential::OAuth { provider: pb, .. }) => pa == pb,
        _ => false,
    }
}

/// How the add-member flow names a user
///
/// Resolution precedence is id, then email, then name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRef {
    Id(UserId),
    Email(String),
    Name(String),
}

impl MemberRef {
    /// Picks the highest-precedence identifier that was supplied
    ///
    /// Blank strings count as absent.
    pub fn pick(id: Option<UserId>, email: Option<String>, name: Option<String>) -> Option<Self> {
        let non_blank = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(id) = id {
            return Some(MemberRef::Id(id));
        }
        if let Some(email) = non_blank(email) {
            return Some(MemberRef::Email(email));
        }
        non_blank(name).map(MemberRef::Name)
    }
}

impl std::fmt::Display for MemberRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberRef::Id(id) => write!(f, "{}", id),
            MemberRef::Email(email) => write!(f, "{}", email),
            MemberRef::Name(name) => write!(f, "{}", name),
        }
    }
}
