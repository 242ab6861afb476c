//! Identity Domain
//!
//! Users, their credentials, and the authenticated principal passed into
//! every core operation.
//!
//! # Credential Model
//!
//! A user may hold a password credential, one or more OAuth accounts, or
//! both. Password registration and OAuth sign-in both resolve to the same
//! canonical `User`:
//!
//! - **Password**: Argon2id hash, verified on login
//! - **OAuth**: `(provider, provider_id)`, linked by email on first sign-in
//!
//! # Examples
//!
//! ```rust
//! use domain_identity::{Credential, User, Principal};
//!
//! let user = User::new("Alice", "alice@example.com")
//!     .with_credential(Credential::oauth("google", "1234"));
//!
//! assert!(user.has_oauth("google", "1234"));
//! assert!(user.password_hash().is_none());
//!
//! let principal = Principal::from(&user);
//! assert!(principal.can_act_for(user.id));
//! ```

pub mod user;
pub mod password;
pub mod principal;
pub mod validation;
pub mod ports;
pub mod service;
pub mod error;

pub use user::{User, Credential, MemberRef};
pub use principal::Principal;
pub use ports::UserPort;
pub use service::{IdentityService, Registration, OAuthProfile, ProfileUpdate};
pub use error::IdentityError;
