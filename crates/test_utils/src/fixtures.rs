//! Pre-built Test Fixtures
//!
//! Provides ready-to-use users, groups and amounts. Fixtures are
//! deterministic apart from generated identifiers and timestamps.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Currency, Money};
use domain_group::{Group, MemberSummary};
use domain_identity::{password::hash_password, Credential, User};
use rust_decimal_macros::dec;

/// Password used by every password fixture
pub const FIXTURE_PASSWORD: &str = "correct-horse-battery";

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// 100.00 USD, splits evenly four ways
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }

    /// 10.00 USD, leaves one remainder cent across three participants
    pub fn usd_10() -> Money {
        Money::new(dec!(10.00), Currency::USD)
    }

    /// 0.01 USD, the smallest billable amount
    pub fn usd_one_cent() -> Money {
        Money::new(dec!(0.01), Currency::USD)
    }

    /// 1000 JPY (zero decimal places)
    pub fn jpy_1000() -> Money {
        Money::new(dec!(1000), Currency::JPY)
    }

    /// Amount with sub-cent digits, rejected for bills
    pub fn usd_sub_cent() -> Money {
        Money::new(dec!(10.005), Currency::USD)
    }
}

/// Fixture for users
pub struct UserFixtures;

impl UserFixtures {
    /// User with a password credential for [`FIXTURE_PASSWORD`]
    ///
    /// # Panics
    ///
    /// Panics if hashing fails.
    pub fn with_password(name: &str, email: &str) -> User {
        let password_hash = hash_password(FIXTURE_PASSWORD).expect("fixture password hashes");
        User::new(name, email).with_credential(Credential::Password { password_hash })
    }

    /// User signed up only through Google
    pub fn google(name: &str, email: &str, provider_id: &str) -> User {
        User::new(name, email).with_credential(Credential::oauth("google", provider_id))
    }

    pub fn alice() -> User {
        Self::with_password("Alice", "alice@example.com")
    }

    pub fn bob() -> User {
        Self::with_password("Bob", "bob@example.com")
    }

    pub fn carol() -> User {
        Self::with_password("Carol", "carol@example.com")
    }

    /// Site administrator
    pub fn admin() -> User {
        let mut user = Self::with_password("Root", "root@example.com");
        user.is_admin = true;
        user
    }
}

/// Fixture for groups
pub struct GroupFixtures;

impl GroupFixtures {
    /// Group administered by `admin` with `members` in join order
    pub fn with_members(name: &str, admin: &User, members: &[&User]) -> Group {
        let mut group = Group::new(name, None, MemberSummary::joining(admin));
        group.members = members.iter().map(|u| MemberSummary::joining(u)).collect();
        group
    }

    /// Admin only; bills split a single way
    pub fn solo(admin: &User) -> Group {
        Self::with_members("Solo", admin, &[])
    }
}

/// Fixture for timestamps
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Fixed reference instant (Jan 1, 2024 00:00 UTC)
    pub fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_fixtures_have_credentials() {
        let alice = UserFixtures::alice();
        assert!(alice.password_hash().is_some());

        let google = UserFixtures::google("Dana", "dana@example.com", "g-1");
        assert!(google.has_oauth("google", "g-1"));
        assert!(google.password_hash().is_none());
    }

    #[test]
    fn test_group_fixture_order() {
        let alice = UserFixtures::alice();
        let bob = UserFixtures::bob();
        let carol = UserFixtures::carol();
        let group = GroupFixtures::with_members("Flat", &alice, &[&bob, &carol]);

        assert_eq!(group.participant_count(), 3);
        assert_eq!(group.billable_members(), vec![alice.id, bob.id, carol.id]);
    }
}
