//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::{Currency, Money};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use proptest::prelude::*;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::INR),
        Just(Currency::JPY),
        Just(Currency::CAD),
        Just(Currency::AUD),
    ]
}

/// Strategy for generating billable amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating billable Money values in any currency
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating billable USD Money values
pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::USD))
}

/// Strategy for the number of participants sharing a bill
pub fn participant_count_strategy() -> impl Strategy<Value = u32> {
    1u32..=50u32
}

/// Strategy for non-blank descriptions
pub fn description_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,40}"
}

/// Realistic display name
pub fn fake_name() -> String {
    Name().fake()
}

/// Realistic, unique-enough email address
pub fn fake_email() -> String {
    let local: String = SafeEmail().fake();
    format!("{}.{}", uuid::Uuid::new_v4().simple(), local)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_allocation_reconciles(money in positive_money_strategy(), n in participant_count_strategy()) {
            let parts = money.allocate(n).unwrap();
            prop_assert_eq!(parts.len(), n as usize);

            let total: i64 = parts.iter().map(|p| p.to_minor().unwrap()).sum();
            prop_assert_eq!(total, money.to_minor().unwrap());
        }

        #[test]
        fn prop_descriptions_are_not_blank(description in description_strategy()) {
            prop_assert!(!description.trim().is_empty());
        }
    }

    #[test]
    fn test_fake_email_is_unique() {
        assert_ne!(fake_email(), fake_email());
        assert!(fake_email().contains('@'));
        assert!(!fake_name().is_empty());
    }
}
