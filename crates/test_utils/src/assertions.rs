//! Custom Test Assertions
//!
//! Assertion helpers for bills and splits that report the offending
//! values instead of a bare `false`.

use core_kernel::{Money, UserId};
use domain_billing::Bill;

/// Asserts that two Money values are identical in amount and currency
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that a bill's splits sum exactly to its total
pub fn assert_splits_reconcile(bill: &Bill) {
    let total = bill.split_total().expect("split amounts share the bill currency");
    assert_eq!(
        total.amount(),
        bill.amount.amount(),
        "Splits of bill {} sum to {}, bill total is {}",
        bill.id,
        total,
        bill.amount
    );
}

/// Asserts that no two shares of a bill differ by more than one minor unit
pub fn assert_shares_balanced(bill: &Bill) {
    let minors: Vec<i64> = bill
        .splits
        .iter()
        .map(|s| s.amount.to_minor().expect("share fits in minor units"))
        .collect();
    if let (Some(min), Some(max)) = (minors.iter().min(), minors.iter().max()) {
        assert!(
            max - min <= 1,
            "Shares of bill {} are unbalanced: {:?}",
            bill.id,
            minors
        );
    }
}

/// Asserts the split held by `user_id` is paid with a timestamp
pub fn assert_split_paid(bill: &Bill, user_id: UserId) {
    let split = bill
        .split_for(user_id)
        .unwrap_or_else(|| panic!("Bill {} has no split for {}", bill.id, user_id));
    assert!(split.is_paid, "Split of {} on bill {} is unpaid", user_id, bill.id);
    assert!(split.paid_at.is_some(), "Paid split of {} has no paid_at", user_id);
}

/// Asserts a bill is settled and every split is paid
pub fn assert_bill_settled(bill: &Bill) {
    assert!(bill.is_paid, "Bill {} is not settled", bill.id);
    assert_eq!(
        bill.unpaid_count(),
        0,
        "Bill {} is settled with {} unpaid splits",
        bill.id,
        bill.unpaid_count()
    );
}

/// Asserts a bill is open with exactly `unpaid` unpaid splits
pub fn assert_bill_open(bill: &Bill, unpaid: usize) {
    assert!(!bill.is_paid, "Bill {} is unexpectedly settled", bill.id);
    assert_eq!(bill.unpaid_count(), unpaid, "Unpaid split count on bill {}", bill.id);
}
