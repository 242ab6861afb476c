//! Integration Tests for SplitLedger
//!
//! These tests verify cross-domain workflows that involve identity,
//! groups and billing working together over in-memory ports.

use core_kernel::{Currency, Money};
use domain_billing::{BillingError, ExpenseQuery, PaymentConfirmation};
use domain_group::GroupError;
use domain_identity::{IdentityError, MemberRef, OAuthProfile};
use rust_decimal_macros::dec;
use test_utils::*;

mod identity_workflow {
    use super::*;

    /// Tests that a registered user can log in and a Google sign-in with
    /// the same email resolves to the same user
    #[tokio::test]
    async fn test_password_and_oauth_resolve_to_one_user() {
        let scenario = Scenario::new();
        let (alice, _) = scenario.user("Alice", "Alice@Example.com").await;

        let logged_in = scenario
            .identity
            .login("alice@example.com", FIXTURE_PASSWORD)
            .await
            .expect("login succeeds");
        assert_eq!(logged_in.id, alice.id);

        let linked = scenario
            .identity
            .sign_in_with_oauth(OAuthProfile {
                provider: "google".to_string(),
                provider_id: "g-123".to_string(),
                email: "alice@example.com".to_string(),
                name: None,
                image: Some("https://example.com/a.png".to_string()),
                email_verified: true,
            })
            .await
            .expect("oauth sign-in succeeds");
        assert_eq!(linked.id, alice.id);
        assert!(linked.has_oauth("google", "g-123"));
        assert!(linked.password_hash().is_some());
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let scenario = Scenario::new();
        scenario.user("Alice", "alice@example.com").await;

        let result = scenario.identity.login("alice@example.com", "wrong-password").await;
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }
}

mod group_bill_workflow {
    use super::*;

    /// Tests the full lifecycle: split, pay each share, settle once
    #[tokio::test]
    async fn test_split_pay_and_settle() {
        let scenario = Scenario::new();
        let (alice, alice_p) = scenario.user("Alice", "alice@example.com").await;
        let (bob, bob_p) = scenario.user("Bob", "bob@example.com").await;
        let (carol, carol_p) = scenario.user("Carol", "carol@example.com").await;
        let group = scenario.group(&alice_p, "Flat", &[&bob, &carol]).await;

        let plan = scenario.group_bill(&bob_p, &group, MoneyFixtures::usd_10()).await;
        assert_eq!(plan.member_count, 3);
        assert_eq!(plan.remainder_minor, 1);
        assert_money_eq(&plan.split_amount, &Money::new(dec!(3.33), Currency::USD));
        assert_splits_reconcile(&plan.bill);
        assert_shares_balanced(&plan.bill);

        // Remainder cent goes to the admin
        let admin_share = plan.bill.split_for(alice.id).unwrap();
        assert_eq!(admin_share.amount.amount(), dec!(3.34));

        let bill_id = plan.bill.id;
        for (principal, expect_settled) in [(&bob_p, false), (&alice_p, false), (&carol_p, true)] {
            let receipt = scenario
                .billing
                .record_payment(
                    principal,
                    PaymentConfirmation { bill_id, user_id: None, status: true },
                )
                .await
                .expect("payment recorded");
            assert_eq!(receipt.bill_settled, expect_settled);
        }

        let bill = scenario.billing.get_bill(bill_id).await.unwrap();
        assert_bill_settled(&bill);
        assert_split_paid(&bill, carol.id);
    }

    #[tokio::test]
    async fn test_paying_twice_is_a_conflict() {
        let scenario = Scenario::new();
        let (_, alice_p) = scenario.user("Alice", "alice@example.com").await;
        let (bob, bob_p) = scenario.user("Bob", "bob@example.com").await;
        let group = scenario.group(&alice_p, "Trip", &[&bob]).await;
        let plan = scenario.group_bill(&alice_p, &group, MoneyFixtures::usd_100()).await;

        let confirm = PaymentConfirmation { bill_id: plan.bill.id, user_id: None, status: true };
        scenario.billing.record_payment(&bob_p, confirm).await.unwrap();
        let again = scenario.billing.record_payment(&bob_p, confirm).await;

        assert!(matches!(again, Err(BillingError::AlreadyPaid { .. })));
        let bill = scenario.billing.get_bill(plan.bill.id).await.unwrap();
        assert_bill_open(&bill, 1);
    }

    #[tokio::test]
    async fn test_outsider_has_no_split() {
        let scenario = Scenario::new();
        let (_, alice_p) = scenario.user("Alice", "alice@example.com").await;
        let (_, dave_p) = scenario.user("Dave", "dave@example.com").await;
        let group = scenario.group(&alice_p, "Solo", &[]).await;
        let plan = scenario.group_bill(&alice_p, &group, MoneyFixtures::usd_10()).await;

        let result = scenario
            .billing
            .record_payment(
                &dave_p,
                PaymentConfirmation { bill_id: plan.bill.id, user_id: None, status: true },
            )
            .await;
        assert!(matches!(result, Err(BillingError::SplitNotFound { .. })));
    }

    #[tokio::test]
    async fn test_non_participant_cannot_create_bill() {
        let scenario = Scenario::new();
        let (_, alice_p) = scenario.user("Alice", "alice@example.com").await;
        let (_, dave_p) = scenario.user("Dave", "dave@example.com").await;
        let group = scenario.group(&alice_p, "Flat", &[]).await;

        let result = scenario
            .billing
            .create_group_bill(&dave_p, group.id, MoneyFixtures::usd_10(), "Rent")
            .await;
        assert!(matches!(result, Err(BillingError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_duplicate_member_by_email() {
        let scenario = Scenario::new();
        let (_, alice_p) = scenario.user("Alice", "alice@example.com").await;
        let (bob, _) = scenario.user("Bob", "bob@example.com").await;
        let group = scenario.group(&alice_p, "Flat", &[&bob]).await;

        let result = scenario
            .groups
            .add_member(&alice_p, group.id, &MemberRef::Email("bob@example.com".to_string()))
            .await;
        assert!(matches!(result, Err(GroupError::AlreadyMember { .. })));
    }

    /// An outsider can neither join a group nor bill its members
    #[tokio::test]
    async fn test_outsider_cannot_join_and_bill() {
        let scenario = Scenario::new();
        let (_, alice_p) = scenario.user("Alice", "alice@example.com").await;
        let (mallory, mallory_p) = scenario.user("Mallory", "mallory@example.com").await;
        let group = scenario.group(&alice_p, "Flat", &[]).await;

        let joined = scenario
            .groups
            .add_member(&mallory_p, group.id, &MemberRef::Id(mallory.id))
            .await;
        assert!(matches!(joined, Err(GroupError::Forbidden(_))));

        let billed = scenario
            .billing
            .create_group_bill(&mallory_p, group.id, MoneyFixtures::usd_10(), "Charge")
            .await;
        assert!(matches!(billed, Err(BillingError::Forbidden(_))));
    }
}

mod personal_workflow {
    use super::*;

    #[tokio::test]
    async fn test_owner_settles_personal_bill() {
        let scenario = Scenario::new();
        let (_, alice_p) = scenario.user("Alice", "alice@example.com").await;

        let bill = scenario
            .billing
            .create_personal_bill(&alice_p, MoneyFixtures::usd_10(), "Gym")
            .await
            .unwrap();
        assert!(bill.splits.is_empty());

        let receipt = scenario
            .billing
            .record_payment(&alice_p, PaymentConfirmation { bill_id: bill.id, user_id: None, status: true })
            .await
            .unwrap();
        assert!(receipt.bill_settled);
    }

    #[tokio::test]
    async fn test_expense_pages() {
        let scenario = Scenario::new();
        let (_, alice_p) = scenario.user("Alice", "alice@example.com").await;
        let (_, bob_p) = scenario.user("Bob", "bob@example.com").await;

        for i in 1..=5 {
            scenario
                .expenses
                .create(&alice_p, Money::new(dec!(1.00) * rust_decimal::Decimal::from(i), Currency::USD), "Coffee")
                .await
                .unwrap();
        }
        scenario
            .expenses
            .create(&bob_p, MoneyFixtures::usd_10(), "Books")
            .await
            .unwrap();

        let query = ExpenseQuery::from_params(Some("2"), Some("2"), Some("amount"), Some("asc"));
        let page = scenario.expenses.list(&alice_p, query).await.unwrap();

        assert_eq!(page.pagination.total_count, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);
        let amounts: Vec<_> = page.expenses.iter().map(|e| e.amount.amount()).collect();
        assert_eq!(amounts, vec![dec!(3.00), dec!(4.00)]);
    }
}
