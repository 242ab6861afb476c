//! PostgreSQL adapter tests
//!
//! Each test starts its own migrated container; run with
//! `cargo test -p test_utils -- --ignored` where docker is available.

use std::sync::Arc;

use core_kernel::PortError;
use domain_billing::{Bill, BillingPort, ExpensePort, ExpenseQuery, Expense};
use domain_group::{GroupPort, MemberSummary};
use domain_identity::UserPort;
use infra_db::{
    PostgresBillingAdapter, PostgresExpenseAdapter, PostgresGroupAdapter, PostgresUserAdapter,
};
use test_utils::{db_test, GroupFixtures, MoneyFixtures, UserFixtures};

db_test!(test_user_round_trip_with_oauth, |pool| {
    let users = PostgresUserAdapter::new(pool);
    let dana = UserFixtures::google("Dana", "dana@example.com", "g-42");
    users.create_user(&dana).await.unwrap();

    let found = users.find_by_oauth("google", "g-42").await.unwrap().unwrap();
    assert_eq!(found.id, dana.id);
    assert!(found.password_hash().is_none());

    let duplicate = UserFixtures::with_password("Other", "dana@example.com");
    let err = users.create_user(&duplicate).await.unwrap_err();
    assert!(err.is_conflict());
});

db_test!(test_member_added_once, |pool| {
    let users = PostgresUserAdapter::new(pool.clone());
    let groups = PostgresGroupAdapter::new(pool);
    let alice = UserFixtures::alice();
    let bob = UserFixtures::bob();
    users.create_user(&alice).await.unwrap();
    users.create_user(&bob).await.unwrap();

    let group = groups.create_group(&GroupFixtures::solo(&alice)).await.unwrap();
    let group = groups.add_member(group.id, MemberSummary::joining(&bob)).await.unwrap();
    assert_eq!(group.participant_count(), 2);

    let again = groups.add_member(group.id, MemberSummary::joining(&bob)).await;
    assert!(matches!(again, Err(PortError::Conflict { .. })));
});

db_test!(test_concurrent_payments_settle_once, |pool| {
    let users = PostgresUserAdapter::new(pool.clone());
    let groups = PostgresGroupAdapter::new(pool.clone());
    let bills = Arc::new(PostgresBillingAdapter::new(pool));

    let alice = UserFixtures::alice();
    let bob = UserFixtures::bob();
    let carol = UserFixtures::carol();
    for user in [&alice, &bob, &carol] {
        users.create_user(user).await.unwrap();
    }
    let group = groups.create_group(&GroupFixtures::solo(&alice)).await.unwrap();
    let group = groups.add_member(group.id, MemberSummary::joining(&bob)).await.unwrap();
    let group = groups.add_member(group.id, MemberSummary::joining(&carol)).await.unwrap();

    let plan = Bill::split_equally(alice.id, &group, MoneyFixtures::usd_10(), "Dinner").unwrap();
    let bill_id = bills.insert_bill(&plan.bill).await.unwrap().id;

    let handles: Vec<_> = [alice.id, bob.id, carol.id]
        .into_iter()
        .map(|user_id| {
            let bills = bills.clone();
            tokio::spawn(async move { bills.record_payment(bill_id, user_id).await })
        })
        .collect();

    let mut settled = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().bill_settled {
            settled += 1;
        }
    }
    assert_eq!(settled, 1);

    let stored = bills.get_bill(bill_id).await.unwrap();
    test_utils::assert_bill_settled(&stored);
    test_utils::assert_splits_reconcile(&stored);

    let again = bills.record_payment(bill_id, bob.id).await;
    assert!(matches!(again, Err(PortError::Conflict { .. })));
});

db_test!(test_expense_paging_is_owner_scoped, |pool| {
    let users = PostgresUserAdapter::new(pool.clone());
    let expenses = PostgresExpenseAdapter::new(pool);
    let alice = UserFixtures::alice();
    let bob = UserFixtures::bob();
    users.create_user(&alice).await.unwrap();
    users.create_user(&bob).await.unwrap();

    for _ in 0..3 {
        let expense = Expense::new(alice.id, MoneyFixtures::usd_10(), "Lunch").unwrap();
        expenses.insert_expense(&expense).await.unwrap();
    }
    let theirs = Expense::new(bob.id, MoneyFixtures::usd_100(), "Rent").unwrap();
    expenses.insert_expense(&theirs).await.unwrap();

    let query = ExpenseQuery::from_params(Some("1"), Some("2"), None, None);
    let (page, total) = expenses.list_expenses(alice.id, &query).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert!(page.iter().all(|e| e.owner_id == alice.id));
});
