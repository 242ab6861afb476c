//! Billing application services

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use core_kernel::{BillId, ExpenseId, GroupId, Money, UserId};
use domain_group::{Group, GroupError, GroupPort};
use domain_identity::Principal;

use crate::bill::{Bill, PaymentReceipt, SplitPlan};
use crate::error::BillingError;
use crate::expense::{Expense, ExpensePage, ExpenseQuery, ExpenseUpdate, Pagination};
use crate::ports::{BillingPort, ExpensePort};

/// A member's confirmation that their share was paid
#[derive(Debug, Clone, Copy)]
pub struct PaymentConfirmation {
    pub bill_id: BillId,
    /// Defaults to the principal
    pub user_id: Option<UserId>,
    /// Must be `true`; there is no un-pay operation
    pub status: bool,
}

/// A group with its bills and their splits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOverview {
    pub group: Group,
    pub bills: Vec<Bill>,
}

/// Bill splitting and payment recording
#[derive(Clone)]
pub struct BillingService {
    bills: Arc<dyn BillingPort>,
    groups: Arc<dyn GroupPort>,
}

impl BillingService {
    pub fn new(bills: Arc<dyn BillingPort>, groups: Arc<dyn GroupPort>) -> Self {
        Self { bills, groups }
    }

    /// Creates a bill divided equally between a group's participants
    #[instrument(skip(self, amount, description), fields(principal = %principal.user_id, group_id = %group_id))]
    pub async fn create_group_bill(
        &self,
        principal: &Principal,
        group_id: GroupId,
        amount: Money,
        description: &str,
    ) -> Result<SplitPlan, BillingError> {
        let group = self
            .groups
            .get_group(group_id)
            .await
            .map_err(|e| BillingError::from(GroupError::from_lookup(e)))?;

        let plan = Bill::split_equally(principal.user_id, &group, amount, description)?;
        let bill = self.bills.insert_bill(&plan.bill).await?;

        info!(
            bill_id = %bill.id,
            amount = %bill.amount,
            members = plan.member_count,
            remainder_minor = plan.remainder_minor,
            "Group bill created"
        );
        Ok(SplitPlan { bill, ..plan })
    }

    /// Creates a personal bill with no splits
    #[instrument(skip(self, amount, description), fields(principal = %principal.user_id))]
    pub async fn create_personal_bill(
        &self,
        principal: &Principal,
        amount: Money,
        description: &str,
    ) -> Result<Bill, BillingError> {
        let bill = Bill::personal(principal.user_id, amount, description)?;
        let bill = self.bills.insert_bill(&bill).await?;
        info!(bill_id = %bill.id, "Personal bill created");
        Ok(bill)
    }

    /// Records a payment confirmation
    ///
    /// The payer defaults to the principal. Confirming another member's
    /// share requires the principal to own the bill or be an admin.
    #[instrument(skip(self, confirmation), fields(principal = %principal.user_id, bill_id = %confirmation.bill_id))]
    pub async fn record_payment(
        &self,
        principal: &Principal,
        confirmation: PaymentConfirmation,
    ) -> Result<PaymentReceipt, BillingError> {
        if !confirmation.status {
            return Err(BillingError::Validation(
                "Payment status must be true; paid splits cannot be reverted".to_string(),
            ));
        }

        let payer = confirmation.user_id.unwrap_or(principal.user_id);
        if payer != principal.user_id && !principal.is_admin {
            let bill = self.get_bill(confirmation.bill_id).await?;
            if bill.owner_id != principal.user_id {
                return Err(BillingError::Forbidden(
                    "only the bill owner may confirm another member's payment".to_string(),
                ));
            }
        }

        let receipt = self
            .bills
            .record_payment(confirmation.bill_id, payer)
            .await
            .map_err(|e| BillingError::from_payment(e, confirmation.bill_id, payer))?;

        info!(
            user_id = %payer,
            remaining_unpaid = receipt.remaining_unpaid,
            "Payment recorded"
        );
        if receipt.bill_settled {
            info!("Bill settled");
        }
        Ok(receipt)
    }

    /// Retrieves a bill with its splits
    pub async fn get_bill(&self, id: BillId) -> Result<Bill, BillingError> {
        self.bills.get_bill(id).await.map_err(BillingError::bill_lookup)
    }

    /// Bills the user owns or holds a split on
    pub async fn list_bills_for(&self, user_id: UserId) -> Result<Vec<Bill>, BillingError> {
        Ok(self.bills.list_bills_for_user(user_id).await?)
    }

    /// Deletes a bill (owner or admin only); splits go with it
    #[instrument(skip(self), fields(principal = %principal.user_id, bill_id = %id))]
    pub async fn delete_bill(&self, principal: &Principal, id: BillId) -> Result<(), BillingError> {
        let bill = self.get_bill(id).await?;
        if !principal.can_act_for(bill.owner_id) {
            return Err(BillingError::Forbidden(
                "only the bill owner may delete a bill".to_string(),
            ));
        }
        self.bills.delete_bill(id).await.map_err(BillingError::bill_lookup)?;
        info!("Bill deleted");
        Ok(())
    }

    /// A group with its members, admin, bills and splits
    pub async fn group_overview(&self, group_id: GroupId) -> Result<GroupOverview, BillingError> {
        let group = self
            .groups
            .get_group(group_id)
            .await
            .map_err(|e| BillingError::from(GroupError::from_lookup(e)))?;
        let bills = self.bills.list_bills_for_group(group_id).await?;
        Ok(GroupOverview { group, bills })
    }
}

/// Personal expense ledger
#[derive(Clone)]
pub struct ExpenseService {
    expenses: Arc<dyn ExpensePort>,
}

impl ExpenseService {
    pub fn new(expenses: Arc<dyn ExpensePort>) -> Self {
        Self { expenses }
    }

    /// Records a new expense for the principal
    #[instrument(skip(self, amount, description), fields(principal = %principal.user_id))]
    pub async fn create(
        &self,
        principal: &Principal,
        amount: Money,
        description: &str,
    ) -> Result<Expense, BillingError> {
        let expense = Expense::new(principal.user_id, amount, description)?;
        let expense = self.expenses.insert_expense(&expense).await?;
        info!(expense_id = %expense.id, "Expense created");
        Ok(expense)
    }

    /// Retrieves one of the principal's expenses
    ///
    /// Another user's expense is reported as not found.
    pub async fn get(&self, principal: &Principal, id: ExpenseId) -> Result<Expense, BillingError> {
        let expense = self
            .expenses
            .get_expense(id)
            .await
            .map_err(BillingError::expense_lookup)?;
        if expense.owner_id != principal.user_id {
            return Err(BillingError::ExpenseNotFound(id.to_string()));
        }
        Ok(expense)
    }

    /// Updates amount and/or description
    #[instrument(skip(self, update), fields(principal = %principal.user_id, expense_id = %id))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: ExpenseId,
        update: ExpenseUpdate,
    ) -> Result<Expense, BillingError> {
        let mut expense = self.get(principal, id).await?;
        expense.apply(update)?;
        self.expenses
            .update_expense(&expense)
            .await
            .map_err(BillingError::expense_lookup)
    }

    /// Deletes an expense, returning it
    #[instrument(skip(self), fields(principal = %principal.user_id, expense_id = %id))]
    pub async fn delete(&self, principal: &Principal, id: ExpenseId) -> Result<Expense, BillingError> {
        let expense = self.get(principal, id).await?;
        self.expenses
            .delete_expense(id)
            .await
            .map_err(BillingError::expense_lookup)?;
        info!("Expense deleted");
        Ok(expense)
    }

    /// One page of the principal's expenses
    pub async fn list(&self, principal: &Principal, query: ExpenseQuery) -> Result<ExpensePage, BillingError> {
        let (expenses, total_count) = self.expenses.list_expenses(principal.user_id, &query).await?;
        Ok(ExpensePage {
            expenses,
            pagination: Pagination::new(&query, total_count),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::{MockBillingPort, MockExpensePort};
    use chrono::Utc;
    use core_kernel::Currency;
    use domain_group::ports::mock::MockGroupPort;
    use domain_group::MemberSummary;
    use rust_decimal_macros::dec;

    fn summary(name: &str) -> MemberSummary {
        MemberSummary {
            user_id: UserId::new(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            joined_at: Utc::now(),
        }
    }

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    struct Fixture {
        billing: BillingService,
        group: Group,
        admin: Principal,
        bob: Principal,
        carol: Principal,
    }

    async fn fixture() -> Fixture {
        let admin = summary("Alice");
        let bob = summary("Bob");
        let carol = summary("Carol");
        let mut group = Group::new("Flat", None, admin.clone());
        group.add_member(bob.clone()).unwrap();
        group.add_member(carol.clone()).unwrap();

        let groups = MockGroupPort::with_groups(vec![group.clone()]).await;
        let billing = BillingService::new(Arc::new(MockBillingPort::new()), Arc::new(groups));

        Fixture {
            billing,
            group,
            admin: Principal::user(admin.user_id),
            bob: Principal::user(bob.user_id),
            carol: Principal::user(carol.user_id),
        }
    }

    fn pay(bill_id: BillId) -> PaymentConfirmation {
        PaymentConfirmation {
            bill_id,
            user_id: None,
            status: true,
        }
    }

    #[tokio::test]
    async fn test_bill_settles_only_after_every_member_pays() {
        let f = fixture().await;
        let plan = f
            .billing
            .create_group_bill(&f.admin, f.group.id, usd(dec!(90)), "Groceries")
            .await
            .unwrap();

        assert_eq!(plan.member_count, 3);
        assert_eq!(plan.split_amount.amount(), dec!(30.00));
        assert!(plan.bill.splits.iter().all(|s| s.amount.amount() == dec!(30.00) && !s.is_paid));
        assert!(!plan.bill.is_paid);

        let bill_id = plan.bill.id;
        let receipt = f.billing.record_payment(&f.bob, pay(bill_id)).await.unwrap();
        assert!(!receipt.bill_settled);
        let receipt = f.billing.record_payment(&f.carol, pay(bill_id)).await.unwrap();
        assert!(!receipt.bill_settled);
        assert_eq!(receipt.remaining_unpaid, 1);
        assert!(!f.billing.get_bill(bill_id).await.unwrap().is_paid);

        let receipt = f.billing.record_payment(&f.admin, pay(bill_id)).await.unwrap();
        assert!(receipt.bill_settled);
        assert_eq!(receipt.remaining_unpaid, 0);
        assert!(f.billing.get_bill(bill_id).await.unwrap().is_paid);
    }

    #[tokio::test]
    async fn test_non_member_cannot_create_group_bill() {
        let f = fixture().await;
        let outsider = Principal::user(UserId::new());

        let err = f
            .billing
            .create_group_bill(&outsider, f.group.id, usd(dec!(90)), "Groceries")
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Forbidden(_)));
        assert!(f.billing.group_overview(f.group.id).await.unwrap().bills.is_empty());
    }

    #[tokio::test]
    async fn test_group_bill_for_missing_group() {
        let f = fixture().await;
        let err = f
            .billing
            .create_group_bill(&f.admin, GroupId::new(), usd(dec!(10)), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::GroupNotFound(_)));
    }

    #[tokio::test]
    async fn test_paying_twice_is_already_paid() {
        let f = fixture().await;
        let plan = f
            .billing
            .create_group_bill(&f.bob, f.group.id, usd(dec!(10)), "Taxi")
            .await
            .unwrap();

        f.billing.record_payment(&f.bob, pay(plan.bill.id)).await.unwrap();
        let err = f.billing.record_payment(&f.bob, pay(plan.bill.id)).await.unwrap_err();
        assert!(matches!(err, BillingError::AlreadyPaid { .. }));
    }

    #[tokio::test]
    async fn test_payment_without_split_is_split_not_found() {
        let f = fixture().await;
        let plan = f
            .billing
            .create_group_bill(&f.admin, f.group.id, usd(dec!(10)), "Taxi")
            .await
            .unwrap();

        let err = f
            .billing
            .record_payment(&Principal::user(UserId::new()), pay(plan.bill.id))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::SplitNotFound { .. }));

        let err = f.billing.record_payment(&f.admin, pay(BillId::new())).await.unwrap_err();
        assert!(matches!(err, BillingError::BillNotFound(_)));
    }

    #[tokio::test]
    async fn test_status_false_is_rejected() {
        let f = fixture().await;
        let confirmation = PaymentConfirmation {
            bill_id: BillId::new(),
            user_id: None,
            status: false,
        };
        let err = f.billing.record_payment(&f.admin, confirmation).await.unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn test_only_owner_confirms_for_others() {
        let f = fixture().await;
        let plan = f
            .billing
            .create_group_bill(&f.admin, f.group.id, usd(dec!(30)), "Dinner")
            .await
            .unwrap();

        let on_behalf_of_carol = PaymentConfirmation {
            user_id: Some(f.carol.user_id),
            ..pay(plan.bill.id)
        };
        let err = f.billing.record_payment(&f.bob, on_behalf_of_carol).await.unwrap_err();
        assert!(matches!(err, BillingError::Forbidden(_)));

        let receipt = f.billing.record_payment(&f.admin, on_behalf_of_carol).await.unwrap();
        assert_eq!(receipt.user_id, f.carol.user_id);
    }

    #[tokio::test]
    async fn test_personal_bill_settled_by_owner() {
        let f = fixture().await;
        let bill = f
            .billing
            .create_personal_bill(&f.bob, usd(dec!(12.50)), "Lunch")
            .await
            .unwrap();
        assert!(bill.splits.is_empty());
        assert!(bill.group_id.is_none());

        let err = f.billing.record_payment(&f.carol, pay(bill.id)).await.unwrap_err();
        assert!(matches!(err, BillingError::SplitNotFound { .. }));

        let receipt = f.billing.record_payment(&f.bob, pay(bill.id)).await.unwrap();
        assert!(receipt.bill_settled);
    }

    #[tokio::test]
    async fn test_list_bills_and_delete() {
        let f = fixture().await;
        let group_bill = f
            .billing
            .create_group_bill(&f.admin, f.group.id, usd(dec!(30)), "Dinner")
            .await
            .unwrap()
            .bill;
        let personal = f
            .billing
            .create_personal_bill(&f.admin, usd(dec!(5)), "Coffee")
            .await
            .unwrap();

        assert_eq!(f.billing.list_bills_for(f.admin.user_id).await.unwrap().len(), 2);
        let carol_bills = f.billing.list_bills_for(f.carol.user_id).await.unwrap();
        assert_eq!(carol_bills.len(), 1);
        assert_eq!(carol_bills[0].id, group_bill.id);

        assert!(matches!(
            f.billing.delete_bill(&f.carol, group_bill.id).await,
            Err(BillingError::Forbidden(_))
        ));
        f.billing.delete_bill(&f.admin, personal.id).await.unwrap();
        assert!(matches!(
            f.billing.get_bill(personal.id).await,
            Err(BillingError::BillNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_group_overview() {
        let f = fixture().await;
        f.billing
            .create_group_bill(&f.admin, f.group.id, usd(dec!(100)), "Utilities")
            .await
            .unwrap();

        let overview = f.billing.group_overview(f.group.id).await.unwrap();
        assert_eq!(overview.group.members.len(), 2);
        assert_eq!(overview.bills.len(), 1);
        assert_eq!(overview.bills[0].splits.len(), 3);

        assert!(matches!(
            f.billing.group_overview(GroupId::new()).await,
            Err(BillingError::GroupNotFound(_))
        ));
    }

    fn expenses() -> ExpenseService {
        ExpenseService::new(Arc::new(MockExpensePort::new()))
    }

    #[tokio::test]
    async fn test_expense_crud_scoped_to_owner() {
        let svc = expenses();
        let alice = Principal::user(UserId::new());
        let bob = Principal::user(UserId::new());

        let expense = svc.create(&alice, usd(dec!(4.20)), "  Coffee ").await.unwrap();
        assert_eq!(expense.description, "Coffee");

        assert!(matches!(
            svc.get(&bob, expense.id).await,
            Err(BillingError::ExpenseNotFound(_))
        ));

        let updated = svc
            .update(
                &alice,
                expense.id,
                ExpenseUpdate {
                    amount: Some(usd(dec!(5))),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.amount.amount(), dec!(5));
        assert_eq!(updated.description, "Coffee");

        let err = svc
            .update(&alice, expense.id, ExpenseUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));

        svc.delete(&alice, expense.id).await.unwrap();
        assert!(matches!(
            svc.get(&alice, expense.id).await,
            Err(BillingError::ExpenseNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_expense_list_pagination() {
        let svc = expenses();
        let alice = Principal::user(UserId::new());
        for i in 1..=5 {
            svc.create(&alice, usd(rust_decimal::Decimal::from(i)), &format!("item {}", i))
                .await
                .unwrap();
        }
        svc.create(&Principal::user(UserId::new()), usd(dec!(99)), "not alice's")
            .await
            .unwrap();

        let query = ExpenseQuery::from_params(Some("2"), Some("2"), Some("amount"), Some("asc"));
        let page = svc.list(&alice, query).await.unwrap();

        let amounts: Vec<_> = page.expenses.iter().map(|e| e.amount.amount()).collect();
        assert_eq!(amounts, vec![dec!(3), dec!(4)]);
        assert_eq!(page.pagination.total_count, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }

    #[tokio::test]
    async fn test_expense_rejects_non_positive_amount() {
        let err = expenses()
            .create(&Principal::user(UserId::new()), usd(dec!(0)), "Free lunch")
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }
}
