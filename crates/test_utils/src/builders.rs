//! Scenario Builders
//!
//! Wires the domain services over in-memory ports so workflow tests can
//! run without a database.

use std::sync::Arc;

use domain_billing::ports::mock::{MockBillingPort, MockExpensePort};
use domain_billing::{BillingService, ExpenseService, SplitPlan};
use domain_group::ports::mock::MockGroupPort;
use domain_group::{Group, GroupService};
use domain_identity::ports::mock::MockUserPort;
use domain_identity::{IdentityService, MemberRef, Principal, Registration, User};
use core_kernel::Money;

use crate::fixtures::FIXTURE_PASSWORD;

/// All four services over shared mock ports
#[derive(Clone)]
pub struct Scenario {
    pub user_port: Arc<MockUserPort>,
    pub group_port: Arc<MockGroupPort>,
    pub bill_port: Arc<MockBillingPort>,
    pub expense_port: Arc<MockExpensePort>,
    pub identity: IdentityService,
    pub groups: GroupService,
    pub billing: BillingService,
    pub expenses: ExpenseService,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    pub fn new() -> Self {
        let user_port = Arc::new(MockUserPort::new());
        let group_port = Arc::new(MockGroupPort::new());
        let bill_port = Arc::new(MockBillingPort::new());
        let expense_port = Arc::new(MockExpensePort::new());

        let identity = IdentityService::new(user_port.clone());
        let groups = GroupService::new(group_port.clone(), identity.clone());
        let billing = BillingService::new(bill_port.clone(), group_port.clone());
        let expenses = ExpenseService::new(expense_port.clone());

        Self {
            user_port,
            group_port,
            bill_port,
            expense_port,
            identity,
            groups,
            billing,
            expenses,
        }
    }

    /// Registers a user with [`FIXTURE_PASSWORD`]
    ///
    /// # Panics
    ///
    /// Panics if registration is rejected.
    pub async fn user(&self, name: &str, email: &str) -> (User, Principal) {
        let user = self
            .identity
            .register(Registration {
                name: name.to_string(),
                email: email.to_string(),
                password: FIXTURE_PASSWORD.to_string(),
            })
            .await
            .expect("registration succeeds");
        let principal = Principal::from(&user);
        (user, principal)
    }

    /// Creates a group and adds `members` by id in order
    ///
    /// # Panics
    ///
    /// Panics if creation or any addition is rejected.
    pub async fn group(&self, admin: &Principal, name: &str, members: &[&User]) -> Group {
        let mut group = self
            .groups
            .create_group(admin, name, None)
            .await
            .expect("group creation succeeds");
        for member in members {
            group = self
                .groups
                .add_member(admin, group.id, &MemberRef::Id(member.id))
                .await
                .expect("member is added");
        }
        group
    }

    /// Creates a group bill
    ///
    /// # Panics
    ///
    /// Panics if the bill is rejected.
    pub async fn group_bill(&self, owner: &Principal, group: &Group, amount: Money) -> SplitPlan {
        self.billing
            .create_group_bill(owner, group.id, amount, "Shared bill")
            .await
            .expect("bill is created")
    }
}
