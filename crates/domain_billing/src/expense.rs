//! Personal expense ledger
//!
//! Expenses are standalone entries owned by one user and never split.
//! Listing is paginated and sortable; out-of-range or unknown query values
//! fall back to defaults instead of failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ExpenseId, Money, UserId};

use crate::bill::{validate_amount, validate_amount_and_description, validate_description};
use crate::error::BillingError;

/// Default page size
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// A personal ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub owner_id: UserId,
    pub amount: Money,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Creates a validated expense
    pub fn new(owner_id: UserId, amount: Money, description: &str) -> Result<Self, BillingError> {
        let description = validate_amount_and_description(&amount, description)?;
        let now = Utc::now();
        Ok(Self {
            id: ExpenseId::new(),
            owner_id,
            amount,
            description,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a partial update
    ///
    /// # Errors
    ///
    /// `Validation` when neither field is supplied or a supplied field is invalid.
    pub fn apply(&mut self, update: ExpenseUpdate) -> Result<(), BillingError> {
        if update.amount.is_none() && update.description.is_none() {
            return Err(BillingError::Validation(
                "At least one of amount or description is required".to_string(),
            ));
        }
        if let Some(amount) = &update.amount {
            validate_amount(amount)?;
        }
        let description = update
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;

        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(description) = description {
            self.description = description;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Partial update of an expense
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub amount: Option<Money>,
    pub description: Option<String>,
}

/// Sortable expense fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpenseSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    Amount,
    Description,
}

impl ExpenseSort {
    /// Parses a query value, accepting camelCase and snake_case
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "createdAt" | "created_at" => Some(ExpenseSort::CreatedAt),
            "updatedAt" | "updated_at" => Some(ExpenseSort::UpdatedAt),
            "amount" => Some(ExpenseSort::Amount),
            "description" => Some(ExpenseSort::Description),
            _ => None,
        }
    }

    /// Column name in the `expenses` table
    pub fn column(&self) -> &'static str {
        match self {
            ExpenseSort::CreatedAt => "created_at",
            ExpenseSort::UpdatedAt => "updated_at",
            ExpenseSort::Amount => "amount",
            ExpenseSort::Description => "description",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parses `asc` or `desc`, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    /// SQL keyword
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A page request over a user's expenses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseQuery {
    pub page: u32,
    pub limit: u32,
    pub sort_by: ExpenseSort,
    pub order: SortOrder,
}

impl Default for ExpenseQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort_by: ExpenseSort::default(),
            order: SortOrder::default(),
        }
    }
}

impl ExpenseQuery {
    /// Builds a query from raw request parameters
    ///
    /// Page is clamped to at least 1 and limit to `1..=100`. Unparseable
    /// numbers and unknown sort values use the defaults.
    pub fn from_params(
        page: Option<&str>,
        limit: Option<&str>,
        sort_by: Option<&str>,
        order: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| p.max(1).min(u32::MAX as i64) as u32)
            .unwrap_or(defaults.page);
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .map(|l| l.clamp(1, MAX_PAGE_SIZE as i64) as u32)
            .unwrap_or(defaults.limit);

        Self {
            page,
            limit,
            sort_by: sort_by.and_then(ExpenseSort::parse).unwrap_or_default(),
            order: order.and_then(SortOrder::parse).unwrap_or_default(),
        }
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Orders expenses in place according to this query
    ///
    /// Ties are broken by id so that pages are stable.
    pub fn sort(&self, expenses: &mut [Expense]) {
        expenses.sort_by(|a, b| {
            let ordering = match self.sort_by {
                ExpenseSort::CreatedAt => a.created_at.cmp(&b.created_at),
                ExpenseSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                ExpenseSort::Amount => a.amount.amount().cmp(&b.amount.amount()),
                ExpenseSort::Description => a.description.cmp(&b.description),
            }
            .then_with(|| a.id.cmp(&b.id));
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }
}

/// Page metadata returned with a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(query: &ExpenseQuery, total_count: u64) -> Self {
        let limit = u64::from(query.limit.max(1));
        let total_pages = total_count.div_ceil(limit);
        let current = u64::from(query.page);
        Self {
            current_page: query.page,
            total_pages,
            total_count,
            has_next: current < total_pages,
            has_prev: query.page > 1,
        }
    }
}

/// One page of expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePage {
    pub expenses: Vec<Expense>,
    pub pagination: Pagination,
}
