//! Expense model
//!
//! Practice expenses. VAT expenses are generated automatically for
//! credit-card payments and carry a back-reference to the parent payment;
//! that link is what ties their undo lifecycle together.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenseId, PaymentId};
use super::money::Money;

/// Expense category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// VAT liability from a credit-card payment
    Vat,
    /// Office rent
    Rent,
    /// Consumables and supplies
    Supplies,
    /// Staff salaries
    Salary,
    /// Anything else
    #[default]
    Other,
}

impl ExpenseCategory {
    /// Parse a category from user input
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vat" => Some(Self::Vat),
            "rent" => Some(Self::Rent),
            "supplies" => Some(Self::Supplies),
            "salary" => Some(Self::Salary),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vat => write!(f, "VAT"),
            Self::Rent => write!(f, "Rent"),
            Self::Supplies => write!(f, "Supplies"),
            Self::Salary => write!(f, "Salary"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A practice expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// What the expense was for
    pub description: String,

    /// Amount spent
    pub amount: Money,

    /// Expense category
    #[serde(default)]
    pub category: ExpenseCategory,

    /// Expense date
    pub date: NaiveDate,

    /// Set only for auto-generated VAT expenses: the payment that caused this
    pub payment_id: Option<PaymentId>,

    /// When the expense row was created
    pub created_at: DateTime<Utc>,

    /// When the expense row was last modified
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense
    pub fn new(
        description: impl Into<String>,
        amount: Money,
        category: ExpenseCategory,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            description: description.into(),
            amount,
            category,
            date,
            payment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create the auto-generated VAT expense for a credit-card payment
    pub fn vat_for_payment(
        payment_id: PaymentId,
        description: impl Into<String>,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        let mut expense = Self::new(description, amount, ExpenseCategory::Vat, date);
        expense.payment_id = Some(payment_id);
        expense
    }

    /// Whether this expense was generated by a payment (the VAT case)
    pub fn is_payment_linked(&self) -> bool {
        self.payment_id.is_some()
    }

    /// Validate the expense's fields
    pub fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("Expense description cannot be empty".to_string());
        }
        if !self.amount.is_positive() {
            return Err("Expense amount must be positive".to_string());
        }
        Ok(())
    }

    /// Mark the expense as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
