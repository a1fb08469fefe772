//! Expense service
//!
//! Manual practice expenses (rent, supplies, salaries). VAT expenses are
//! created by the payment service and can only be removed through their
//! payment, so the two ledgers cannot drift apart.

use chrono::NaiveDate;

use crate::audit::{Action, AuditRecorder, LogEntry, RelatedEntity, Snapshot};
use crate::error::{ClinicError, ClinicResult};
use crate::models::{Expense, ExpenseCategory, ExpenseId, Money, UserId};
use crate::storage::Storage;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
    actor: Option<UserId>,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage, actor: Option<UserId>) -> Self {
        Self { storage, actor }
    }

    /// Record a manual expense
    pub fn add(
        &self,
        description: &str,
        amount: Money,
        category: ExpenseCategory,
        date: NaiveDate,
    ) -> ClinicResult<Expense> {
        let expense = Expense::new(description, amount, category, date);
        expense.validate().map_err(ClinicError::Validation)?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        self.recorder().record(LogEntry::create(
            Action::ExpenseAdded,
            format!("Expense '{}' of {} recorded", expense.description, expense.amount),
            RelatedEntity::expense(expense.id),
            self.actor,
        ));

        Ok(expense)
    }

    /// Get an expense by ID
    pub fn get(&self, id: ExpenseId) -> ClinicResult<Option<Expense>> {
        self.storage.expenses.get(id)
    }

    /// List all expenses
    pub fn list(&self) -> ClinicResult<Vec<Expense>> {
        self.storage.expenses.get_all()
    }

    /// Total of all recorded expenses
    pub fn total(&self) -> ClinicResult<Money> {
        Ok(self.storage.expenses.get_all()?.iter().map(|e| e.amount).sum())
    }

    /// Update an expense's fields, logging the prior state
    pub fn update(
        &self,
        id: ExpenseId,
        description: Option<&str>,
        amount: Option<Money>,
        category: Option<ExpenseCategory>,
        date: Option<NaiveDate>,
    ) -> ClinicResult<Expense> {
        let mut expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or(ClinicError::NotFound {
                entity_type: "Expense",
                identifier: id.to_string(),
            })?;

        if expense.is_payment_linked() {
            return Err(ClinicError::Validation(
                "VAT expenses are managed through their payment".into(),
            ));
        }

        let prior = expense.clone();
        if let Some(description) = description {
            expense.description = description.to_string();
        }
        if let Some(amount) = amount {
            expense.amount = amount;
        }
        if let Some(category) = category {
            expense.category = category;
        }
        if let Some(date) = date {
            expense.date = date;
        }
        expense.validate().map_err(ClinicError::Validation)?;
        expense.touch();

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        self.recorder().record(LogEntry::update(
            Action::ExpenseUpdated,
            format!("Expense '{}' updated", expense.description),
            RelatedEntity::expense(expense.id),
            Snapshot::Expense(prior),
            self.actor,
        ));

        Ok(expense)
    }

    /// Delete a manual expense, keeping its state in the log for undo
    pub fn delete(&self, id: ExpenseId) -> ClinicResult<()> {
        let expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or(ClinicError::NotFound {
                entity_type: "Expense",
                identifier: id.to_string(),
            })?;

        if expense.is_payment_linked() {
            return Err(ClinicError::Validation(
                "VAT expenses are managed through their payment".into(),
            ));
        }

        self.storage.expenses.delete(id)?;
        self.storage.expenses.save()?;

        self.recorder().record(LogEntry::delete(
            Action::ExpenseDeleted,
            format!("Expense '{}' deleted", expense.description),
            RelatedEntity::expense(id),
            Snapshot::Expense(expense),
            self.actor,
        ));

        Ok(())
    }

    fn recorder(&self) -> AuditRecorder<'a> {
        AuditRecorder::new(self.storage)
    }
}
