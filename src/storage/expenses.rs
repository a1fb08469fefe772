//! Expense repository for JSON storage
//!
//! The by-payment query is what lets the undo engine find the VAT expenses
//! a credit-card payment spawned.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{Expense, ExpenseId, PaymentId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable expense file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Repository for expense persistence
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, Expense>>,
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn lock_err(e: impl std::fmt::Display) -> ClinicError {
        ClinicError::Storage(format!("Failed to acquire lock: {}", e))
    }

    /// Load expenses from disk
    pub fn load(&self) -> ClinicResult<()> {
        let file_data: ExpenseData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(Self::lock_err)?;

        data.clear();
        for expense in file_data.expenses {
            data.insert(expense.id, expense);
        }
        Ok(())
    }

    /// Save expenses to disk
    pub fn save(&self) -> ClinicResult<()> {
        let data = self.data.read().map_err(Self::lock_err)?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    /// Get an expense by ID
    pub fn get(&self, id: ExpenseId) -> ClinicResult<Option<Expense>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.get(&id).cloned())
    }

    /// Get all expenses, newest first
    pub fn get_all(&self) -> ClinicResult<Vec<Expense>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let mut expenses: Vec<_> = data.values().cloned().collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenses)
    }

    /// Get the expenses spawned by a payment (the VAT expenses)
    pub fn get_by_payment(&self, payment_id: PaymentId) -> ClinicResult<Vec<Expense>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data
            .values()
            .filter(|e| e.payment_id == Some(payment_id))
            .cloned()
            .collect())
    }

    /// Insert or update an expense
    pub fn upsert(&self, expense: Expense) -> ClinicResult<()> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        data.insert(expense.id, expense);
        Ok(())
    }

    /// Delete an expense, returning whether it existed
    pub fn delete(&self, id: ExpenseId) -> ClinicResult<bool> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        Ok(data.remove(&id).is_some())
    }

    /// Count expenses
    pub fn count(&self) -> ClinicResult<usize> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.len())
    }
}
