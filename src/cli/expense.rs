//! Expense CLI commands

use clap::Subcommand;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{ExpenseCategory, Money, UserId};
use crate::services::ExpenseService;
use crate::storage::Storage;

use super::package::parse_date_or_today;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record a manual expense
    Add {
        /// What the money was spent on
        description: String,
        /// Amount (e.g., "800.00")
        amount: String,
        /// Category (rent, supplies, salary, other)
        #[arg(short, long, default_value = "other")]
        category: String,
        /// Expense date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List expenses
    List,
    /// Edit a manual expense
    Edit {
        /// Expense ID
        expense: String,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Delete a manual expense
    Delete {
        /// Expense ID
        expense: String,
    },
}

fn parse_category(s: &str) -> ClinicResult<ExpenseCategory> {
    ExpenseCategory::parse(s).ok_or_else(|| {
        ClinicError::Validation(format!(
            "Invalid category: '{}'. Valid categories: vat, rent, supplies, salary, other",
            s
        ))
    })
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    actor: Option<UserId>,
    cmd: ExpenseCommands,
) -> ClinicResult<()> {
    let expenses = ExpenseService::new(storage, actor);

    match cmd {
        ExpenseCommands::Add {
            description,
            amount,
            category,
            date,
        } => {
            let amount = Money::parse(&amount)
                .map_err(|e| ClinicError::Validation(format!("Invalid amount: {}", e)))?;
            let category = parse_category(&category)?;
            let date = parse_date_or_today(date.as_deref())?;

            let expense = expenses.add(&description, amount, category, date)?;
            println!("Recorded expense '{}' ({})", expense.description, expense.amount);
            println!("  ID: {}", expense.id);
        }

        ExpenseCommands::List => {
            let list = expenses.list()?;
            if list.is_empty() {
                println!("No expenses found.");
            }
            for expense in &list {
                let marker = if expense.is_payment_linked() { "  [VAT]" } else { "" };
                println!(
                    "{}  {}  {}  {}  {}{}",
                    expense.id,
                    expense.date,
                    expense.category,
                    expense.amount,
                    expense.description,
                    marker,
                );
            }
            if !list.is_empty() {
                println!("Total: {}", expenses.total()?);
            }
        }

        ExpenseCommands::Edit {
            expense,
            description,
            amount,
            category,
            date,
        } => {
            let id = expense.parse().map_err(|_| ClinicError::NotFound {
                entity_type: "Expense",
                identifier: expense.clone(),
            })?;

            let amount = amount
                .map(|a| {
                    Money::parse(&a)
                        .map_err(|e| ClinicError::Validation(format!("Invalid amount: {}", e)))
                })
                .transpose()?;
            let category = category.map(|c| parse_category(&c)).transpose()?;
            let date = date
                .map(|d| parse_date_or_today(Some(&d)))
                .transpose()?;

            let updated = expenses.update(id, description.as_deref(), amount, category, date)?;
            println!("Updated expense '{}'", updated.description);
        }

        ExpenseCommands::Delete { expense } => {
            let id = expense.parse().map_err(|_| ClinicError::NotFound {
                entity_type: "Expense",
                identifier: expense.clone(),
            })?;
            expenses.delete(id)?;
            println!("Deleted expense. Use 'clinic log undo' to reverse.");
        }
    }

    Ok(())
}
