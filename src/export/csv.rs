//! CSV export functionality
//!
//! Exports payments and expenses to CSV format for spreadsheets and the
//! accountant.

use crate::error::{ClinicError, ClinicResult};
use crate::storage::Storage;
use std::collections::HashMap;
use std::io::Write;

/// Export all payments to CSV
pub fn export_payments_csv<W: Write + ?Sized>(
    storage: &Storage,
    writer: &mut W,
) -> ClinicResult<()> {
    // Build lookups
    let clients = storage.clients.get_all()?;
    let client_names: HashMap<_, _> = clients.iter().map(|c| (c.id, c.name.clone())).collect();

    let services = storage.services.get_all()?;
    let service_names: HashMap<_, _> = services.iter().map(|s| (s.id, s.name.clone())).collect();

    writeln!(writer, "ID,Date,Client,Package,Method,Amount,Note")
        .map_err(|e| ClinicError::Export(e.to_string()))?;

    for payment in storage.payments.get_all()? {
        let client_name = client_names
            .get(&payment.client_id)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());

        let service_name = payment
            .service_id
            .and_then(|id| service_names.get(&id).cloned())
            .unwrap_or_default();

        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            payment.id,
            payment.date,
            escape_csv(&client_name),
            escape_csv(&service_name),
            payment.method,
            payment.amount,
            escape_csv(&payment.note),
        )
        .map_err(|e| ClinicError::Export(e.to_string()))?;
    }

    Ok(())
}

/// Export all expenses to CSV
pub fn export_expenses_csv<W: Write + ?Sized>(
    storage: &Storage,
    writer: &mut W,
) -> ClinicResult<()> {
    writeln!(writer, "ID,Date,Description,Category,Amount,Linked Payment")
        .map_err(|e| ClinicError::Export(e.to_string()))?;

    for expense in storage.expenses.get_all()? {
        let linked = expense
            .payment_id
            .map(|id| id.to_string())
            .unwrap_or_default();

        writeln!(
            writer,
            "{},{},{},{},{},{}",
            expense.id,
            expense.date,
            escape_csv(&expense.description),
            expense.category,
            expense.amount,
            linked,
        )
        .map_err(|e| ClinicError::Export(e.to_string()))?;
    }

    Ok(())
}

/// Escape a string for CSV format
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
