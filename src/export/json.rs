//! JSON export functionality
//!
//! Exports the complete database to JSON format with schema versioning.

use crate::error::{ClinicError, ClinicResult};
use crate::models::{
    Appointment, Client, Expense, Measurement, Payment, Service, ServiceType, User,
};
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full database export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// All clients
    pub clients: Vec<Client>,

    /// All sold packages
    pub services: Vec<Service>,

    /// The package catalog
    pub service_types: Vec<ServiceType>,

    /// All payments
    pub payments: Vec<Payment>,

    /// All expenses
    pub expenses: Vec<Expense>,

    /// All appointments
    pub appointments: Vec<Appointment>,

    /// All measurements
    pub measurements: Vec<Measurement>,

    /// All operators
    pub users: Vec<User>,

    /// Export metadata
    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Total number of clients
    pub client_count: usize,

    /// Total number of payments
    pub payment_count: usize,

    /// Total number of expenses
    pub expense_count: usize,

    /// Total number of audit log entries (the log itself is exported
    /// separately and never rewritten)
    pub log_entry_count: usize,

    /// Date range of payments (earliest)
    pub earliest_payment: Option<String>,

    /// Date range of payments (latest)
    pub latest_payment: Option<String>,
}

impl FullExport {
    /// Create a new full export from storage
    pub fn from_storage(storage: &Storage) -> ClinicResult<Self> {
        let clients = storage.clients.get_all()?;
        let services = storage.services.get_all()?;
        let service_types = storage.service_types.get_all()?;
        let payments = storage.payments.get_all()?;
        let expenses = storage.expenses.get_all()?;
        let appointments = storage.appointments.get_all()?;
        let measurements = {
            let mut all = Vec::new();
            for client in &clients {
                all.extend(storage.measurements.get_by_client(client.id)?);
            }
            all
        };
        let users = storage.users.get_all()?;

        let earliest_payment = payments.iter().map(|p| p.date).min().map(|d| d.to_string());
        let latest_payment = payments.iter().map(|p| p.date).max().map(|d| d.to_string());

        let metadata = ExportMetadata {
            client_count: clients.len(),
            payment_count: payments.len(),
            expense_count: expenses.len(),
            log_entry_count: storage.log.count()?,
            earliest_payment,
            latest_payment,
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            clients,
            services,
            service_types,
            payments,
            expenses,
            appointments,
            measurements,
            users,
            metadata,
        })
    }
}

/// Export the full database as pretty-printed JSON
pub fn export_full_json<W: Write + ?Sized>(storage: &Storage, writer: &mut W) -> ClinicResult<()> {
    let export = FullExport::from_storage(storage)?;
    let json = serde_json::to_string_pretty(&export)?;
    writer
        .write_all(json.as_bytes())
        .map_err(|e| ClinicError::Export(e.to_string()))?;
    Ok(())
}
