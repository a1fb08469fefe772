//! Export module for clinic-ledger
//!
//! Provides data export functionality:
//! - CSV: payments and expenses (spreadsheet-compatible)
//! - JSON: machine-readable full database export

pub mod csv;
pub mod json;

pub use csv::{export_expenses_csv, export_payments_csv};
pub use json::{export_full_json, FullExport, EXPORT_SCHEMA_VERSION};
