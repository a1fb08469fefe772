//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod appointment;
pub mod client;
pub mod expense;
pub mod export;
pub mod log;
pub mod measurement;
pub mod package;
pub mod payment;
pub mod user;

pub use appointment::{handle_appointment_command, AppointmentCommands};
pub use client::{handle_client_command, ClientCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use log::{handle_log_command, LogCommands};
pub use measurement::{handle_measurement_command, MeasurementCommands};
pub use package::{handle_package_command, PackageCommands};
pub use payment::{handle_payment_command, PaymentCommands};
pub use user::{handle_user_command, UserCommands};
