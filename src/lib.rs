//! clinic-ledger - Terminal-based practice bookkeeping with a reversible log
//!
//! This library provides the core functionality for the clinic-ledger
//! application: client, package, payment, expense, appointment and
//! measurement tracking for a small personal-services practice, with an
//! append-only audit log and administrator undo.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (clients, packages, payments, etc.)
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging system (actions, snapshots, recorder)
//! - `undo`: Reversal of audit log entries
//! - `services`: Business logic layer
//! - `session`: Login session tracking
//! - `display`: Terminal output formatting
//! - `export`: CSV and JSON data export
//! - `cli`: clap command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use clinic_ledger::config::{paths::ClinicPaths, settings::Settings};
//!
//! let paths = ClinicPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;
pub mod undo;

pub use error::ClinicError;
