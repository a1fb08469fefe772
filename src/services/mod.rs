//! Service layer for clinic-ledger
//!
//! Business logic on top of the storage layer: validation, cross-entity
//! rules (session counters, VAT expenses), and audit recording. Every
//! mutating operation writes a log entry after its primary change succeeds.

pub mod appointment;
pub mod client;
pub mod expense;
pub mod measurement;
pub mod package;
pub mod payment;
pub mod user;

pub use appointment::AppointmentService;
pub use client::ClientService;
pub use expense::ExpenseService;
pub use measurement::MeasurementService;
pub use package::PackageService;
pub use payment::PaymentService;
pub use user::UserService;
