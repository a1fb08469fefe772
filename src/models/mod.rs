//! Core data models for clinic-ledger
//!
//! All entities use strongly-typed UUID identifiers and serde for JSON
//! persistence. Monetary amounts use the `Money` cents newtype.

pub mod appointment;
pub mod client;
pub mod expense;
pub mod ids;
pub mod measurement;
pub mod money;
pub mod payment;
pub mod service;
pub mod service_type;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus};
pub use client::Client;
pub use expense::{Expense, ExpenseCategory};
pub use ids::{
    AppointmentId, ClientId, ExpenseId, LogEntryId, MeasurementId, PaymentId, ServiceId,
    ServiceTypeId, UserId,
};
pub use measurement::Measurement;
pub use money::{Money, MoneyParseError};
pub use payment::{Payment, PaymentMethod};
pub use service::Service;
pub use service_type::ServiceType;
pub use user::{Role, User};
