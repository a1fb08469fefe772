//! Typed previous-state snapshots
//!
//! A snapshot captures an entity's full state before a delete or update, as
//! a closed per-entity sum type. Delete snapshots of parent entities carry
//! their child rows explicitly, so a restore rebuilds the whole subtree
//! without any runtime shape inspection.

use serde::{Deserialize, Serialize};

use crate::models::{
    Appointment, Client, Expense, Measurement, Payment, Service, ServiceType, User,
};

use super::entry::EntityKind;

/// A payment together with the expenses it spawned (the VAT case)
///
/// Restoring a deleted payment recreates these expense rows verbatim; they
/// are never re-derived from the VAT rule, so amounts cannot drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSnapshot {
    pub payment: Payment,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl PaymentSnapshot {
    /// Snapshot a payment with its linked expenses
    pub fn new(payment: Payment, expenses: Vec<Expense>) -> Self {
        Self { payment, expenses }
    }
}

/// A client together with every child collection the schema hangs off it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSnapshot {
    pub client: Client,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub payments: Vec<PaymentSnapshot>,
}

impl ClientSnapshot {
    /// Snapshot of the client row alone, with no child collections
    ///
    /// Used by updates, where only the client's own fields are writable.
    pub fn of(client: Client) -> Self {
        Self {
            client,
            services: Vec::new(),
            measurements: Vec::new(),
            appointments: Vec::new(),
            payments: Vec::new(),
        }
    }
}

/// Previous state of exactly one entity, captured before a mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "entity", content = "state", rename_all = "snake_case")]
pub enum Snapshot {
    Client(Box<ClientSnapshot>),
    Service(Service),
    ServiceType(ServiceType),
    Payment(PaymentSnapshot),
    Expense(Expense),
    Appointment(Appointment),
    Measurement(Measurement),
    User(User),
}

impl Snapshot {
    /// The entity kind this snapshot describes
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Client(_) => EntityKind::Client,
            Self::Service(_) => EntityKind::Service,
            Self::ServiceType(_) => EntityKind::ServiceType,
            Self::Payment(_) => EntityKind::Payment,
            Self::Expense(_) => EntityKind::Expense,
            Self::Appointment(_) => EntityKind::Appointment,
            Self::Measurement(_) => EntityKind::Measurement,
            Self::User(_) => EntityKind::User,
        }
    }

    /// Wrap a full client subtree
    pub fn client(snapshot: ClientSnapshot) -> Self {
        Self::Client(Box::new(snapshot))
    }
}
