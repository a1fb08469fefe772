//! Action taxonomy for the audit log
//!
//! Every tracked mutation is labeled with a closed `Action` enum, and each
//! action carries an explicit `ActionKind` classification. The undo engine
//! dispatches on the stored kind; the human-readable label is display-only
//! and never inspected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an action is reversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Reversed by deleting the related entity
    Create,
    /// Reversed by recreating the related entity from its snapshot
    Delete,
    /// Reversed by writing the snapshot's scalar fields back
    Update,
    /// Not reversible (e.g., the record an undo itself writes)
    Informational,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "CREATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Update => write!(f, "UPDATE"),
            Self::Informational => write!(f, "INFO"),
        }
    }
}

/// The closed set of tracked actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ClientAdded,
    ClientUpdated,
    ClientArchived,
    ClientDeleted,
    ServiceAdded,
    ServiceDeleted,
    ServiceTypeAdded,
    PaymentAdded,
    PaymentDeleted,
    ExpenseAdded,
    ExpenseUpdated,
    ExpenseDeleted,
    AppointmentAdded,
    AppointmentCancelled,
    AppointmentDeleted,
    MeasurementAdded,
    MeasurementDeleted,
    SessionDeducted,
    UserAdded,
    UndoPerformed,
}

impl Action {
    /// The explicit classification the undo engine dispatches on
    ///
    /// This mapping is total by construction: adding an action without
    /// classifying it is a compile error, not a silently unclassifiable
    /// log entry.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::ClientAdded
            | Self::ServiceAdded
            | Self::ServiceTypeAdded
            | Self::PaymentAdded
            | Self::ExpenseAdded
            | Self::AppointmentAdded
            | Self::MeasurementAdded
            | Self::UserAdded => ActionKind::Create,

            Self::ClientDeleted
            | Self::ServiceDeleted
            | Self::PaymentDeleted
            | Self::ExpenseDeleted
            | Self::AppointmentDeleted
            | Self::MeasurementDeleted => ActionKind::Delete,

            Self::ClientUpdated
            | Self::ClientArchived
            | Self::ExpenseUpdated
            | Self::AppointmentCancelled
            | Self::SessionDeducted => ActionKind::Update,

            Self::UndoPerformed => ActionKind::Informational,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ClientAdded => "Client Added",
            Self::ClientUpdated => "Client Updated",
            Self::ClientArchived => "Client Archived",
            Self::ClientDeleted => "Client Deleted",
            Self::ServiceAdded => "Service Added",
            Self::ServiceDeleted => "Service Deleted",
            Self::ServiceTypeAdded => "Service Type Added",
            Self::PaymentAdded => "Payment Added",
            Self::PaymentDeleted => "Payment Deleted",
            Self::ExpenseAdded => "Expense Added",
            Self::ExpenseUpdated => "Expense Updated",
            Self::ExpenseDeleted => "Expense Deleted",
            Self::AppointmentAdded => "Appointment Added",
            Self::AppointmentCancelled => "Appointment Cancelled",
            Self::AppointmentDeleted => "Appointment Deleted",
            Self::MeasurementAdded => "Measurement Added",
            Self::MeasurementDeleted => "Measurement Deleted",
            Self::SessionDeducted => "Session Deducted",
            Self::UserAdded => "User Added",
            Self::UndoPerformed => "Undo Performed",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Action::PaymentAdded.kind(), ActionKind::Create);
        assert_eq!(Action::ClientDeleted.kind(), ActionKind::Delete);
        assert_eq!(Action::AppointmentCancelled.kind(), ActionKind::Update);
        assert_eq!(Action::SessionDeducted.kind(), ActionKind::Update);
        assert_eq!(Action::UndoPerformed.kind(), ActionKind::Informational);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(Action::PaymentAdded.to_string(), "Payment Added");
        assert_eq!(Action::ClientDeleted.to_string(), "Client Deleted");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let json = serde_json::to_string(&Action::ExpenseAdded).unwrap();
        assert_eq!(json, "\"expense_added\"");
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Action::ExpenseAdded);
    }
}
