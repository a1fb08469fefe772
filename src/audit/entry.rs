//! Audit entry data structures
//!
//! Defines the structure of log entries: the action taken, a human-readable
//! summary, an optional pointer to the affected entity, and an optional
//! snapshot of its prior state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::{
    AppointmentId, ClientId, ExpenseId, LogEntryId, MeasurementId, PaymentId, ServiceId,
    ServiceTypeId, UserId,
};

use super::action::{Action, ActionKind};
use super::snapshot::Snapshot;

/// Types of entities the log can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    Service,
    ServiceType,
    Payment,
    Expense,
    Appointment,
    Measurement,
    User,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "Client"),
            Self::Service => write!(f, "Service"),
            Self::ServiceType => write!(f, "ServiceType"),
            Self::Payment => write!(f, "Payment"),
            Self::Expense => write!(f, "Expense"),
            Self::Appointment => write!(f, "Appointment"),
            Self::Measurement => write!(f, "Measurement"),
            Self::User => write!(f, "User"),
        }
    }
}

/// Pointer to the entity a log entry affected
///
/// The entity kind and id always travel together; a log entry either points
/// at one entity or at nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl RelatedEntity {
    pub fn client(id: ClientId) -> Self {
        Self {
            kind: EntityKind::Client,
            id: *id.as_uuid(),
        }
    }

    pub fn service(id: ServiceId) -> Self {
        Self {
            kind: EntityKind::Service,
            id: *id.as_uuid(),
        }
    }

    pub fn service_type(id: ServiceTypeId) -> Self {
        Self {
            kind: EntityKind::ServiceType,
            id: *id.as_uuid(),
        }
    }

    pub fn payment(id: PaymentId) -> Self {
        Self {
            kind: EntityKind::Payment,
            id: *id.as_uuid(),
        }
    }

    pub fn expense(id: ExpenseId) -> Self {
        Self {
            kind: EntityKind::Expense,
            id: *id.as_uuid(),
        }
    }

    pub fn appointment(id: AppointmentId) -> Self {
        Self {
            kind: EntityKind::Appointment,
            id: *id.as_uuid(),
        }
    }

    pub fn measurement(id: MeasurementId) -> Self {
        Self {
            kind: EntityKind::Measurement,
            id: *id.as_uuid(),
        }
    }

    pub fn user(id: UserId) -> Self {
        Self {
            kind: EntityKind::User,
            id: *id.as_uuid(),
        }
    }
}

/// A single audit log entry
///
/// Immutable once written, except for `is_undone`, which flips to true at
/// most once when an administrator reverses the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique identifier
    pub id: LogEntryId,

    /// What happened
    pub action: Action,

    /// Human-readable summary
    pub details: String,

    /// The acting operator; absent for system-generated entries
    pub user_id: Option<UserId>,

    /// The affected entity; absent for purely informational entries
    pub related: Option<RelatedEntity>,

    /// Prior state of the affected entity (delete and update actions only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_data: Option<Snapshot>,

    /// Whether this entry has been reversed
    #[serde(default)]
    pub is_undone: bool,

    /// When the entry was written (UTC)
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    /// Entry for a create action (no prior state exists)
    pub fn create(
        action: Action,
        details: impl Into<String>,
        related: RelatedEntity,
        user_id: Option<UserId>,
    ) -> Self {
        debug_assert_eq!(action.kind(), ActionKind::Create);
        Self {
            id: LogEntryId::new(),
            action,
            details: details.into(),
            user_id,
            related: Some(related),
            previous_data: None,
            is_undone: false,
            created_at: Utc::now(),
        }
    }

    /// Entry for a delete action, carrying the deleted entity's snapshot
    pub fn delete(
        action: Action,
        details: impl Into<String>,
        related: RelatedEntity,
        snapshot: Snapshot,
        user_id: Option<UserId>,
    ) -> Self {
        debug_assert_eq!(action.kind(), ActionKind::Delete);
        Self {
            id: LogEntryId::new(),
            action,
            details: details.into(),
            user_id,
            related: Some(related),
            previous_data: Some(snapshot),
            is_undone: false,
            created_at: Utc::now(),
        }
    }

    /// Entry for an update action, carrying the prior field values
    pub fn update(
        action: Action,
        details: impl Into<String>,
        related: RelatedEntity,
        snapshot: Snapshot,
        user_id: Option<UserId>,
    ) -> Self {
        debug_assert_eq!(action.kind(), ActionKind::Update);
        Self {
            id: LogEntryId::new(),
            action,
            details: details.into(),
            user_id,
            related: Some(related),
            previous_data: Some(snapshot),
            is_undone: false,
            created_at: Utc::now(),
        }
    }

    /// Purely informational entry with no entity pointer (e.g., an undo record)
    pub fn informational(
        action: Action,
        details: impl Into<String>,
        user_id: Option<UserId>,
    ) -> Self {
        Self {
            id: LogEntryId::new(),
            action,
            details: details.into(),
            user_id,
            related: None,
            previous_data: None,
            is_undone: false,
            created_at: Utc::now(),
        }
    }

    /// The stored classification of this entry's action
    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} - {}",
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action,
            self.details
        );

        if let Some(related) = &self.related {
            output.push_str(&format!(" ({} {})", related.kind, related.id));
        }

        if self.is_undone {
            output.push_str(" [undone]");
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, Expense, ExpenseCategory, Money};
    use chrono::NaiveDate;

    #[test]
    fn test_create_entry_has_no_snapshot() {
        let client = Client::new("Ayşe");
        let entry = LogEntry::create(
            Action::ClientAdded,
            format!("Client '{}' added", client.name),
            RelatedEntity::client(client.id),
            None,
        );

        assert_eq!(entry.kind(), ActionKind::Create);
        assert!(entry.previous_data.is_none());
        assert!(entry.related.is_some());
        assert!(!entry.is_undone);
    }

    #[test]
    fn test_delete_entry_carries_snapshot() {
        let expense = Expense::new(
            "Rent",
            Money::from_units(500),
            ExpenseCategory::Rent,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        let entry = LogEntry::delete(
            Action::ExpenseDeleted,
            "Expense 'Rent' deleted",
            RelatedEntity::expense(expense.id),
            Snapshot::Expense(expense),
            None,
        );

        assert_eq!(entry.kind(), ActionKind::Delete);
        assert!(entry.previous_data.is_some());
    }

    #[test]
    fn test_informational_entry_has_no_pointer() {
        let entry = LogEntry::informational(Action::UndoPerformed, "Undid 'Payment Added'", None);
        assert!(entry.related.is_none());
        assert!(entry.previous_data.is_none());
        assert_eq!(entry.kind(), ActionKind::Informational);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let client = Client::new("Test");
        let entry = LogEntry::create(
            Action::ClientAdded,
            "Client 'Test' added",
            RelatedEntity::client(client.id),
            None,
        );

        let json = serde_json::to_string(&entry).unwrap();
        let back: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, entry.id);
        assert_eq!(back.action, Action::ClientAdded);
    }

    #[test]
    fn test_human_readable_format() {
        let client = Client::new("Ayşe");
        let entry = LogEntry::create(
            Action::ClientAdded,
            "Client 'Ayşe' added",
            RelatedEntity::client(client.id),
            None,
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("Client Added"));
        assert!(formatted.contains("Ayşe"));
        assert!(!formatted.contains("[undone]"));
    }
}
