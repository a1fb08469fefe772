//! Appointment model
//!
//! Appointments optionally consume one session from a client's package.
//! `session_consumed` records whether this particular row decremented a
//! service counter, so the undo engine can mirror the adjustment exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AppointmentId, ClientId, ServiceId};

/// Status of an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Scheduled and expected to happen
    #[default]
    Scheduled,
    /// The session took place
    Completed,
    /// Cancelled before it happened
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => write!(f, "Scheduled"),
            Self::Completed => write!(f, "Completed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A client appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique identifier
    pub id: AppointmentId,

    /// The attending client
    pub client_id: ClientId,

    /// The package this appointment draws a session from, if any
    pub service_id: Option<ServiceId>,

    /// When the appointment takes place
    pub scheduled_at: DateTime<Utc>,

    /// Appointment status
    #[serde(default)]
    pub status: AppointmentStatus,

    /// Whether this appointment consumed a session from its service
    #[serde(default)]
    pub session_consumed: bool,

    /// Free-text note
    #[serde(default)]
    pub note: String,

    /// When the appointment row was created
    pub created_at: DateTime<Utc>,

    /// When the appointment row was last modified
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Create a new appointment
    pub fn new(client_id: ClientId, scheduled_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: AppointmentId::new(),
            client_id,
            service_id: None,
            scheduled_at,
            status: AppointmentStatus::Scheduled,
            session_consumed: false,
            note: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an appointment that draws a session from a package
    ///
    /// Callers decrement the package counter before constructing the row,
    /// so the row is born with `session_consumed` set.
    pub fn with_service(
        client_id: ClientId,
        service_id: ServiceId,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        let mut appointment = Self::new(client_id, scheduled_at);
        appointment.service_id = Some(service_id);
        appointment.session_consumed = true;
        appointment
    }

    /// Check if the appointment can still be cancelled
    pub fn is_cancellable(&self) -> bool {
        matches!(self.status, AppointmentStatus::Scheduled)
    }

    /// Mark the appointment as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_appointment() {
        let appointment = Appointment::new(ClientId::new(), Utc::now());
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert!(!appointment.session_consumed);
        assert!(appointment.is_cancellable());
    }

    #[test]
    fn test_with_service() {
        let service_id = ServiceId::new();
        let appointment = Appointment::with_service(ClientId::new(), service_id, Utc::now());
        assert_eq!(appointment.service_id, Some(service_id));
        assert!(appointment.session_consumed);
    }

    #[test]
    fn test_cancelled_not_cancellable() {
        let mut appointment = Appointment::new(ClientId::new(), Utc::now());
        appointment.status = AppointmentStatus::Cancelled;
        assert!(!appointment.is_cancellable());
    }
}
