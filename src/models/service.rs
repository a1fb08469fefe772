//! Service (sold package) model
//!
//! A service row records a package sold to a client, with a session counter
//! that appointments consume. The remaining-session counter is the one piece
//! of derived state the undo engine must keep consistent with appointments.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ClientId, ServiceId};
use super::money::Money;

/// A package sold to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Unique identifier
    pub id: ServiceId,

    /// The client who bought the package
    pub client_id: ClientId,

    /// Package name (usually copied from a ServiceType)
    pub name: String,

    /// Total package price
    pub total_price: Money,

    /// Number of sessions included
    pub total_sessions: u32,

    /// Sessions not yet consumed by appointments
    pub remaining_sessions: u32,

    /// When the package starts
    pub start_date: NaiveDate,

    /// When the service row was created
    pub created_at: DateTime<Utc>,

    /// When the service row was last modified
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Create a new sold package with all sessions remaining
    pub fn new(
        client_id: ClientId,
        name: impl Into<String>,
        total_price: Money,
        total_sessions: u32,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ServiceId::new(),
            client_id,
            name: name.into(),
            total_price,
            total_sessions,
            remaining_sessions: total_sessions,
            start_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the service's fields
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Service name cannot be empty".to_string());
        }
        if self.total_sessions == 0 {
            return Err("Service must include at least one session".to_string());
        }
        if self.remaining_sessions > self.total_sessions {
            return Err(format!(
                "Remaining sessions ({}) exceed total sessions ({})",
                self.remaining_sessions, self.total_sessions
            ));
        }
        if self.total_price.is_negative() {
            return Err("Service price cannot be negative".to_string());
        }
        Ok(())
    }

    /// Check whether the package has sessions left to consume
    pub fn has_sessions_left(&self) -> bool {
        self.remaining_sessions > 0
    }

    /// Check whether the package is fully consumed
    pub fn is_exhausted(&self) -> bool {
        self.remaining_sessions == 0
    }

    /// Number of sessions already consumed
    pub fn consumed_sessions(&self) -> u32 {
        self.total_sessions - self.remaining_sessions
    }

    /// Mark the service as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> Service {
        Service::new(
            ClientId::new(),
            "Package A",
            Money::from_units(1000),
            5,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_new_service_all_sessions_remaining() {
        let svc = test_service();
        assert_eq!(svc.total_sessions, 5);
        assert_eq!(svc.remaining_sessions, 5);
        assert_eq!(svc.consumed_sessions(), 0);
        assert!(svc.has_sessions_left());
        assert!(svc.validate().is_ok());
    }

    #[test]
    fn test_exhausted() {
        let mut svc = test_service();
        svc.remaining_sessions = 0;
        assert!(svc.is_exhausted());
        assert_eq!(svc.consumed_sessions(), 5);
    }

    #[test]
    fn test_remaining_over_total_invalid() {
        let mut svc = test_service();
        svc.remaining_sessions = 6;
        assert!(svc.validate().is_err());
    }
}
