//! Client model
//!
//! Represents a client (danışan) of the practice. A client is the parent of
//! service packages, payments, appointments, and measurements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ClientId;

/// A client of the practice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier
    pub id: ClientId,

    /// Full name
    pub name: String,

    /// Phone number (used for contact and reminders)
    #[serde(default)]
    pub phone: String,

    /// Email address
    pub email: Option<String>,

    /// Free-text notes (dietary restrictions, referral source, etc.)
    #[serde(default)]
    pub notes: String,

    /// Whether the client has been archived (hidden from default listings)
    #[serde(default)]
    pub archived: bool,

    /// When the client record was created
    pub created_at: DateTime<Utc>,

    /// When the client record was last modified
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Create a new client
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ClientId::new(),
            name: name.into(),
            phone: String::new(),
            email: None,
            notes: String::new(),
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a client with contact details
    pub fn with_contact(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        let mut client = Self::new(name);
        client.phone = phone.into();
        client.email = email;
        client
    }

    /// Validate the client's fields
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Client name cannot be empty".to_string());
        }
        if self.name.len() > 120 {
            return Err("Client name too long (max 120 characters)".to_string());
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(format!("Invalid email address: {}", email));
            }
        }
        Ok(())
    }

    /// Mark the client as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let client = Client::new("Ayşe Yılmaz");
        assert_eq!(client.name, "Ayşe Yılmaz");
        assert!(!client.archived);
        assert!(client.validate().is_ok());
    }

    #[test]
    fn test_empty_name_invalid() {
        let client = Client::new("  ");
        assert!(client.validate().is_err());
    }

    #[test]
    fn test_invalid_email() {
        let client = Client::with_contact("Test", "5551234", Some("not-an-email".into()));
        assert!(client.validate().is_err());

        let client = Client::with_contact("Test", "5551234", Some("test@example.com".into()));
        assert!(client.validate().is_ok());
    }
}
