//! Operator (user) model
//!
//! Users are the operators of the ledger. Role controls access to the undo
//! control: only administrators may reverse logged mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;

/// Operator role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including undo
    Admin,
    /// Day-to-day data entry, no undo
    #[default]
    Staff,
}

impl Role {
    /// Parse a role from user input
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" | "administrator" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }

    /// Whether this role may invoke the undo engine
    pub fn can_undo(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "Admin"),
            Self::Staff => write!(f, "Staff"),
        }
    }
}

/// An operator account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Display name (unique, case-insensitive)
    pub name: String,

    /// Role
    #[serde(default)]
    pub role: Role,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new operator account
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            role,
            created_at: Utc::now(),
        }
    }

    /// Validate the user's fields
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("User name cannot be empty".to_string());
        }
        Ok(())
    }
}
