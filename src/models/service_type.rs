//! Service type catalog model
//!
//! A service type describes a package the practice offers (e.g., "5-session
//! nutrition program") with default pricing and session count. Selling a
//! package to a client creates a `Service` row from one of these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ServiceTypeId;
use super::money::Money;

/// A catalog entry describing an offered package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceType {
    /// Unique identifier
    pub id: ServiceTypeId,

    /// Catalog name (unique, case-insensitive)
    pub name: String,

    /// Default number of sessions included
    pub default_sessions: u32,

    /// Default package price
    pub default_price: Money,

    /// When the catalog entry was created
    pub created_at: DateTime<Utc>,
}

impl ServiceType {
    /// Create a new service type
    pub fn new(name: impl Into<String>, default_sessions: u32, default_price: Money) -> Self {
        Self {
            id: ServiceTypeId::new(),
            name: name.into(),
            default_sessions,
            default_price,
            created_at: Utc::now(),
        }
    }

    /// Validate the catalog entry
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Service type name cannot be empty".to_string());
        }
        if self.default_sessions == 0 {
            return Err("Service type must include at least one session".to_string());
        }
        if self.default_price.is_negative() {
            return Err("Service type price cannot be negative".to_string());
        }
        Ok(())
    }
}
