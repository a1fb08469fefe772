//! Payment repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{ClientId, Payment, PaymentId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable payment file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PaymentData {
    payments: Vec<Payment>,
}

/// Repository for payment persistence with a client index
pub struct PaymentRepository {
    path: PathBuf,
    data: RwLock<HashMap<PaymentId, Payment>>,
    /// Index: client_id -> payment_ids
    by_client: RwLock<HashMap<ClientId, Vec<PaymentId>>>,
}

impl PaymentRepository {
    /// Create a new payment repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_client: RwLock::new(HashMap::new()),
        }
    }

    fn lock_err(e: impl std::fmt::Display) -> ClinicError {
        ClinicError::Storage(format!("Failed to acquire lock: {}", e))
    }

    /// Load payments from disk and build the client index
    pub fn load(&self) -> ClinicResult<()> {
        let file_data: PaymentData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(Self::lock_err)?;
        let mut by_client = self.by_client.write().map_err(Self::lock_err)?;

        data.clear();
        by_client.clear();

        for payment in file_data.payments {
            by_client.entry(payment.client_id).or_default().push(payment.id);
            data.insert(payment.id, payment);
        }
        Ok(())
    }

    /// Save payments to disk
    pub fn save(&self) -> ClinicResult<()> {
        let data = self.data.read().map_err(Self::lock_err)?;

        let mut payments: Vec<_> = data.values().cloned().collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        write_json_atomic(&self.path, &PaymentData { payments })
    }

    /// Get a payment by ID
    pub fn get(&self, id: PaymentId) -> ClinicResult<Option<Payment>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.get(&id).cloned())
    }

    /// Get all payments, newest first
    pub fn get_all(&self) -> ClinicResult<Vec<Payment>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let mut payments: Vec<_> = data.values().cloned().collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(payments)
    }

    /// Get payments of a client
    pub fn get_by_client(&self, client_id: ClientId) -> ClinicResult<Vec<Payment>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let by_client = self.by_client.read().map_err(Self::lock_err)?;

        let ids = by_client.get(&client_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut payments: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(payments)
    }

    /// Insert or update a payment
    pub fn upsert(&self, payment: Payment) -> ClinicResult<()> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        let mut by_client = self.by_client.write().map_err(Self::lock_err)?;

        if let Some(old) = data.get(&payment.id) {
            if let Some(ids) = by_client.get_mut(&old.client_id) {
                ids.retain(|&id| id != payment.id);
            }
        }
        by_client.entry(payment.client_id).or_default().push(payment.id);
        data.insert(payment.id, payment);
        Ok(())
    }

    /// Delete a payment, returning whether it existed
    pub fn delete(&self, id: PaymentId) -> ClinicResult<bool> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        let mut by_client = self.by_client.write().map_err(Self::lock_err)?;

        if let Some(payment) = data.remove(&id) {
            if let Some(ids) = by_client.get_mut(&payment.client_id) {
                ids.retain(|&pid| pid != id);
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count payments
    pub fn count(&self) -> ClinicResult<usize> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, PaymentMethod};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_upsert_get_delete() {
        let temp = TempDir::new().unwrap();
        let repo = PaymentRepository::new(temp.path().join("payments.json"));
        repo.load().unwrap();

        let client_id = ClientId::new();
        let payment = Payment::new(
            client_id,
            Money::from_units(1000),
            PaymentMethod::CreditCard,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        );
        let id = payment.id;
        repo.upsert(payment).unwrap();

        assert_eq!(repo.get_by_client(client_id).unwrap().len(), 1);
        assert!(repo.delete(id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
