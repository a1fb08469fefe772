//! Appointment repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{Appointment, AppointmentId, ClientId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable appointment file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AppointmentData {
    appointments: Vec<Appointment>,
}

/// Repository for appointment persistence with a client index
pub struct AppointmentRepository {
    path: PathBuf,
    data: RwLock<HashMap<AppointmentId, Appointment>>,
    /// Index: client_id -> appointment_ids
    by_client: RwLock<HashMap<ClientId, Vec<AppointmentId>>>,
}

impl AppointmentRepository {
    /// Create a new appointment repository
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

    /// Load appointments from disk and build the client index
    pub fn load(&self) -> ClinicResult<()> {
        let file_data: AppointmentData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(Self::lock_err)?;
        let mut by_client = self.by_client.write().map_err(Self::lock_err)?;

        data.clear();
        by_client.clear();

        for appointment in file_data.appointments {
            by_client
                .entry(appointment.client_id)
                .or_default()
                .push(appointment.id);
            data.insert(appointment.id, appointment);
        }
        Ok(())
    }

    /// Save appointments to disk
    pub fn save(&self) -> ClinicResult<()> {
        let data = self.data.read().map_err(Self::lock_err)?;

        let mut appointments: Vec<_> = data.values().cloned().collect();
        appointments.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));

        write_json_atomic(&self.path, &AppointmentData { appointments })
    }

    /// Get an appointment by ID
    pub fn get(&self, id: AppointmentId) -> ClinicResult<Option<Appointment>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.get(&id).cloned())
    }

    /// Get all appointments, newest first
    pub fn get_all(&self) -> ClinicResult<Vec<Appointment>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let mut appointments: Vec<_> = data.values().cloned().collect();
        appointments.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(appointments)
    }

    /// Get appointments of a client
    pub fn get_by_client(&self, client_id: ClientId) -> ClinicResult<Vec<Appointment>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let by_client = self.by_client.read().map_err(Self::lock_err)?;

        let ids = by_client.get(&client_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut appointments: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        appointments.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(appointments)
    }

    /// Insert or update an appointment
    pub fn upsert(&self, appointment: Appointment) -> ClinicResult<()> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        let mut by_client = self.by_client.write().map_err(Self::lock_err)?;

        if let Some(old) = data.get(&appointment.id) {
            if let Some(ids) = by_client.get_mut(&old.client_id) {
                ids.retain(|&id| id != appointment.id);
            }
        }
        by_client
            .entry(appointment.client_id)
            .or_default()
            .push(appointment.id);
        data.insert(appointment.id, appointment);
        Ok(())
    }

    /// Delete an appointment, returning whether it existed
    pub fn delete(&self, id: AppointmentId) -> ClinicResult<bool> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        let mut by_client = self.by_client.write().map_err(Self::lock_err)?;

        if let Some(appointment) = data.remove(&id) {
            if let Some(ids) = by_client.get_mut(&appointment.client_id) {
                ids.retain(|&aid| aid != id);
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count appointments
    pub fn count(&self) -> ClinicResult<usize> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_by_client_index() {
        let temp = TempDir::new().unwrap();
        let repo = AppointmentRepository::new(temp.path().join("appointments.json"));
        repo.load().unwrap();

        let client_id = ClientId::new();
        let appointment = Appointment::new(client_id, Utc::now());
        let id = appointment.id;
        repo.upsert(appointment).unwrap();

        assert_eq!(repo.get_by_client(client_id).unwrap().len(), 1);
        assert!(repo.delete(id).unwrap());
        assert!(repo.get_by_client(client_id).unwrap().is_empty());
    }
}
