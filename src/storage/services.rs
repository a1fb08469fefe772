//! Service (sold package) repository for JSON storage
//!
//! Indexed by client so per-client package listings don't scan everything.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{ClientId, Service, ServiceId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable service file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ServiceData {
    services: Vec<Service>,
}

/// Repository for service persistence with a client index
pub struct ServiceRepository {
    path: PathBuf,
    data: RwLock<HashMap<ServiceId, Service>>,
    /// Index: client_id -> service_ids
    by_client: RwLock<HashMap<ClientId, Vec<ServiceId>>>,
}

impl ServiceRepository {
    /// Create a new service repository
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

    /// Load services from disk and build the client index
    pub fn load(&self) -> ClinicResult<()> {
        let file_data: ServiceData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(Self::lock_err)?;
        let mut by_client = self.by_client.write().map_err(Self::lock_err)?;

        data.clear();
        by_client.clear();

        for service in file_data.services {
            by_client.entry(service.client_id).or_default().push(service.id);
            data.insert(service.id, service);
        }
        Ok(())
    }

    /// Save services to disk
    pub fn save(&self) -> ClinicResult<()> {
        let data = self.data.read().map_err(Self::lock_err)?;

        let mut services: Vec<_> = data.values().cloned().collect();
        services.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        write_json_atomic(&self.path, &ServiceData { services })
    }

    /// Get a service by ID
    pub fn get(&self, id: ServiceId) -> ClinicResult<Option<Service>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.get(&id).cloned())
    }

    /// Get all services
    pub fn get_all(&self) -> ClinicResult<Vec<Service>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let mut services: Vec<_> = data.values().cloned().collect();
        services.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(services)
    }

    /// Get services belonging to a client
    pub fn get_by_client(&self, client_id: ClientId) -> ClinicResult<Vec<Service>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let by_client = self.by_client.read().map_err(Self::lock_err)?;

        let ids = by_client.get(&client_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut services: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        services.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(services)
    }

    /// Insert or update a service
    pub fn upsert(&self, service: Service) -> ClinicResult<()> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        let mut by_client = self.by_client.write().map_err(Self::lock_err)?;

        if let Some(old) = data.get(&service.id) {
            if let Some(ids) = by_client.get_mut(&old.client_id) {
                ids.retain(|&id| id != service.id);
            }
        }
        by_client.entry(service.client_id).or_default().push(service.id);
        data.insert(service.id, service);
        Ok(())
    }

    /// Delete a service, returning whether it existed
    pub fn delete(&self, id: ServiceId) -> ClinicResult<bool> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        let mut by_client = self.by_client.write().map_err(Self::lock_err)?;

        if let Some(service) = data.remove(&id) {
            if let Some(ids) = by_client.get_mut(&service.client_id) {
                ids.retain(|&sid| sid != id);
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count services
    pub fn count(&self) -> ClinicResult<usize> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.len())
    }
}
