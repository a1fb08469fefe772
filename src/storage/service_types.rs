//! Service type catalog repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{ServiceType, ServiceTypeId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable catalog file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ServiceTypeData {
    service_types: Vec<ServiceType>,
}

/// Repository for the service type catalog
pub struct ServiceTypeRepository {
    path: PathBuf,
    data: RwLock<HashMap<ServiceTypeId, ServiceType>>,
}

impl ServiceTypeRepository {
    /// Create a new service type repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn lock_err(e: impl std::fmt::Display) -> ClinicError {
        ClinicError::Storage(format!("Failed to acquire lock: {}", e))
    }

    /// Load the catalog from disk
    pub fn load(&self) -> ClinicResult<()> {
        let file_data: ServiceTypeData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(Self::lock_err)?;

        data.clear();
        for st in file_data.service_types {
            data.insert(st.id, st);
        }
        Ok(())
    }

    /// Save the catalog to disk
    pub fn save(&self) -> ClinicResult<()> {
        let data = self.data.read().map_err(Self::lock_err)?;

        let mut service_types: Vec<_> = data.values().cloned().collect();
        service_types.sort_by(|a, b| a.name.cmp(&b.name));

        write_json_atomic(&self.path, &ServiceTypeData { service_types })
    }

    /// Get a catalog entry by ID
    pub fn get(&self, id: ServiceTypeId) -> ClinicResult<Option<ServiceType>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.get(&id).cloned())
    }

    /// Get a catalog entry by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> ClinicResult<Option<ServiceType>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let lower = name.to_lowercase();
        Ok(data
            .values()
            .find(|st| st.name.to_lowercase() == lower)
            .cloned())
    }

    /// Get all catalog entries, sorted by name
    pub fn get_all(&self) -> ClinicResult<Vec<ServiceType>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let mut service_types: Vec<_> = data.values().cloned().collect();
        service_types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(service_types)
    }

    /// Insert or update a catalog entry
    pub fn upsert(&self, service_type: ServiceType) -> ClinicResult<()> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        data.insert(service_type.id, service_type);
        Ok(())
    }

    /// Remove a catalog entry, returning whether it existed
    pub fn delete(&self, id: ServiceTypeId) -> ClinicResult<bool> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        Ok(data.remove(&id).is_some())
    }

    /// Count catalog entries
    pub fn count(&self) -> ClinicResult<usize> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    #[test]
    fn test_get_by_name() {
        let temp = TempDir::new().unwrap();
        let repo = ServiceTypeRepository::new(temp.path().join("service_types.json"));
        repo.load().unwrap();

        repo.upsert(ServiceType::new("Package A", 5, Money::from_units(1000)))
            .unwrap();

        assert!(repo.get_by_name("package a").unwrap().is_some());
        assert!(repo.get_by_name("missing").unwrap().is_none());
    }
}
