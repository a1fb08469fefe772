//! Measurement repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{ClientId, Measurement, MeasurementId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable measurement file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MeasurementData {
    measurements: Vec<Measurement>,
}

/// Repository for measurement persistence
pub struct MeasurementRepository {
    path: PathBuf,
    data: RwLock<HashMap<MeasurementId, Measurement>>,
}

impl MeasurementRepository {
    /// Create a new measurement repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn lock_err(e: impl std::fmt::Display) -> ClinicError {
        ClinicError::Storage(format!("Failed to acquire lock: {}", e))
    }

    /// Load measurements from disk
    pub fn load(&self) -> ClinicResult<()> {
        let file_data: MeasurementData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(Self::lock_err)?;

        data.clear();
        for measurement in file_data.measurements {
            data.insert(measurement.id, measurement);
        }
        Ok(())
    }

    /// Save measurements to disk
    pub fn save(&self) -> ClinicResult<()> {
        let data = self.data.read().map_err(Self::lock_err)?;

        let mut measurements: Vec<_> = data.values().cloned().collect();
        measurements.sort_by(|a, b| b.date.cmp(&a.date));

        write_json_atomic(&self.path, &MeasurementData { measurements })
    }

    /// Get a measurement by ID
    pub fn get(&self, id: MeasurementId) -> ClinicResult<Option<Measurement>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.get(&id).cloned())
    }

    /// Get measurements of a client, newest first
    pub fn get_by_client(&self, client_id: ClientId) -> ClinicResult<Vec<Measurement>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let mut measurements: Vec<_> = data
            .values()
            .filter(|m| m.client_id == client_id)
            .cloned()
            .collect();
        measurements.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(measurements)
    }

    /// Insert or update a measurement
    pub fn upsert(&self, measurement: Measurement) -> ClinicResult<()> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        data.insert(measurement.id, measurement);
        Ok(())
    }

    /// Delete a measurement, returning whether it existed
    pub fn delete(&self, id: MeasurementId) -> ClinicResult<bool> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        Ok(data.remove(&id).is_some())
    }

    /// Count measurements
    pub fn count(&self) -> ClinicResult<usize> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_by_client() {
        let temp = TempDir::new().unwrap();
        let repo = MeasurementRepository::new(temp.path().join("measurements.json"));
        repo.load().unwrap();

        let client_id = ClientId::new();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        repo.upsert(Measurement::new(client_id, date)).unwrap();
        repo.upsert(Measurement::new(ClientId::new(), date)).unwrap();

        assert_eq!(repo.get_by_client(client_id).unwrap().len(), 1);
    }
}
