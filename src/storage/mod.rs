//! Storage layer for clinic-ledger
//!
//! Provides JSON file storage with atomic writes and per-entity
//! repositories behind read-write locks.

pub mod appointments;
pub mod clients;
pub mod expenses;
pub mod file_io;
pub mod log;
pub mod measurements;
pub mod payments;
pub mod service_types;
pub mod services;
pub mod users;

pub use appointments::AppointmentRepository;
pub use clients::ClientRepository;
pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use log::LogRepository;
pub use measurements::MeasurementRepository;
pub use payments::PaymentRepository;
pub use service_types::ServiceTypeRepository;
pub use services::ServiceRepository;
pub use users::UserRepository;

use tracing::debug;

use crate::config::paths::ClinicPaths;
use crate::error::ClinicError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: ClinicPaths,
    pub clients: ClientRepository,
    pub services: ServiceRepository,
    pub service_types: ServiceTypeRepository,
    pub payments: PaymentRepository,
    pub expenses: ExpenseRepository,
    pub appointments: AppointmentRepository,
    pub measurements: MeasurementRepository,
    pub users: UserRepository,
    pub log: LogRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: ClinicPaths) -> Result<Self, ClinicError> {
        // Ensure directories exist
        paths.ensure_directories()?;

        Ok(Self {
            clients: ClientRepository::new(paths.clients_file()),
            services: ServiceRepository::new(paths.services_file()),
            service_types: ServiceTypeRepository::new(paths.service_types_file()),
            payments: PaymentRepository::new(paths.payments_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            appointments: AppointmentRepository::new(paths.appointments_file()),
            measurements: MeasurementRepository::new(paths.measurements_file()),
            users: UserRepository::new(paths.users_file()),
            log: LogRepository::new(paths.log_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &ClinicPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), ClinicError> {
        self.clients.load()?;
        self.services.load()?;
        self.service_types.load()?;
        self.payments.load()?;
        self.expenses.load()?;
        self.appointments.load()?;
        self.measurements.load()?;
        self.users.load()?;
        self.log.load()?;
        debug!(base_dir = %self.paths.base_dir().display(), "loaded all repositories");
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), ClinicError> {
        self.clients.save()?;
        self.services.save()?;
        self.service_types.save()?;
        self.payments.save()?;
        self.expenses.save()?;
        self.appointments.save()?;
        self.measurements.save()?;
        self.users.save()?;
        self.log.save()?;
        debug!("persisted all repositories");
        Ok(())
    }

    /// Check if storage has been initialized (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.paths.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ClinicPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
    }
}
