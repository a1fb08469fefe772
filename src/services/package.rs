//! Service package management
//!
//! Sells session packages to clients and tracks their session counters.
//! A package can be created from the catalog (taking the default session
//! count and price) or with explicit values.

use chrono::NaiveDate;

use crate::audit::{Action, AuditRecorder, LogEntry, RelatedEntity, Snapshot};
use crate::error::{ClinicError, ClinicResult};
use crate::models::{ClientId, Money, Service, ServiceId, ServiceType, ServiceTypeId, UserId};
use crate::storage::Storage;

/// Service for package management
pub struct PackageService<'a> {
    storage: &'a Storage,
    actor: Option<UserId>,
}

impl<'a> PackageService<'a> {
    pub fn new(storage: &'a Storage, actor: Option<UserId>) -> Self {
        Self { storage, actor }
    }

    /// Sell a new package to a client
    pub fn sell(
        &self,
        client_id: ClientId,
        name: &str,
        total_price: Money,
        total_sessions: u32,
        start_date: NaiveDate,
    ) -> ClinicResult<Service> {
        let client = self
            .storage
            .clients
            .get(client_id)?
            .ok_or_else(|| ClinicError::client_not_found(client_id.to_string()))?;

        let service = Service::new(client_id, name, total_price, total_sessions, start_date);
        service.validate().map_err(ClinicError::Validation)?;

        self.storage.services.upsert(service.clone())?;
        self.storage.services.save()?;

        self.recorder().record(LogEntry::create(
            Action::ServiceAdded,
            format!(
                "Package '{}' ({} sessions) sold to '{}'",
                service.name, service.total_sessions, client.name
            ),
            RelatedEntity::service(service.id),
            self.actor,
        ));

        Ok(service)
    }

    /// Sell a package using catalog defaults
    pub fn sell_from_catalog(
        &self,
        client_id: ClientId,
        service_type_id: ServiceTypeId,
        start_date: NaiveDate,
    ) -> ClinicResult<Service> {
        let service_type = self.storage.service_types.get(service_type_id)?.ok_or(
            ClinicError::NotFound {
                entity_type: "ServiceType",
                identifier: service_type_id.to_string(),
            },
        )?;

        self.sell(
            client_id,
            &service_type.name,
            service_type.default_price,
            service_type.default_sessions,
            start_date,
        )
    }

    /// Get a package by ID
    pub fn get(&self, id: ServiceId) -> ClinicResult<Option<Service>> {
        self.storage.services.get(id)
    }

    /// List a client's packages
    pub fn list_for_client(&self, client_id: ClientId) -> ClinicResult<Vec<Service>> {
        self.storage.services.get_by_client(client_id)
    }

    /// List all packages
    pub fn list(&self) -> ClinicResult<Vec<Service>> {
        self.storage.services.get_all()
    }

    /// Consume one session from a package without an appointment
    ///
    /// Walk-in visits are deducted directly. The prior counter state goes to
    /// the log so the deduction can be reversed.
    pub fn deduct_session(&self, id: ServiceId) -> ClinicResult<Service> {
        let mut service = self
            .storage
            .services
            .get(id)?
            .ok_or_else(|| ClinicError::service_not_found(id.to_string()))?;

        if !service.has_sessions_left() {
            return Err(ClinicError::NoSessionsLeft {
                package: service.name.clone(),
            });
        }

        let prior = service.clone();
        service.remaining_sessions -= 1;
        service.touch();

        self.storage.services.upsert(service.clone())?;
        self.storage.services.save()?;

        self.recorder().record(LogEntry::update(
            Action::SessionDeducted,
            format!(
                "Session deducted from '{}' ({} left)",
                service.name, service.remaining_sessions
            ),
            RelatedEntity::service(service.id),
            Snapshot::Service(prior),
            self.actor,
        ));

        Ok(service)
    }

    /// Delete a package, keeping its state in the log for undo
    pub fn delete(&self, id: ServiceId) -> ClinicResult<()> {
        let service = self
            .storage
            .services
            .get(id)?
            .ok_or_else(|| ClinicError::service_not_found(id.to_string()))?;

        self.storage.services.delete(id)?;
        self.storage.services.save()?;

        self.recorder().record(LogEntry::delete(
            Action::ServiceDeleted,
            format!("Package '{}' deleted", service.name),
            RelatedEntity::service(service.id),
            Snapshot::Service(service),
            self.actor,
        ));

        Ok(())
    }

    /// Add a reusable catalog entry
    pub fn add_catalog_entry(
        &self,
        name: &str,
        default_sessions: u32,
        default_price: Money,
    ) -> ClinicResult<ServiceType> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClinicError::Validation(
                "Service type name cannot be empty".into(),
            ));
        }
        if self.storage.service_types.get_by_name(name)?.is_some() {
            return Err(ClinicError::Duplicate {
                entity_type: "ServiceType",
                identifier: name.to_string(),
            });
        }

        let service_type = ServiceType::new(name, default_sessions, default_price);
        self.storage.service_types.upsert(service_type.clone())?;
        self.storage.service_types.save()?;

        self.recorder().record(LogEntry::create(
            Action::ServiceTypeAdded,
            format!("Service type '{}' added to catalog", service_type.name),
            RelatedEntity::service_type(service_type.id),
            self.actor,
        ));

        Ok(service_type)
    }

    /// List the catalog
    pub fn list_catalog(&self) -> ClinicResult<Vec<ServiceType>> {
        self.storage.service_types.get_all()
    }

    /// Find a catalog entry by name or ID string
    pub fn find_catalog_entry(&self, identifier: &str) -> ClinicResult<Option<ServiceType>> {
        if let Some(entry) = self.storage.service_types.get_by_name(identifier)? {
            return Ok(Some(entry));
        }
        if let Ok(id) = identifier.parse::<ServiceTypeId>() {
            return self.storage.service_types.get(id);
        }
        Ok(None)
    }

    fn recorder(&self) -> AuditRecorder<'a> {
        AuditRecorder::new(self.storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::ClinicPaths;
    use crate::models::Client;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp = TempDir::new().unwrap();
        let paths = ClinicPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp, storage)
    }

    fn seed_client(storage: &Storage) -> Client {
        let client = Client::new("Ayşe");
        storage.clients.upsert(client.clone()).unwrap();
        client
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
    }

    #[test]
    fn test_sell_starts_with_full_sessions() {
        let (_temp, storage) = create_test_storage();
        let client = seed_client(&storage);
        let packages = PackageService::new(&storage, None);

        let service = packages
            .sell(client.id, "Diet plan", Money::from_units(1000), 8, date())
            .unwrap();

        assert_eq!(service.remaining_sessions, 8);
        let entries = storage.log.get_all().unwrap();
        assert_eq!(entries[0].action, Action::ServiceAdded);
    }

    #[test]
    fn test_sell_to_unknown_client_fails() {
        let (_temp, storage) = create_test_storage();
        let packages = PackageService::new(&storage, None);

        let err = packages
            .sell(ClientId::new(), "Plan", Money::from_units(100), 1, date())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_deduct_session_logs_prior_counter() {
        let (_temp, storage) = create_test_storage();
        let client = seed_client(&storage);
        let packages = PackageService::new(&storage, None);
        let service = packages
            .sell(client.id, "Diet plan", Money::from_units(1000), 3, date())
            .unwrap();

        let after = packages.deduct_session(service.id).unwrap();
        assert_eq!(after.remaining_sessions, 2);

        let entry = storage
            .log
            .get_all()
            .unwrap()
            .into_iter()
            .find(|e| e.action == Action::SessionDeducted)
            .unwrap();
        match entry.previous_data.unwrap() {
            Snapshot::Service(prior) => assert_eq!(prior.remaining_sessions, 3),
            other => panic!("unexpected snapshot: {:?}", other),
        }
    }

    #[test]
    fn test_deduct_exhausted_package_fails() {
        let (_temp, storage) = create_test_storage();
        let client = seed_client(&storage);
        let packages = PackageService::new(&storage, None);
        let service = packages
            .sell(client.id, "Single visit", Money::from_units(200), 1, date())
            .unwrap();

        packages.deduct_session(service.id).unwrap();
        let err = packages.deduct_session(service.id).unwrap_err();
        assert!(matches!(err, ClinicError::NoSessionsLeft { .. }));
    }

    #[test]
    fn test_sell_from_catalog_uses_defaults() {
        let (_temp, storage) = create_test_storage();
        let client = seed_client(&storage);
        let packages = PackageService::new(&storage, None);

        let entry = packages
            .add_catalog_entry("Monthly follow-up", 4, Money::from_units(1500))
            .unwrap();
        let service = packages
            .sell_from_catalog(client.id, entry.id, date())
            .unwrap();

        assert_eq!(service.name, "Monthly follow-up");
        assert_eq!(service.total_sessions, 4);
        assert_eq!(service.total_price, Money::from_units(1500));
    }
}
