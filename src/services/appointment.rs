//! Appointment service
//!
//! Books, completes, cancels and deletes appointments. Booking against a
//! package consumes one of its sessions; cancelling or deleting such an
//! appointment returns the session to the package.

use chrono::{DateTime, Utc};

use crate::audit::{Action, AuditRecorder, LogEntry, RelatedEntity, Snapshot};
use crate::error::{ClinicError, ClinicResult};
use crate::models::{Appointment, AppointmentId, AppointmentStatus, ClientId, ServiceId, UserId};
use crate::storage::Storage;

/// Service for appointment management
pub struct AppointmentService<'a> {
    storage: &'a Storage,
    actor: Option<UserId>,
}

impl<'a> AppointmentService<'a> {
    pub fn new(storage: &'a Storage, actor: Option<UserId>) -> Self {
        Self { storage, actor }
    }

    /// Book an appointment, consuming a package session when one is attached
    pub fn schedule(
        &self,
        client_id: ClientId,
        service_id: Option<ServiceId>,
        scheduled_at: DateTime<Utc>,
        note: &str,
    ) -> ClinicResult<Appointment> {
        let client = self
            .storage
            .clients
            .get(client_id)?
            .ok_or_else(|| ClinicError::client_not_found(client_id.to_string()))?;

        let mut appointment = match service_id {
            Some(service_id) => {
                let mut service = self
                    .storage
                    .services
                    .get(service_id)?
                    .ok_or_else(|| ClinicError::service_not_found(service_id.to_string()))?;

                if service.client_id != client_id {
                    return Err(ClinicError::Validation(format!(
                        "Package '{}' does not belong to client '{}'",
                        service.name, client.name
                    )));
                }
                if !service.has_sessions_left() {
                    return Err(ClinicError::NoSessionsLeft {
                        package: service.name.clone(),
                    });
                }

                service.remaining_sessions -= 1;
                service.touch();
                self.storage.services.upsert(service)?;
                self.storage.services.save()?;

                Appointment::with_service(client_id, service_id, scheduled_at)
            }
            None => Appointment::new(client_id, scheduled_at),
        };
        appointment.note = note.to_string();

        self.storage.appointments.upsert(appointment.clone())?;
        self.storage.appointments.save()?;

        self.recorder().record(LogEntry::create(
            Action::AppointmentAdded,
            format!(
                "Appointment booked for '{}' at {}",
                client.name,
                scheduled_at.format("%Y-%m-%d %H:%M")
            ),
            RelatedEntity::appointment(appointment.id),
            self.actor,
        ));

        Ok(appointment)
    }

    /// Get an appointment by ID
    pub fn get(&self, id: AppointmentId) -> ClinicResult<Option<Appointment>> {
        self.storage.appointments.get(id)
    }

    /// List all appointments
    pub fn list(&self) -> ClinicResult<Vec<Appointment>> {
        self.storage.appointments.get_all()
    }

    /// List a client's appointments
    pub fn list_for_client(&self, client_id: ClientId) -> ClinicResult<Vec<Appointment>> {
        self.storage.appointments.get_by_client(client_id)
    }

    /// Mark an appointment as completed
    pub fn complete(&self, id: AppointmentId) -> ClinicResult<Appointment> {
        let mut appointment = self
            .storage
            .appointments
            .get(id)?
            .ok_or_else(|| ClinicError::appointment_not_found(id.to_string()))?;

        if appointment.status != AppointmentStatus::Scheduled {
            return Err(ClinicError::Validation(format!(
                "Only scheduled appointments can be completed (status: {})",
                appointment.status
            )));
        }

        appointment.status = AppointmentStatus::Completed;
        appointment.touch();
        self.storage.appointments.upsert(appointment.clone())?;
        self.storage.appointments.save()?;

        Ok(appointment)
    }

    /// Cancel an appointment, returning its session to the package
    pub fn cancel(&self, id: AppointmentId) -> ClinicResult<Appointment> {
        let mut appointment = self
            .storage
            .appointments
            .get(id)?
            .ok_or_else(|| ClinicError::appointment_not_found(id.to_string()))?;

        if !appointment.is_cancellable() {
            return Err(ClinicError::Validation(format!(
                "Appointment cannot be cancelled (status: {})",
                appointment.status
            )));
        }

        let prior = appointment.clone();

        self.release_session(&appointment)?;
        appointment.status = AppointmentStatus::Cancelled;
        appointment.session_consumed = false;
        appointment.touch();

        self.storage.appointments.upsert(appointment.clone())?;
        self.storage.appointments.save()?;

        self.recorder().record(LogEntry::update(
            Action::AppointmentCancelled,
            format!(
                "Appointment at {} cancelled",
                appointment.scheduled_at.format("%Y-%m-%d %H:%M")
            ),
            RelatedEntity::appointment(appointment.id),
            Snapshot::Appointment(prior),
            self.actor,
        ));

        Ok(appointment)
    }

    /// Delete an appointment, keeping its state in the log for undo
    pub fn delete(&self, id: AppointmentId) -> ClinicResult<()> {
        let appointment = self
            .storage
            .appointments
            .get(id)?
            .ok_or_else(|| ClinicError::appointment_not_found(id.to_string()))?;

        self.release_session(&appointment)?;
        self.storage.appointments.delete(id)?;
        self.storage.save_all()?;

        self.recorder().record(LogEntry::delete(
            Action::AppointmentDeleted,
            format!(
                "Appointment at {} deleted",
                appointment.scheduled_at.format("%Y-%m-%d %H:%M")
            ),
            RelatedEntity::appointment(id),
            Snapshot::Appointment(appointment),
            self.actor,
        ));

        Ok(())
    }

    /// Return a consumed session to the owning package, if any
    fn release_session(&self, appointment: &Appointment) -> ClinicResult<()> {
        if !appointment.session_consumed {
            return Ok(());
        }
        let Some(service_id) = appointment.service_id else {
            return Ok(());
        };
        if let Some(mut service) = self.storage.services.get(service_id)? {
            if service.remaining_sessions < service.total_sessions {
                service.remaining_sessions += 1;
                service.touch();
                self.storage.services.upsert(service)?;
                self.storage.services.save()?;
            }
        }
        Ok(())
    }

    fn recorder(&self) -> AuditRecorder<'a> {
        AuditRecorder::new(self.storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::ClinicPaths;
    use crate::models::{Client, Money, Service};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp = TempDir::new().unwrap();
        let paths = ClinicPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp, storage)
    }

    fn seed_client_with_package(storage: &Storage, sessions: u32) -> (Client, Service) {
        let client = Client::new("Zeynep");
        let service = Service::new(
            client.id,
            "Diet plan",
            Money::from_units(1000),
            sessions,
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        );
        storage.clients.upsert(client.clone()).unwrap();
        storage.services.upsert(service.clone()).unwrap();
        (client, service)
    }

    #[test]
    fn test_schedule_consumes_session() {
        let (_temp, storage) = create_test_storage();
        let (client, service) = seed_client_with_package(&storage, 3);
        let appointments = AppointmentService::new(&storage, None);

        let appointment = appointments
            .schedule(client.id, Some(service.id), Utc::now(), "")
            .unwrap();

        assert!(appointment.session_consumed);
        let service = storage.services.get(service.id).unwrap().unwrap();
        assert_eq!(service.remaining_sessions, 2);
    }

    #[test]
    fn test_schedule_without_package_consumes_nothing() {
        let (_temp, storage) = create_test_storage();
        let (client, service) = seed_client_with_package(&storage, 3);
        let appointments = AppointmentService::new(&storage, None);

        let appointment = appointments
            .schedule(client.id, None, Utc::now(), "walk-in")
            .unwrap();

        assert!(!appointment.session_consumed);
        let service = storage.services.get(service.id).unwrap().unwrap();
        assert_eq!(service.remaining_sessions, 3);
    }

    #[test]
    fn test_schedule_exhausted_package_fails() {
        let (_temp, storage) = create_test_storage();
        let (client, service) = seed_client_with_package(&storage, 1);
        let appointments = AppointmentService::new(&storage, None);

        appointments
            .schedule(client.id, Some(service.id), Utc::now(), "")
            .unwrap();
        let err = appointments
            .schedule(client.id, Some(service.id), Utc::now(), "")
            .unwrap_err();
        assert!(matches!(err, ClinicError::NoSessionsLeft { .. }));
    }

    #[test]
    fn test_cancel_returns_session() {
        let (_temp, storage) = create_test_storage();
        let (client, service) = seed_client_with_package(&storage, 3);
        let appointments = AppointmentService::new(&storage, None);

        let appointment = appointments
            .schedule(client.id, Some(service.id), Utc::now(), "")
            .unwrap();
        let cancelled = appointments.cancel(appointment.id).unwrap();

        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert!(!cancelled.session_consumed);
        let service = storage.services.get(service.id).unwrap().unwrap();
        assert_eq!(service.remaining_sessions, 3);
    }

    #[test]
    fn test_completed_appointment_cannot_be_cancelled() {
        let (_temp, storage) = create_test_storage();
        let (client, _) = seed_client_with_package(&storage, 3);
        let appointments = AppointmentService::new(&storage, None);

        let appointment = appointments
            .schedule(client.id, None, Utc::now(), "")
            .unwrap();
        appointments.complete(appointment.id).unwrap();

        let err = appointments.cancel(appointment.id).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_delete_returns_session_and_snapshots() {
        let (_temp, storage) = create_test_storage();
        let (client, service) = seed_client_with_package(&storage, 3);
        let appointments = AppointmentService::new(&storage, None);

        let appointment = appointments
            .schedule(client.id, Some(service.id), Utc::now(), "")
            .unwrap();
        appointments.delete(appointment.id).unwrap();

        assert!(storage.appointments.get(appointment.id).unwrap().is_none());
        let service = storage.services.get(service.id).unwrap().unwrap();
        assert_eq!(service.remaining_sessions, 3);

        let entry = storage
            .log
            .get_all()
            .unwrap()
            .into_iter()
            .find(|e| e.action == Action::AppointmentDeleted)
            .unwrap();
        match entry.previous_data.unwrap() {
            Snapshot::Appointment(prior) => assert!(prior.session_consumed),
            other => panic!("unexpected snapshot: {:?}", other),
        }
    }
}
