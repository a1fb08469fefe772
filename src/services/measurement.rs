//! Measurement service
//!
//! Body measurements recorded per client visit.

use chrono::NaiveDate;

use crate::audit::{Action, AuditRecorder, LogEntry, RelatedEntity, Snapshot};
use crate::error::{ClinicError, ClinicResult};
use crate::models::{ClientId, Measurement, MeasurementId, UserId};
use crate::storage::Storage;

/// Service for measurement management
pub struct MeasurementService<'a> {
    storage: &'a Storage,
    actor: Option<UserId>,
}

impl<'a> MeasurementService<'a> {
    pub fn new(storage: &'a Storage, actor: Option<UserId>) -> Self {
        Self { storage, actor }
    }

    /// Record a measurement for a client
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &self,
        client_id: ClientId,
        date: NaiveDate,
        weight_kg: Option<f64>,
        height_cm: Option<f64>,
        waist_cm: Option<f64>,
        hip_cm: Option<f64>,
        note: &str,
    ) -> ClinicResult<Measurement> {
        let client = self
            .storage
            .clients
            .get(client_id)?
            .ok_or_else(|| ClinicError::client_not_found(client_id.to_string()))?;

        let mut measurement = Measurement::new(client_id, date);
        measurement.weight_kg = weight_kg;
        measurement.height_cm = height_cm;
        measurement.waist_cm = waist_cm;
        measurement.hip_cm = hip_cm;
        measurement.note = note.to_string();
        measurement.validate().map_err(ClinicError::Validation)?;

        self.storage.measurements.upsert(measurement.clone())?;
        self.storage.measurements.save()?;

        self.recorder().record(LogEntry::create(
            Action::MeasurementAdded,
            format!("Measurement recorded for '{}' on {}", client.name, date),
            RelatedEntity::measurement(measurement.id),
            self.actor,
        ));

        Ok(measurement)
    }

    /// List a client's measurements
    pub fn list_for_client(&self, client_id: ClientId) -> ClinicResult<Vec<Measurement>> {
        self.storage.measurements.get_by_client(client_id)
    }

    /// Delete a measurement, keeping its state in the log for undo
    pub fn delete(&self, id: MeasurementId) -> ClinicResult<()> {
        let measurement = self
            .storage
            .measurements
            .get(id)?
            .ok_or(ClinicError::NotFound {
                entity_type: "Measurement",
                identifier: id.to_string(),
            })?;

        self.storage.measurements.delete(id)?;
        self.storage.measurements.save()?;

        self.recorder().record(LogEntry::delete(
            Action::MeasurementDeleted,
            format!("Measurement from {} deleted", measurement.date),
            RelatedEntity::measurement(id),
            Snapshot::Measurement(measurement),
            self.actor,
        ));

        Ok(())
    }

    fn recorder(&self) -> AuditRecorder<'a> {
        AuditRecorder::new(self.storage)
    }
}
