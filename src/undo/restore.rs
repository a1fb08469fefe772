//! Snapshot restore and revert operations
//!
//! Rebuilds deleted entities from their typed snapshots and writes prior
//! scalar values back for update reversal. Identity is preserved: rows come
//! back under their original UUIDs, so recorded foreign keys stay valid and
//! later log entries keep pointing at the right rows.

use chrono::Utc;

use crate::audit::{ClientSnapshot, PaymentSnapshot, Snapshot};
use crate::error::{ClinicError, ClinicResult};
use crate::models::{Appointment, ServiceId};
use crate::storage::Storage;

/// Recreate a deleted entity (and its recorded children) from a snapshot
pub fn restore_snapshot(storage: &Storage, snapshot: &Snapshot) -> ClinicResult<()> {
    match snapshot {
        Snapshot::Client(cs) => restore_client(storage, cs),
        Snapshot::Service(service) => storage.services.upsert(service.clone()),
        Snapshot::ServiceType(st) => storage.service_types.upsert(st.clone()),
        Snapshot::Payment(ps) => restore_payment(storage, ps),
        Snapshot::Expense(expense) => storage.expenses.upsert(expense.clone()),
        Snapshot::Appointment(appointment) => restore_appointment(storage, appointment),
        Snapshot::Measurement(measurement) => storage.measurements.upsert(measurement.clone()),
        Snapshot::User(user) => storage.users.upsert(user.clone()),
    }
}

/// Rebuild a client and every child collection recorded in its snapshot
///
/// The snapshot's service rows already carry the session counters as they
/// stood at deletion time, so restored appointments need no compensating
/// adjustment here: the whole subtree comes back exactly as it was.
fn restore_client(storage: &Storage, snapshot: &ClientSnapshot) -> ClinicResult<()> {
    storage.clients.upsert(snapshot.client.clone())?;

    for service in &snapshot.services {
        storage.services.upsert(service.clone())?;
    }
    for measurement in &snapshot.measurements {
        storage.measurements.upsert(measurement.clone())?;
    }
    for appointment in &snapshot.appointments {
        storage.appointments.upsert(appointment.clone())?;
    }
    for payment in &snapshot.payments {
        restore_payment(storage, payment)?;
    }
    Ok(())
}

/// Rebuild a payment together with the expenses it had spawned
///
/// The expense rows are recreated verbatim, never re-derived from the VAT
/// rule, so a rate change between delete and restore cannot alter history.
fn restore_payment(storage: &Storage, snapshot: &PaymentSnapshot) -> ClinicResult<()> {
    storage.payments.upsert(snapshot.payment.clone())?;
    for expense in &snapshot.expenses {
        storage.expenses.upsert(expense.clone())?;
    }
    Ok(())
}

/// Rebuild a standalone appointment, re-applying its session consumption
///
/// Deleting the appointment released a session back to its service;
/// restoring it must consume that session again, mirroring the original
/// booking.
fn restore_appointment(storage: &Storage, appointment: &Appointment) -> ClinicResult<()> {
    if appointment.session_consumed {
        if let Some(service_id) = appointment.service_id {
            consume_session(storage, service_id)?;
        }
    }

    storage.appointments.upsert(appointment.clone())
}

/// Take one session back out of a service for a booking being restored
fn consume_session(storage: &Storage, service_id: ServiceId) -> ClinicResult<()> {
    let mut service = storage.services.get(service_id)?.ok_or_else(|| {
        ClinicError::EntityMutation(format!(
            "Cannot restore appointment: service {} no longer exists",
            service_id
        ))
    })?;

    if service.remaining_sessions == 0 {
        return Err(ClinicError::EntityMutation(format!(
            "Cannot restore appointment: no sessions left in '{}'",
            service.name
        )));
    }
    service.remaining_sessions -= 1;
    service.touch();
    storage.services.upsert(service)
}

/// Give a session back to a service for a booking being un-restored
fn release_session(storage: &Storage, service_id: ServiceId) -> ClinicResult<()> {
    if let Some(mut service) = storage.services.get(service_id)? {
        if service.remaining_sessions < service.total_sessions {
            service.remaining_sessions += 1;
            service.touch();
            storage.services.upsert(service)?;
        }
    }
    Ok(())
}

/// Write a snapshot's scalar fields back onto the current row
///
/// Identity and creation timestamps stay as they are; nested collections in
/// the snapshot are never part of an update's writable surface and are left
/// untouched. `updated_at` is refreshed to now. The one cross-row effect is
/// the appointment session counter, which moves whenever the write-back
/// flips `session_consumed`.
pub fn revert_scalars(storage: &Storage, snapshot: &Snapshot) -> ClinicResult<()> {
    let now = Utc::now();
    match snapshot {
        Snapshot::Client(cs) => {
            let current = storage.clients.get(cs.client.id)?.ok_or_else(|| {
                ClinicError::EntityMutation(format!("Client {} no longer exists", cs.client.id))
            })?;
            let mut restored = cs.client.clone();
            restored.created_at = current.created_at;
            restored.updated_at = now;
            storage.clients.upsert(restored)
        }
        Snapshot::Service(service) => {
            let current = storage.services.get(service.id)?.ok_or_else(|| {
                ClinicError::EntityMutation(format!("Service {} no longer exists", service.id))
            })?;
            let mut restored = service.clone();
            restored.created_at = current.created_at;
            restored.updated_at = now;
            storage.services.upsert(restored)
        }
        Snapshot::Expense(expense) => {
            let current = storage.expenses.get(expense.id)?.ok_or_else(|| {
                ClinicError::EntityMutation(format!("Expense {} no longer exists", expense.id))
            })?;
            let mut restored = expense.clone();
            restored.created_at = current.created_at;
            restored.updated_at = now;
            storage.expenses.upsert(restored)
        }
        Snapshot::Appointment(appointment) => {
            let current = storage.appointments.get(appointment.id)?.ok_or_else(|| {
                ClinicError::EntityMutation(format!(
                    "Appointment {} no longer exists",
                    appointment.id
                ))
            })?;
            // A cancel releases the session and clears the flag, so writing
            // the flag back must move the service counter with it.
            if appointment.session_consumed && !current.session_consumed {
                if let Some(service_id) = appointment.service_id {
                    consume_session(storage, service_id)?;
                }
            } else if !appointment.session_consumed && current.session_consumed {
                if let Some(service_id) = current.service_id {
                    release_session(storage, service_id)?;
                }
            }
            let mut restored = appointment.clone();
            restored.created_at = current.created_at;
            restored.updated_at = now;
            storage.appointments.upsert(restored)
        }
        Snapshot::Payment(ps) => {
            let current = storage.payments.get(ps.payment.id)?.ok_or_else(|| {
                ClinicError::EntityMutation(format!("Payment {} no longer exists", ps.payment.id))
            })?;
            let mut restored = ps.payment.clone();
            restored.created_at = current.created_at;
            restored.updated_at = now;
            storage.payments.upsert(restored)
        }
        Snapshot::ServiceType(_) | Snapshot::Measurement(_) | Snapshot::User(_) => {
            Err(ClinicError::NotUndoable(
                "no update actions exist for this entity type".into(),
            ))
        }
    }
}
