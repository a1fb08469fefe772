//! Undo engine
//!
//! Reverses a single audit log entry on behalf of an administrator. The
//! reversal strategy is chosen by the entry's stored action kind:
//!
//! - Create: delete the entity that was created, plus the compensating
//!   adjustments its creation implied (cascaded tax expenses for payments,
//!   session counters for appointments)
//! - Delete: rebuild the entity from the entry's snapshot
//! - Update: write the snapshot's scalar fields back onto the current row
//! - Informational entries cannot be reversed
//!
//! A successful undo writes its own informational log entry, flips the
//! original entry's `is_undone` flag, and persists everything in one
//! `save_all`. The flag flip is the commit point: it happens last, through
//! a compare-and-swap in the log repository, so a failure anywhere earlier
//! leaves the entry eligible for a retry and two racing calls cannot both
//! succeed.

use std::sync::Mutex;

use tracing::info;

use crate::audit::{Action, AuditRecorder, EntityKind, LogEntry, RelatedEntity};
use crate::error::{ClinicError, ClinicResult};
use crate::models::{
    AppointmentId, ClientId, ExpenseId, LogEntryId, MeasurementId, PaymentId, ServiceId,
    ServiceTypeId, User, UserId,
};
use crate::storage::Storage;

use super::restore;

/// Reverses audit log entries
pub struct UndoEngine<'a> {
    storage: &'a Storage,
    // Serializes undo invocations within this process; the mark_undone CAS
    // remains the per-entry guard either way
    guard: Mutex<()>,
}

impl<'a> UndoEngine<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            guard: Mutex::new(()),
        }
    }

    /// Undo the entry with the given id, acting as `actor`
    ///
    /// Only administrators may undo. Returns the informational entry that
    /// records the reversal.
    pub fn undo(&self, entry_id: LogEntryId, actor: &User) -> ClinicResult<LogEntry> {
        if !actor.role.can_undo() {
            return Err(ClinicError::Unauthorized(format!(
                "'{}' is not an administrator",
                actor.name
            )));
        }

        let _guard = self
            .guard
            .lock()
            .map_err(|_| ClinicError::Storage("undo lock poisoned".into()))?;

        self.undo_entry(entry_id, Some(actor.id), true)
    }

    fn undo_entry(
        &self,
        entry_id: LogEntryId,
        actor_id: Option<UserId>,
        allow_redirect: bool,
    ) -> ClinicResult<LogEntry> {
        let entry = self
            .storage
            .log
            .get(entry_id)?
            .ok_or_else(|| ClinicError::log_entry_not_found(entry_id.to_string()))?;

        if entry.is_undone {
            return Err(ClinicError::AlreadyUndone);
        }

        match entry.kind() {
            crate::audit::ActionKind::Create => {
                let related = entry.related.ok_or_else(|| {
                    ClinicError::NotUndoable("entry has no related entity".into())
                })?;

                // A tax expense only exists because of its payment, so undoing
                // its creation means undoing the payment instead. One hop:
                // the payment path never redirects further.
                if allow_redirect && related.kind == EntityKind::Expense {
                    if let Some(parent) = self.vat_parent_entry(related)? {
                        return self.undo_entry(parent.id, actor_id, false);
                    }
                }

                self.undo_create(related)?;
            }
            crate::audit::ActionKind::Delete => {
                let snapshot = entry
                    .previous_data
                    .as_ref()
                    .ok_or(ClinicError::MissingSnapshot)?;
                restore::restore_snapshot(self.storage, snapshot)?;
            }
            crate::audit::ActionKind::Update => {
                let snapshot = entry
                    .previous_data
                    .as_ref()
                    .ok_or(ClinicError::MissingSnapshot)?;
                restore::revert_scalars(self.storage, snapshot)?;
            }
            crate::audit::ActionKind::Informational => {
                return Err(ClinicError::NotUndoable(
                    "informational entries cannot be undone".into(),
                ));
            }
        }

        let undo_entry = LogEntry::informational(
            Action::UndoPerformed,
            format!("Undid '{}': {}", entry.action, entry.details),
            actor_id,
        );
        AuditRecorder::new(self.storage).record(undo_entry.clone());

        // Commit point
        self.storage.log.mark_undone(entry.id)?;
        self.storage.save_all()?;
        info!(entry = %entry.id, action = %entry.action, "undid log entry");

        Ok(undo_entry)
    }

    /// Find the still-active create entry of the payment a tax expense
    /// belongs to
    fn vat_parent_entry(&self, related: RelatedEntity) -> ClinicResult<Option<LogEntry>> {
        let expense_id = ExpenseId::from_uuid(related.id);
        let Some(expense) = self.storage.expenses.get(expense_id)? else {
            return Ok(None);
        };
        let Some(payment_id) = expense.payment_id else {
            return Ok(None);
        };
        self.storage
            .log
            .active_create_entry_for(RelatedEntity::payment(payment_id))
    }

    /// Reverse a create action by removing the entity it produced
    fn undo_create(&self, related: RelatedEntity) -> ClinicResult<()> {
        match related.kind {
            EntityKind::Client => self.delete_client_subtree(ClientId::from_uuid(related.id)),
            EntityKind::Service => {
                self.require_deleted(
                    self.storage.services.delete(ServiceId::from_uuid(related.id))?,
                    related,
                )
            }
            EntityKind::ServiceType => self.require_deleted(
                self.storage
                    .service_types
                    .delete(ServiceTypeId::from_uuid(related.id))?,
                related,
            ),
            EntityKind::Payment => self.undo_payment_create(PaymentId::from_uuid(related.id)),
            EntityKind::Expense => self.require_deleted(
                self.storage.expenses.delete(ExpenseId::from_uuid(related.id))?,
                related,
            ),
            EntityKind::Appointment => {
                self.undo_appointment_create(AppointmentId::from_uuid(related.id))
            }
            EntityKind::Measurement => self.require_deleted(
                self.storage
                    .measurements
                    .delete(MeasurementId::from_uuid(related.id))?,
                related,
            ),
            EntityKind::User => self.require_deleted(
                self.storage.users.delete(UserId::from_uuid(related.id))?,
                related,
            ),
        }
    }

    fn require_deleted(&self, existed: bool, related: RelatedEntity) -> ClinicResult<()> {
        if existed {
            Ok(())
        } else {
            Err(ClinicError::EntityMutation(format!(
                "{} {} no longer exists",
                related.kind, related.id
            )))
        }
    }

    /// Removing a freshly created client also removes anything already
    /// hanging off it, so no orphan rows survive. Each removed child's own
    /// create entry is retired along the way.
    fn delete_client_subtree(&self, client_id: ClientId) -> ClinicResult<()> {
        if !self.storage.clients.delete(client_id)? {
            return Err(ClinicError::EntityMutation(format!(
                "Client {} no longer exists",
                client_id
            )));
        }

        for service in self.storage.services.get_by_client(client_id)? {
            self.storage.services.delete(service.id)?;
            self.retire_create_entry(RelatedEntity::service(service.id))?;
        }
        for appointment in self.storage.appointments.get_by_client(client_id)? {
            self.storage.appointments.delete(appointment.id)?;
            self.retire_create_entry(RelatedEntity::appointment(appointment.id))?;
        }
        for measurement in self.storage.measurements.get_by_client(client_id)? {
            self.storage.measurements.delete(measurement.id)?;
            self.retire_create_entry(RelatedEntity::measurement(measurement.id))?;
        }
        for payment in self.storage.payments.get_by_client(client_id)? {
            for expense in self.storage.expenses.get_by_payment(payment.id)? {
                self.storage.expenses.delete(expense.id)?;
                self.retire_create_entry(RelatedEntity::expense(expense.id))?;
            }
            self.storage.payments.delete(payment.id)?;
            self.retire_create_entry(RelatedEntity::payment(payment.id))?;
        }
        Ok(())
    }

    /// Undoing a payment removes the payment together with the tax expenses
    /// it spawned, and retires their create entries so the log does not
    /// advertise reversals for rows that no longer exist
    fn undo_payment_create(&self, payment_id: PaymentId) -> ClinicResult<()> {
        if self.storage.payments.get(payment_id)?.is_none() {
            return Err(ClinicError::EntityMutation(format!(
                "Payment {} no longer exists",
                payment_id
            )));
        }

        for expense in self.storage.expenses.get_by_payment(payment_id)? {
            self.storage.expenses.delete(expense.id)?;
            self.retire_create_entry(RelatedEntity::expense(expense.id))?;
        }

        self.storage.payments.delete(payment_id)?;
        Ok(())
    }

    /// Flip the still-active create entry of a row that was just removed as
    /// a side effect of undoing its parent
    fn retire_create_entry(&self, related: RelatedEntity) -> ClinicResult<()> {
        if let Some(entry) = self.storage.log.active_create_entry_for(related)? {
            self.storage.log.mark_undone(entry.id)?;
        }
        Ok(())
    }

    /// Undoing a booking returns the session it consumed to its service
    fn undo_appointment_create(&self, appointment_id: AppointmentId) -> ClinicResult<()> {
        let appointment = self
            .storage
            .appointments
            .get(appointment_id)?
            .ok_or_else(|| {
                ClinicError::EntityMutation(format!(
                    "Appointment {} no longer exists",
                    appointment_id
                ))
            })?;

        if appointment.session_consumed {
            if let Some(service_id) = appointment.service_id {
                if let Some(mut service) = self.storage.services.get(service_id)? {
                    if service.remaining_sessions < service.total_sessions {
                        service.remaining_sessions += 1;
                        service.touch();
                        self.storage.services.upsert(service)?;
                    }
                }
            }
        }

        self.storage.appointments.delete(appointment_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{ActionKind, Snapshot};
    use crate::config::paths::ClinicPaths;
    use crate::models::{
        Appointment, Client, Expense, Money, Payment, PaymentMethod, Role, Service,
    };
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp = TempDir::new().unwrap();
        let paths = ClinicPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp, storage)
    }

    fn admin() -> User {
        User::new("Boss", Role::Admin)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn record(storage: &Storage, entry: LogEntry) -> LogEntryId {
        AuditRecorder::new(storage).record(entry).unwrap()
    }

    #[test]
    fn test_staff_cannot_undo() {
        let (_temp, storage) = create_test_storage();
        let engine = UndoEngine::new(&storage);
        let staff = User::new("Clerk", Role::Staff);

        let err = engine.undo(LogEntryId::new(), &staff).unwrap_err();
        assert!(matches!(err, ClinicError::Unauthorized(_)));
    }

    #[test]
    fn test_undo_unknown_entry_is_not_found() {
        let (_temp, storage) = create_test_storage();
        let engine = UndoEngine::new(&storage);

        let err = engine.undo(LogEntryId::new(), &admin()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_undo_client_create_deletes_row() {
        let (_temp, storage) = create_test_storage();
        let client = Client::new("Ayşe");
        storage.clients.upsert(client.clone()).unwrap();
        let entry_id = record(
            &storage,
            LogEntry::create(
                Action::ClientAdded,
                "Client 'Ayşe' added",
                RelatedEntity::client(client.id),
                None,
            ),
        );

        let engine = UndoEngine::new(&storage);
        let undo_entry = engine.undo(entry_id, &admin()).unwrap();

        assert!(storage.clients.get(client.id).unwrap().is_none());
        assert!(storage.log.get(entry_id).unwrap().unwrap().is_undone);
        assert_eq!(undo_entry.kind(), ActionKind::Informational);
        assert_eq!(undo_entry.action, Action::UndoPerformed);
    }

    #[test]
    fn test_undo_twice_fails() {
        let (_temp, storage) = create_test_storage();
        let client = Client::new("Ayşe");
        storage.clients.upsert(client.clone()).unwrap();
        let entry_id = record(
            &storage,
            LogEntry::create(
                Action::ClientAdded,
                "Client 'Ayşe' added",
                RelatedEntity::client(client.id),
                None,
            ),
        );

        let engine = UndoEngine::new(&storage);
        engine.undo(entry_id, &admin()).unwrap();
        let err = engine.undo(entry_id, &admin()).unwrap_err();
        assert!(matches!(err, ClinicError::AlreadyUndone));
    }

    #[test]
    fn test_undo_informational_entry_fails() {
        let (_temp, storage) = create_test_storage();
        let entry_id = record(
            &storage,
            LogEntry::informational(Action::UndoPerformed, "Undid something", None),
        );

        let engine = UndoEngine::new(&storage);
        let err = engine.undo(entry_id, &admin()).unwrap_err();
        assert!(matches!(err, ClinicError::NotUndoable(_)));
        assert!(!storage.log.get(entry_id).unwrap().unwrap().is_undone);
    }

    #[test]
    fn test_undo_payment_create_cascades_to_vat_expense() {
        let (_temp, storage) = create_test_storage();
        let client = Client::new("Mehmet");
        storage.clients.upsert(client.clone()).unwrap();

        let payment = Payment::new(
            client.id,
            Money::from_units(1000),
            PaymentMethod::CreditCard,
            date(),
        );
        let expense =
            Expense::vat_for_payment(payment.id, "VAT for payment", Money::from_units(200), date());
        storage.payments.upsert(payment.clone()).unwrap();
        storage.expenses.upsert(expense.clone()).unwrap();

        let payment_entry = record(
            &storage,
            LogEntry::create(
                Action::PaymentAdded,
                "Payment of ₺1000.00 received",
                RelatedEntity::payment(payment.id),
                None,
            ),
        );
        let expense_entry = record(
            &storage,
            LogEntry::create(
                Action::ExpenseAdded,
                "VAT expense of ₺200.00 recorded",
                RelatedEntity::expense(expense.id),
                None,
            ),
        );

        let engine = UndoEngine::new(&storage);
        engine.undo(payment_entry, &admin()).unwrap();

        assert!(storage.payments.get(payment.id).unwrap().is_none());
        assert!(storage.expenses.get(expense.id).unwrap().is_none());
        assert!(storage.log.get(payment_entry).unwrap().unwrap().is_undone);
        assert!(storage.log.get(expense_entry).unwrap().unwrap().is_undone);
    }

    #[test]
    fn test_undo_vat_expense_redirects_to_payment() {
        let (_temp, storage) = create_test_storage();
        let client = Client::new("Mehmet");
        storage.clients.upsert(client.clone()).unwrap();

        let payment = Payment::new(
            client.id,
            Money::from_units(1000),
            PaymentMethod::CreditCard,
            date(),
        );
        let expense =
            Expense::vat_for_payment(payment.id, "VAT for payment", Money::from_units(200), date());
        storage.payments.upsert(payment.clone()).unwrap();
        storage.expenses.upsert(expense.clone()).unwrap();

        let payment_entry = record(
            &storage,
            LogEntry::create(
                Action::PaymentAdded,
                "Payment of ₺1000.00 received",
                RelatedEntity::payment(payment.id),
                None,
            ),
        );
        let expense_entry = record(
            &storage,
            LogEntry::create(
                Action::ExpenseAdded,
                "VAT expense of ₺200.00 recorded",
                RelatedEntity::expense(expense.id),
                None,
            ),
        );

        // Undoing the expense entry lands on the payment instead
        let engine = UndoEngine::new(&storage);
        engine.undo(expense_entry, &admin()).unwrap();

        assert!(storage.payments.get(payment.id).unwrap().is_none());
        assert!(storage.expenses.get(expense.id).unwrap().is_none());
        assert!(storage.log.get(payment_entry).unwrap().unwrap().is_undone);
        assert!(storage.log.get(expense_entry).unwrap().unwrap().is_undone);
    }

    #[test]
    fn test_undo_manual_expense_create_deletes_only_expense() {
        let (_temp, storage) = create_test_storage();
        let expense = Expense::new(
            "Office rent",
            Money::from_units(500),
            crate::models::ExpenseCategory::Rent,
            date(),
        );
        storage.expenses.upsert(expense.clone()).unwrap();
        let entry_id = record(
            &storage,
            LogEntry::create(
                Action::ExpenseAdded,
                "Expense 'Office rent' recorded",
                RelatedEntity::expense(expense.id),
                None,
            ),
        );

        let engine = UndoEngine::new(&storage);
        engine.undo(entry_id, &admin()).unwrap();
        assert!(storage.expenses.get(expense.id).unwrap().is_none());
    }

    #[test]
    fn test_undo_appointment_create_returns_session() {
        let (_temp, storage) = create_test_storage();
        let client = Client::new("Zeynep");
        let mut service = Service::new(client.id, "Diet plan", Money::from_units(800), 5, date());
        service.remaining_sessions = 4;
        storage.clients.upsert(client.clone()).unwrap();
        storage.services.upsert(service.clone()).unwrap();

        let mut appointment = Appointment::with_service(client.id, service.id, Utc::now());
        appointment.session_consumed = true;
        storage.appointments.upsert(appointment.clone()).unwrap();

        let entry_id = record(
            &storage,
            LogEntry::create(
                Action::AppointmentAdded,
                "Appointment booked",
                RelatedEntity::appointment(appointment.id),
                None,
            ),
        );

        let engine = UndoEngine::new(&storage);
        engine.undo(entry_id, &admin()).unwrap();

        assert!(storage.appointments.get(appointment.id).unwrap().is_none());
        let service = storage.services.get(service.id).unwrap().unwrap();
        assert_eq!(service.remaining_sessions, 5);
    }

    #[test]
    fn test_undo_delete_restores_from_snapshot() {
        let (_temp, storage) = create_test_storage();
        let client = Client::new("Fatma");

        // The row is already gone; only the log remembers it
        let snapshot = Snapshot::client(crate::audit::ClientSnapshot {
            client: client.clone(),
            services: Vec::new(),
            measurements: Vec::new(),
            appointments: Vec::new(),
            payments: Vec::new(),
        });
        let entry_id = record(
            &storage,
            LogEntry::delete(
                Action::ClientDeleted,
                "Client 'Fatma' deleted",
                RelatedEntity::client(client.id),
                snapshot,
                None,
            ),
        );

        let engine = UndoEngine::new(&storage);
        engine.undo(entry_id, &admin()).unwrap();

        let restored = storage.clients.get(client.id).unwrap().unwrap();
        assert_eq!(restored.id, client.id);
        assert_eq!(restored.name, "Fatma");
    }

    #[test]
    fn test_undo_update_reverts_scalars() {
        let (_temp, storage) = create_test_storage();
        let mut client = Client::new("Before");
        let prior = client.clone();
        client.name = "After".to_string();
        client.touch();
        storage.clients.upsert(client.clone()).unwrap();

        let snapshot = Snapshot::client(crate::audit::ClientSnapshot {
            client: prior,
            services: Vec::new(),
            measurements: Vec::new(),
            appointments: Vec::new(),
            payments: Vec::new(),
        });
        let entry_id = record(
            &storage,
            LogEntry::update(
                Action::ClientUpdated,
                "Client renamed",
                RelatedEntity::client(client.id),
                snapshot,
                None,
            ),
        );

        let engine = UndoEngine::new(&storage);
        engine.undo(entry_id, &admin()).unwrap();

        let reverted = storage.clients.get(client.id).unwrap().unwrap();
        assert_eq!(reverted.name, "Before");
    }

    #[test]
    fn test_undo_client_create_retires_child_entries() {
        let (_temp, storage) = create_test_storage();
        let client = Client::new("Ayşe");
        storage.clients.upsert(client.clone()).unwrap();
        let client_entry = record(
            &storage,
            LogEntry::create(
                Action::ClientAdded,
                "Client 'Ayşe' added",
                RelatedEntity::client(client.id),
                None,
            ),
        );

        let service = Service::new(client.id, "Package A", Money::from_units(1000), 5, date());
        storage.services.upsert(service.clone()).unwrap();
        let service_entry = record(
            &storage,
            LogEntry::create(
                Action::ServiceAdded,
                "Package 'Package A' sold",
                RelatedEntity::service(service.id),
                None,
            ),
        );

        let payment = Payment::new(client.id, Money::from_units(500), PaymentMethod::Cash, date());
        storage.payments.upsert(payment.clone()).unwrap();
        let payment_entry = record(
            &storage,
            LogEntry::create(
                Action::PaymentAdded,
                "Payment of ₺500.00 received",
                RelatedEntity::payment(payment.id),
                None,
            ),
        );

        let engine = UndoEngine::new(&storage);
        engine.undo(client_entry, &admin()).unwrap();

        // The child rows are gone, so their create entries must not stay
        // active and promise reversals that would only fail
        assert!(storage.log.get(service_entry).unwrap().unwrap().is_undone);
        assert!(storage.log.get(payment_entry).unwrap().unwrap().is_undone);
        let err = engine.undo(service_entry, &admin()).unwrap_err();
        assert!(matches!(err, ClinicError::AlreadyUndone));
    }

    #[test]
    fn test_delete_entry_without_snapshot_is_rejected() {
        let (_temp, storage) = create_test_storage();
        let client = Client::new("Ayşe");

        // Only hand-edited or damaged persisted data can produce a delete
        // entry with no snapshot; the engine must refuse it untouched
        let entry_id = record(
            &storage,
            LogEntry {
                id: LogEntryId::new(),
                action: Action::ClientDeleted,
                details: "Client 'Ayşe' deleted".into(),
                user_id: None,
                related: Some(RelatedEntity::client(client.id)),
                previous_data: None,
                is_undone: false,
                created_at: Utc::now(),
            },
        );

        let engine = UndoEngine::new(&storage);
        let err = engine.undo(entry_id, &admin()).unwrap_err();
        assert!(matches!(err, ClinicError::MissingSnapshot));
        assert!(!storage.log.get(entry_id).unwrap().unwrap().is_undone);
        assert!(storage.clients.get(client.id).unwrap().is_none());
    }

    #[test]
    fn test_failed_undo_leaves_entry_active() {
        let (_temp, storage) = create_test_storage();
        let client = Client::new("Gone");
        // Entity was never stored, so the create cannot be reversed
        let entry_id = record(
            &storage,
            LogEntry::create(
                Action::ClientAdded,
                "Client 'Gone' added",
                RelatedEntity::client(client.id),
                None,
            ),
        );

        let engine = UndoEngine::new(&storage);
        let err = engine.undo(entry_id, &admin()).unwrap_err();
        assert!(matches!(err, ClinicError::EntityMutation(_)));
        assert!(!storage.log.get(entry_id).unwrap().unwrap().is_undone);
    }
}
