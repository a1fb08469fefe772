//! Payment service
//!
//! Records client payments. Credit-card payments automatically spawn a VAT
//! expense linked back to the payment; the two rows share one fate under
//! deletion and undo.

use chrono::NaiveDate;

use crate::audit::{Action, AuditRecorder, LogEntry, PaymentSnapshot, RelatedEntity, Snapshot};
use crate::error::{ClinicError, ClinicResult};
use crate::models::{ClientId, Expense, Money, Payment, PaymentId, PaymentMethod, ServiceId, UserId};
use crate::storage::Storage;

/// Service for payment management
pub struct PaymentService<'a> {
    storage: &'a Storage,
    actor: Option<UserId>,
}

impl<'a> PaymentService<'a> {
    pub fn new(storage: &'a Storage, actor: Option<UserId>) -> Self {
        Self { storage, actor }
    }

    /// Record a payment from a client
    ///
    /// For VAT-bearing methods a single expense of `vat_rate_percent` of the
    /// amount is created alongside, linked to the payment. Both rows get
    /// their own create entries in the log.
    pub fn add(
        &self,
        client_id: ClientId,
        service_id: Option<ServiceId>,
        amount: Money,
        method: PaymentMethod,
        date: NaiveDate,
        note: &str,
        vat_rate_percent: i64,
    ) -> ClinicResult<Payment> {
        let client = self
            .storage
            .clients
            .get(client_id)?
            .ok_or_else(|| ClinicError::client_not_found(client_id.to_string()))?;

        if let Some(service_id) = service_id {
            let service = self
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
        }

        let mut payment = Payment::new(client_id, amount, method, date);
        payment.service_id = service_id;
        payment.note = note.to_string();
        payment.validate().map_err(ClinicError::Validation)?;

        self.storage.payments.upsert(payment.clone())?;
        self.storage.payments.save()?;

        self.recorder().record(LogEntry::create(
            Action::PaymentAdded,
            format!(
                "Payment of {} received from '{}' ({})",
                payment.amount, client.name, payment.method
            ),
            RelatedEntity::payment(payment.id),
            self.actor,
        ));

        if method.incurs_vat() {
            let vat = Expense::vat_for_payment(
                payment.id,
                format!("VAT for payment from '{}'", client.name),
                amount.percentage(vat_rate_percent),
                date,
            );
            self.storage.expenses.upsert(vat.clone())?;
            self.storage.expenses.save()?;

            self.recorder().record(LogEntry::create(
                Action::ExpenseAdded,
                format!("VAT expense of {} recorded", vat.amount),
                RelatedEntity::expense(vat.id),
                self.actor,
            ));
        }

        Ok(payment)
    }

    /// Get a payment by ID
    pub fn get(&self, id: PaymentId) -> ClinicResult<Option<Payment>> {
        self.storage.payments.get(id)
    }

    /// List all payments
    pub fn list(&self) -> ClinicResult<Vec<Payment>> {
        self.storage.payments.get_all()
    }

    /// List a client's payments
    pub fn list_for_client(&self, client_id: ClientId) -> ClinicResult<Vec<Payment>> {
        self.storage.payments.get_by_client(client_id)
    }

    /// Total of all recorded payments
    pub fn total(&self) -> ClinicResult<Money> {
        Ok(self.storage.payments.get_all()?.iter().map(|p| p.amount).sum())
    }

    /// Delete a payment together with its linked VAT expenses
    ///
    /// The snapshot keeps the expense rows, so an undo restores them
    /// verbatim even if the VAT rate has changed since.
    pub fn delete(&self, id: PaymentId) -> ClinicResult<()> {
        let payment = self
            .storage
            .payments
            .get(id)?
            .ok_or_else(|| ClinicError::payment_not_found(id.to_string()))?;

        let expenses = self.storage.expenses.get_by_payment(id)?;
        for expense in &expenses {
            self.storage.expenses.delete(expense.id)?;
        }
        self.storage.payments.delete(id)?;
        self.storage.payments.save()?;
        self.storage.expenses.save()?;

        let amount = payment.amount;
        self.recorder().record(LogEntry::delete(
            Action::PaymentDeleted,
            format!("Payment of {} deleted", amount),
            RelatedEntity::payment(id),
            Snapshot::Payment(PaymentSnapshot::new(payment, expenses)),
            self.actor,
        ));

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
    use crate::models::{Client, ExpenseCategory};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp = TempDir::new().unwrap();
        let paths = ClinicPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp, storage)
    }

    fn seed_client(storage: &Storage) -> Client {
        let client = Client::new("Mehmet");
        storage.clients.upsert(client.clone()).unwrap();
        client
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_cash_payment_spawns_no_expense() {
        let (_temp, storage) = create_test_storage();
        let client = seed_client(&storage);
        let payments = PaymentService::new(&storage, None);

        payments
            .add(
                client.id,
                None,
                Money::from_units(500),
                PaymentMethod::Cash,
                date(),
                "",
                20,
            )
            .unwrap();

        assert_eq!(storage.expenses.count().unwrap(), 0);
        assert_eq!(storage.log.count().unwrap(), 1);
    }

    #[test]
    fn test_credit_card_payment_spawns_vat_expense() {
        let (_temp, storage) = create_test_storage();
        let client = seed_client(&storage);
        let payments = PaymentService::new(&storage, None);

        let payment = payments
            .add(
                client.id,
                None,
                Money::from_units(1000),
                PaymentMethod::CreditCard,
                date(),
                "",
                20,
            )
            .unwrap();

        let expenses = storage.expenses.get_by_payment(payment.id).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount, Money::from_units(200));
        assert_eq!(expenses[0].category, ExpenseCategory::Vat);
        assert_eq!(expenses[0].payment_id, Some(payment.id));

        // Both creates are in the log
        let actions: Vec<_> = storage
            .log
            .get_all()
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert!(actions.contains(&Action::PaymentAdded));
        assert!(actions.contains(&Action::ExpenseAdded));
    }

    #[test]
    fn test_nonpositive_amount_rejected() {
        let (_temp, storage) = create_test_storage();
        let client = seed_client(&storage);
        let payments = PaymentService::new(&storage, None);

        let err = payments
            .add(
                client.id,
                None,
                Money::zero(),
                PaymentMethod::Cash,
                date(),
                "",
                20,
            )
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_delete_cascades_to_vat_expense() {
        let (_temp, storage) = create_test_storage();
        let client = seed_client(&storage);
        let payments = PaymentService::new(&storage, None);

        let payment = payments
            .add(
                client.id,
                None,
                Money::from_units(1000),
                PaymentMethod::CreditCard,
                date(),
                "",
                20,
            )
            .unwrap();

        payments.delete(payment.id).unwrap();

        assert!(storage.payments.get(payment.id).unwrap().is_none());
        assert_eq!(storage.expenses.count().unwrap(), 0);

        let delete_entry = storage
            .log
            .get_all()
            .unwrap()
            .into_iter()
            .find(|e| e.action == Action::PaymentDeleted)
            .unwrap();
        match delete_entry.previous_data.unwrap() {
            Snapshot::Payment(ps) => assert_eq!(ps.expenses.len(), 1),
            other => panic!("unexpected snapshot: {:?}", other),
        }
    }
}
