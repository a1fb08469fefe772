//! Client service
//!
//! CRUD operations for clients. Deleting a client removes its whole subtree
//! (packages, measurements, appointments, payments and their tax expenses),
//! but the log entry keeps a snapshot of everything removed so the delete
//! can be reversed as a unit.

use crate::audit::{
    Action, AuditRecorder, ClientSnapshot, LogEntry, PaymentSnapshot, RelatedEntity, Snapshot,
};
use crate::error::{ClinicError, ClinicResult};
use crate::models::{Client, ClientId, UserId};
use crate::storage::Storage;

/// Service for client management
pub struct ClientService<'a> {
    storage: &'a Storage,
    actor: Option<UserId>,
}

impl<'a> ClientService<'a> {
    /// Create a new client service acting on behalf of `actor`
    pub fn new(storage: &'a Storage, actor: Option<UserId>) -> Self {
        Self { storage, actor }
    }

    /// Register a new client
    pub fn create(
        &self,
        name: &str,
        phone: &str,
        email: Option<String>,
        notes: &str,
    ) -> ClinicResult<Client> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClinicError::Validation(
                "Client name cannot be empty".into(),
            ));
        }

        if self.storage.clients.get_by_name(name)?.is_some() {
            return Err(ClinicError::Duplicate {
                entity_type: "Client",
                identifier: name.to_string(),
            });
        }

        let mut client = Client::with_contact(name, phone, email);
        client.notes = notes.to_string();
        client.validate().map_err(ClinicError::Validation)?;

        self.storage.clients.upsert(client.clone())?;
        self.storage.clients.save()?;

        self.recorder().record(LogEntry::create(
            Action::ClientAdded,
            format!("Client '{}' added", client.name),
            RelatedEntity::client(client.id),
            self.actor,
        ));

        Ok(client)
    }

    /// Get a client by ID
    pub fn get(&self, id: ClientId) -> ClinicResult<Option<Client>> {
        self.storage.clients.get(id)
    }

    /// Find a client by name or ID string
    pub fn find(&self, identifier: &str) -> ClinicResult<Option<Client>> {
        if let Some(client) = self.storage.clients.get_by_name(identifier)? {
            return Ok(Some(client));
        }
        if let Ok(id) = identifier.parse::<ClientId>() {
            return self.storage.clients.get(id);
        }
        Ok(None)
    }

    /// List clients, optionally including archived ones
    pub fn list(&self, include_archived: bool) -> ClinicResult<Vec<Client>> {
        let mut clients = self.storage.clients.get_all()?;
        if !include_archived {
            clients.retain(|c| !c.archived);
        }
        Ok(clients)
    }

    /// Update a client's contact details and notes
    ///
    /// `None` fields are left unchanged. The prior state goes into the log
    /// so the update can be reversed.
    pub fn update(
        &self,
        id: ClientId,
        name: Option<&str>,
        phone: Option<&str>,
        email: Option<String>,
        notes: Option<&str>,
    ) -> ClinicResult<Client> {
        let mut client = self
            .storage
            .clients
            .get(id)?
            .ok_or_else(|| ClinicError::client_not_found(id.to_string()))?;
        let prior = client.clone();

        if let Some(name) = name {
            let name = name.trim();
            if let Some(existing) = self.storage.clients.get_by_name(name)? {
                if existing.id != client.id {
                    return Err(ClinicError::Duplicate {
                        entity_type: "Client",
                        identifier: name.to_string(),
                    });
                }
            }
            client.name = name.to_string();
        }
        if let Some(phone) = phone {
            client.phone = phone.to_string();
        }
        if let Some(email) = email {
            client.email = Some(email);
        }
        if let Some(notes) = notes {
            client.notes = notes.to_string();
        }

        client.validate().map_err(ClinicError::Validation)?;
        client.touch();

        self.storage.clients.upsert(client.clone())?;
        self.storage.clients.save()?;

        self.recorder().record(LogEntry::update(
            Action::ClientUpdated,
            format!("Client '{}' updated", client.name),
            RelatedEntity::client(client.id),
            Snapshot::client(ClientSnapshot::of(prior)),
            self.actor,
        ));

        Ok(client)
    }

    /// Archive a client without removing any data
    pub fn archive(&self, id: ClientId) -> ClinicResult<Client> {
        let mut client = self
            .storage
            .clients
            .get(id)?
            .ok_or_else(|| ClinicError::client_not_found(id.to_string()))?;

        if client.archived {
            return Err(ClinicError::Validation(format!(
                "Client '{}' is already archived",
                client.name
            )));
        }

        let prior = client.clone();
        client.archived = true;
        client.touch();

        self.storage.clients.upsert(client.clone())?;
        self.storage.clients.save()?;

        self.recorder().record(LogEntry::update(
            Action::ClientArchived,
            format!("Client '{}' archived", client.name),
            RelatedEntity::client(client.id),
            Snapshot::client(ClientSnapshot::of(prior)),
            self.actor,
        ));

        Ok(client)
    }

    /// Delete a client and everything that belongs to it
    ///
    /// The log entry carries the full subtree snapshot, so an undo restores
    /// the client with all its packages, measurements, appointments and
    /// payments under their original IDs.
    pub fn delete(&self, id: ClientId) -> ClinicResult<()> {
        let client = self
            .storage
            .clients
            .get(id)?
            .ok_or_else(|| ClinicError::client_not_found(id.to_string()))?;

        let snapshot = self.capture_subtree(&client)?;

        for service in &snapshot.services {
            self.storage.services.delete(service.id)?;
        }
        for measurement in &snapshot.measurements {
            self.storage.measurements.delete(measurement.id)?;
        }
        for appointment in &snapshot.appointments {
            self.storage.appointments.delete(appointment.id)?;
        }
        for payment in &snapshot.payments {
            for expense in &payment.expenses {
                self.storage.expenses.delete(expense.id)?;
            }
            self.storage.payments.delete(payment.payment.id)?;
        }
        self.storage.clients.delete(id)?;
        self.storage.save_all()?;

        self.recorder().record(LogEntry::delete(
            Action::ClientDeleted,
            format!("Client '{}' deleted", client.name),
            RelatedEntity::client(client.id),
            Snapshot::client(snapshot),
            self.actor,
        ));

        Ok(())
    }

    /// Collect the client's full subtree for the delete snapshot
    fn capture_subtree(&self, client: &Client) -> ClinicResult<ClientSnapshot> {
        let services = self.storage.services.get_by_client(client.id)?;
        let measurements = self.storage.measurements.get_by_client(client.id)?;
        let appointments = self.storage.appointments.get_by_client(client.id)?;

        let mut payments = Vec::new();
        for payment in self.storage.payments.get_by_client(client.id)? {
            let expenses = self.storage.expenses.get_by_payment(payment.id)?;
            payments.push(PaymentSnapshot { payment, expenses });
        }

        Ok(ClientSnapshot {
            client: client.clone(),
            services,
            measurements,
            appointments,
            payments,
        })
    }

    fn recorder(&self) -> AuditRecorder<'a> {
        AuditRecorder::new(self.storage)
    }
}
