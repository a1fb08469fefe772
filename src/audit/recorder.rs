//! Audit recorder
//!
//! Appends log entries after business mutations. The recorder never fails:
//! losing an audit record must not abort the primary operation that
//! triggered it, so persistence errors are swallowed and reported only
//! through operational logging.

use tracing::warn;

use crate::error::ClinicResult;
use crate::models::LogEntryId;
use crate::storage::Storage;

use super::entry::LogEntry;

/// Writes audit entries on behalf of the business services
pub struct AuditRecorder<'a> {
    storage: &'a Storage,
}

impl<'a> AuditRecorder<'a> {
    /// Create a recorder over the given storage
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record an entry, swallowing any persistence failure
    ///
    /// Must be called after the primary mutation has succeeded, so a failed
    /// mutation never leaves a phantom audit record. Returns the entry id if
    /// the record was written.
    pub fn record(&self, entry: LogEntry) -> Option<LogEntryId> {
        let id = entry.id;
        let action = entry.action;
        match self.try_record(entry) {
            Ok(()) => Some(id),
            Err(err) => {
                warn!(%action, error = %err, "failed to write audit entry");
                None
            }
        }
    }

    fn try_record(&self, entry: LogEntry) -> ClinicResult<()> {
        self.storage.log.append(entry)?;
        self.storage.log.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Action, RelatedEntity};
    use crate::config::paths::ClinicPaths;
    use crate::models::Client;
    use tempfile::TempDir;

    #[test]
    fn test_record_appends_and_persists() {
        let temp = TempDir::new().unwrap();
        let paths = ClinicPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let client = Client::new("Ayşe");
        let recorder = AuditRecorder::new(&storage);
        let id = recorder
            .record(LogEntry::create(
                Action::ClientAdded,
                "Client 'Ayşe' added",
                RelatedEntity::client(client.id),
                None,
            ))
            .unwrap();

        let entry = storage.log.get(id).unwrap().unwrap();
        assert_eq!(entry.action, Action::ClientAdded);
        assert!(temp.path().join("data/log.json").exists());
    }
}
