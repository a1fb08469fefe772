//! Log entry repository
//!
//! Persists the audit log. Entries are append-only apart from the
//! `is_undone` flag, which is flipped through a conditional update so two
//! racing undo calls cannot both win.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::audit::{ActionKind, LogEntry, RelatedEntity};
use crate::error::{ClinicError, ClinicResult};
use crate::models::LogEntryId;

use super::file_io::{read_json, write_json_atomic};

/// Serializable log file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct LogData {
    entries: Vec<LogEntry>,
}

/// Repository for audit log persistence
pub struct LogRepository {
    path: PathBuf,
    data: RwLock<HashMap<LogEntryId, LogEntry>>,
}

impl LogRepository {
    /// Create a new log repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read_lock(&self) -> ClinicResult<std::sync::RwLockReadGuard<'_, HashMap<LogEntryId, LogEntry>>> {
        self.data
            .read()
            .map_err(|e| ClinicError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_lock(
        &self,
    ) -> ClinicResult<std::sync::RwLockWriteGuard<'_, HashMap<LogEntryId, LogEntry>>> {
        self.data
            .write()
            .map_err(|e| ClinicError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load log entries from disk
    pub fn load(&self) -> ClinicResult<()> {
        let file_data: LogData = read_json(&self.path)?;
        let mut data = self.write_lock()?;

        data.clear();
        for entry in file_data.entries {
            data.insert(entry.id, entry);
        }

        Ok(())
    }

    /// Save log entries to disk
    pub fn save(&self) -> ClinicResult<()> {
        let data = self.read_lock()?;

        let mut entries: Vec<_> = data.values().cloned().collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        write_json_atomic(&self.path, &LogData { entries })
    }

    /// Append a new entry
    pub fn append(&self, entry: LogEntry) -> ClinicResult<()> {
        let mut data = self.write_lock()?;
        data.insert(entry.id, entry);
        Ok(())
    }

    /// Get an entry by ID
    pub fn get(&self, id: LogEntryId) -> ClinicResult<Option<LogEntry>> {
        let data = self.read_lock()?;
        Ok(data.get(&id).cloned())
    }

    /// Get all entries, newest first
    pub fn get_all(&self) -> ClinicResult<Vec<LogEntry>> {
        let data = self.read_lock()?;
        let mut entries: Vec<_> = data.values().cloned().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    /// Get the most recent N entries, newest first
    pub fn recent(&self, count: usize) -> ClinicResult<Vec<LogEntry>> {
        let mut entries = self.get_all()?;
        entries.truncate(count);
        Ok(entries)
    }

    /// Flip `is_undone` on an entry, exactly once
    ///
    /// The check and the write happen under one write lock, so of two
    /// concurrent undo calls only one gets `Ok`. The other sees
    /// `AlreadyUndone` and must not touch the business entity.
    pub fn mark_undone(&self, id: LogEntryId) -> ClinicResult<()> {
        let mut data = self.write_lock()?;
        let entry = data
            .get_mut(&id)
            .ok_or_else(|| ClinicError::log_entry_not_found(id.to_string()))?;

        if entry.is_undone {
            return Err(ClinicError::AlreadyUndone);
        }
        entry.is_undone = true;
        Ok(())
    }

    /// Find the active (not yet undone) create entry for an entity
    ///
    /// Used to redirect a VAT-expense undo to its parent payment and to
    /// flag cascade-deleted expenses' own entries.
    pub fn active_create_entry_for(&self, related: RelatedEntity) -> ClinicResult<Option<LogEntry>> {
        let data = self.read_lock()?;
        Ok(data
            .values()
            .find(|e| {
                e.kind() == ActionKind::Create && !e.is_undone && e.related == Some(related)
            })
            .cloned())
    }

    /// Count entries
    pub fn count(&self) -> ClinicResult<usize> {
        let data = self.read_lock()?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Action;
    use crate::models::Client;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, LogRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("log.json");
        let repo = LogRepository::new(path);
        repo.load().unwrap();
        (temp_dir, repo)
    }

    fn client_added_entry() -> LogEntry {
        let client = Client::new("Test");
        LogEntry::create(
            Action::ClientAdded,
            "Client 'Test' added",
            RelatedEntity::client(client.id),
            None,
        )
    }

    #[test]
    fn test_append_and_get() {
        let (_temp, repo) = create_test_repo();
        let entry = client_added_entry();
        let id = entry.id;

        repo.append(entry).unwrap();

        let retrieved = repo.get(id).unwrap().unwrap();
        assert_eq!(retrieved.action, Action::ClientAdded);
        assert!(!retrieved.is_undone);
    }

    #[test]
    fn test_mark_undone_once() {
        let (_temp, repo) = create_test_repo();
        let entry = client_added_entry();
        let id = entry.id;
        repo.append(entry).unwrap();

        repo.mark_undone(id).unwrap();
        assert!(repo.get(id).unwrap().unwrap().is_undone);

        // Second flip must lose
        let err = repo.mark_undone(id).unwrap_err();
        assert!(matches!(err, ClinicError::AlreadyUndone));
    }

    #[test]
    fn test_mark_undone_missing_entry() {
        let (_temp, repo) = create_test_repo();
        let err = repo.mark_undone(LogEntryId::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_active_create_entry_for() {
        let (_temp, repo) = create_test_repo();
        let entry = client_added_entry();
        let related = entry.related.unwrap();
        let id = entry.id;
        repo.append(entry).unwrap();

        let found = repo.active_create_entry_for(related).unwrap().unwrap();
        assert_eq!(found.id, id);

        // Once undone it is no longer active
        repo.mark_undone(id).unwrap();
        assert!(repo.active_create_entry_for(related).unwrap().is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp, repo) = create_test_repo();
        let entry = client_added_entry();
        let id = entry.id;
        repo.append(entry).unwrap();
        repo.save().unwrap();

        let repo2 = LogRepository::new(temp.path().join("log.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 1);
        assert!(repo2.get(id).unwrap().is_some());
    }
}
