//! Client repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{Client, ClientId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable client file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ClientData {
    clients: Vec<Client>,
}

/// Repository for client persistence
pub struct ClientRepository {
    path: PathBuf,
    data: RwLock<HashMap<ClientId, Client>>,
}

impl ClientRepository {
    /// Create a new client repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read_lock(&self) -> ClinicResult<std::sync::RwLockReadGuard<'_, HashMap<ClientId, Client>>> {
        self.data
            .read()
            .map_err(|e| ClinicError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_lock(
        &self,
    ) -> ClinicResult<std::sync::RwLockWriteGuard<'_, HashMap<ClientId, Client>>> {
        self.data
            .write()
            .map_err(|e| ClinicError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load clients from disk
    pub fn load(&self) -> ClinicResult<()> {
        let file_data: ClientData = read_json(&self.path)?;
        let mut data = self.write_lock()?;

        data.clear();
        for client in file_data.clients {
            data.insert(client.id, client);
        }
        Ok(())
    }

    /// Save clients to disk
    pub fn save(&self) -> ClinicResult<()> {
        let data = self.read_lock()?;

        let mut clients: Vec<_> = data.values().cloned().collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));

        write_json_atomic(&self.path, &ClientData { clients })
    }

    /// Get a client by ID
    pub fn get(&self, id: ClientId) -> ClinicResult<Option<Client>> {
        let data = self.read_lock()?;
        Ok(data.get(&id).cloned())
    }

    /// Get a client by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> ClinicResult<Option<Client>> {
        let data = self.read_lock()?;
        let lower = name.to_lowercase();
        Ok(data
            .values()
            .find(|c| c.name.to_lowercase() == lower)
            .cloned())
    }

    /// Get all clients, sorted by name
    pub fn get_all(&self) -> ClinicResult<Vec<Client>> {
        let data = self.read_lock()?;
        let mut clients: Vec<_> = data.values().cloned().collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    /// Insert or update a client
    pub fn upsert(&self, client: Client) -> ClinicResult<()> {
        let mut data = self.write_lock()?;
        data.insert(client.id, client);
        Ok(())
    }

    /// Delete a client, returning whether it existed
    pub fn delete(&self, id: ClientId) -> ClinicResult<bool> {
        let mut data = self.write_lock()?;
        Ok(data.remove(&id).is_some())
    }

    /// Count clients
    pub fn count(&self) -> ClinicResult<usize> {
        let data = self.read_lock()?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ClientRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ClientRepository::new(temp_dir.path().join("clients.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_upsert_and_get_by_name() {
        let (_temp, repo) = create_test_repo();
        let client = Client::new("Ayşe Yılmaz");
        let id = client.id;
        repo.upsert(client).unwrap();

        let found = repo.get_by_name("ayşe yılmaz").unwrap().unwrap();
        assert_eq!(found.id, id);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp, repo) = create_test_repo();
        repo.upsert(Client::new("Test")).unwrap();
        repo.save().unwrap();

        let repo2 = ClientRepository::new(temp.path().join("clients.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 1);
    }

    #[test]
    fn test_delete() {
        let (_temp, repo) = create_test_repo();
        let client = Client::new("Gone");
        let id = client.id;
        repo.upsert(client).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
