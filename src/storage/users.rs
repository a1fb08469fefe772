//! Operator account repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{User, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable user file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct UserData {
    users: Vec<User>,
}

/// Repository for operator account persistence
pub struct UserRepository {
    path: PathBuf,
    data: RwLock<HashMap<UserId, User>>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn lock_err(e: impl std::fmt::Display) -> ClinicError {
        ClinicError::Storage(format!("Failed to acquire lock: {}", e))
    }

    /// Load users from disk
    pub fn load(&self) -> ClinicResult<()> {
        let file_data: UserData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(Self::lock_err)?;

        data.clear();
        for user in file_data.users {
            data.insert(user.id, user);
        }
        Ok(())
    }

    /// Save users to disk
    pub fn save(&self) -> ClinicResult<()> {
        let data = self.data.read().map_err(Self::lock_err)?;

        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));

        write_json_atomic(&self.path, &UserData { users })
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> ClinicResult<Option<User>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.get(&id).cloned())
    }

    /// Get a user by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> ClinicResult<Option<User>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let lower = name.to_lowercase();
        Ok(data
            .values()
            .find(|u| u.name.to_lowercase() == lower)
            .cloned())
    }

    /// Get all users, sorted by name
    pub fn get_all(&self) -> ClinicResult<Vec<User>> {
        let data = self.data.read().map_err(Self::lock_err)?;
        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    /// Insert or update a user
    pub fn upsert(&self, user: User) -> ClinicResult<()> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        data.insert(user.id, user);
        Ok(())
    }

    /// Remove a user, returning whether they existed
    pub fn delete(&self, id: UserId) -> ClinicResult<bool> {
        let mut data = self.data.write().map_err(Self::lock_err)?;
        Ok(data.remove(&id).is_some())
    }

    /// Count users
    pub fn count(&self) -> ClinicResult<usize> {
        let data = self.data.read().map_err(Self::lock_err)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use tempfile::TempDir;

    #[test]
    fn test_get_by_name() {
        let temp = TempDir::new().unwrap();
        let repo = UserRepository::new(temp.path().join("users.json"));
        repo.load().unwrap();

        repo.upsert(User::new("Deniz", Role::Admin)).unwrap();

        let found = repo.get_by_name("deniz").unwrap().unwrap();
        assert_eq!(found.role, Role::Admin);
    }
}
