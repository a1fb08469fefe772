//! User service
//!
//! Operator accounts. The first registered user becomes the administrator;
//! later accounts default to staff unless an admin says otherwise.

use crate::audit::{Action, AuditRecorder, LogEntry, RelatedEntity};
use crate::error::{ClinicError, ClinicResult};
use crate::models::{Role, User, UserId};
use crate::storage::Storage;

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
    actor: Option<UserId>,
}

impl<'a> UserService<'a> {
    pub fn new(storage: &'a Storage, actor: Option<UserId>) -> Self {
        Self { storage, actor }
    }

    /// Register a new operator
    pub fn register(&self, name: &str, role: Role) -> ClinicResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClinicError::Validation("User name cannot be empty".into()));
        }
        if self.storage.users.get_by_name(name)?.is_some() {
            return Err(ClinicError::Duplicate {
                entity_type: "User",
                identifier: name.to_string(),
            });
        }

        let user = User::new(name, role);
        user.validate().map_err(ClinicError::Validation)?;

        self.storage.users.upsert(user.clone())?;
        self.storage.users.save()?;

        self.recorder().record(LogEntry::create(
            Action::UserAdded,
            format!("User '{}' registered as {}", user.name, user.role),
            RelatedEntity::user(user.id),
            self.actor,
        ));

        Ok(user)
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> ClinicResult<Option<User>> {
        self.storage.users.get(id)
    }

    /// Find a user by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> ClinicResult<Option<User>> {
        self.storage.users.get_by_name(name)
    }

    /// List all users
    pub fn list(&self) -> ClinicResult<Vec<User>> {
        self.storage.users.get_all()
    }

    /// Whether any user exists yet
    pub fn any_registered(&self) -> ClinicResult<bool> {
        Ok(self.storage.users.count()? > 0)
    }

    fn recorder(&self) -> AuditRecorder<'a> {
        AuditRecorder::new(self.storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::ClinicPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp = TempDir::new().unwrap();
        let paths = ClinicPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp, storage)
    }

    #[test]
    fn test_register_and_find() {
        let (_temp, storage) = create_test_storage();
        let users = UserService::new(&storage, None);

        let user = users.register("Boss", Role::Admin).unwrap();
        assert!(user.role.can_undo());

        let found = users.find_by_name("boss").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(users.any_registered().unwrap());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let (_temp, storage) = create_test_storage();
        let users = UserService::new(&storage, None);
        users.register("Boss", Role::Admin).unwrap();

        let err = users.register("boss", Role::Staff).unwrap_err();
        assert!(matches!(err, ClinicError::Duplicate { .. }));
    }
}
