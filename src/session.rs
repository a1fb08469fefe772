//! Login session
//!
//! Tracks which operator is signed in between CLI invocations. The session
//! lives in a small JSON file next to the data directory; deleting it is a
//! logout. Operations record the session's user as the acting operator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::config::paths::ClinicPaths;
use crate::error::{ClinicError, ClinicResult};
use crate::models::{Role, User, UserId};
use crate::storage::file_io::write_json_atomic;
use crate::storage::Storage;

/// The signed-in operator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for the given user
    pub fn start(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            role: user.role,
            logged_in_at: Utc::now(),
        }
    }

    /// Load the current session, if someone is signed in
    pub fn load(paths: &ClinicPaths) -> ClinicResult<Option<Self>> {
        let path = paths.session_file();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    /// Persist the session
    pub fn save(&self, paths: &ClinicPaths) -> ClinicResult<()> {
        write_json_atomic(&paths.session_file(), self)
    }

    /// End the current session, if any
    pub fn clear(paths: &ClinicPaths) -> ClinicResult<()> {
        let path = paths.session_file();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Resolve the session's user against storage
    ///
    /// The session file can outlive its user row; a stale session is treated
    /// as signed out.
    pub fn resolve_user(&self, storage: &Storage) -> ClinicResult<Option<User>> {
        storage.users.get(self.user_id)
    }

    /// The session user, required to be an administrator
    pub fn require_admin(&self, storage: &Storage) -> ClinicResult<User> {
        let user = self.resolve_user(storage)?.ok_or_else(|| {
            ClinicError::Unauthorized("session user no longer exists".into())
        })?;
        if !user.role.can_undo() {
            return Err(ClinicError::Unauthorized(format!(
                "'{}' is not an administrator",
                user.name
            )));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, ClinicPaths, Storage) {
        let temp = TempDir::new().unwrap();
        let paths = ClinicPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths.clone()).unwrap();
        storage.load_all().unwrap();
        let paths = ClinicPaths::with_base_dir(temp.path().to_path_buf());
        (temp, paths, storage)
    }

    #[test]
    fn test_session_roundtrip() {
        let (_temp, paths, _storage) = create_test_storage();
        let user = User::new("Boss", Role::Admin);

        assert!(Session::load(&paths).unwrap().is_none());

        Session::start(&user).save(&paths).unwrap();
        let loaded = Session::load(&paths).unwrap().unwrap();
        assert_eq!(loaded.user_id, user.id);
        assert_eq!(loaded.role, Role::Admin);

        Session::clear(&paths).unwrap();
        assert!(Session::load(&paths).unwrap().is_none());
    }

    #[test]
    fn test_require_admin() {
        let (_temp, paths, storage) = create_test_storage();
        let admin = User::new("Boss", Role::Admin);
        let staff = User::new("Clerk", Role::Staff);
        storage.users.upsert(admin.clone()).unwrap();
        storage.users.upsert(staff.clone()).unwrap();

        let session = Session::start(&admin);
        session.save(&paths).unwrap();
        assert!(session.require_admin(&storage).is_ok());

        let session = Session::start(&staff);
        let err = session.require_admin(&storage).unwrap_err();
        assert!(matches!(err, ClinicError::Unauthorized(_)));
    }

    #[test]
    fn test_stale_session_resolves_to_none() {
        let (_temp, _paths, storage) = create_test_storage();
        let user = User::new("Gone", Role::Admin);
        let session = Session::start(&user);
        assert!(session.resolve_user(&storage).unwrap().is_none());
    }
}
