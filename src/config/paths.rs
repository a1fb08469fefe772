//! Path management for clinic-ledger
//!
//! Provides XDG-compliant path resolution for configuration and data.
//!
//! ## Path Resolution Order
//!
//! 1. `CLINIC_LEDGER_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/clinic-ledger` or `~/.config/clinic-ledger`
//! 3. Windows: `%APPDATA%\clinic-ledger`

use std::path::PathBuf;

use crate::error::ClinicError;

/// Manages all paths used by clinic-ledger
#[derive(Debug, Clone)]
pub struct ClinicPaths {
    /// Base directory for all clinic-ledger data
    base_dir: PathBuf,
}

impl ClinicPaths {
    /// Create a new ClinicPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, ClinicError> {
        let base_dir = if let Ok(custom) = std::env::var("CLINIC_LEDGER_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create ClinicPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the export directory
    pub fn export_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the operator session file
    pub fn session_file(&self) -> PathBuf {
        self.base_dir.join("session.json")
    }

    /// Get the path to clients.json
    pub fn clients_file(&self) -> PathBuf {
        self.data_dir().join("clients.json")
    }

    /// Get the path to services.json
    pub fn services_file(&self) -> PathBuf {
        self.data_dir().join("services.json")
    }

    /// Get the path to service_types.json
    pub fn service_types_file(&self) -> PathBuf {
        self.data_dir().join("service_types.json")
    }

    /// Get the path to payments.json
    pub fn payments_file(&self) -> PathBuf {
        self.data_dir().join("payments.json")
    }

    /// Get the path to expenses.json
    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    /// Get the path to appointments.json
    pub fn appointments_file(&self) -> PathBuf {
        self.data_dir().join("appointments.json")
    }

    /// Get the path to measurements.json
    pub fn measurements_file(&self) -> PathBuf {
        self.data_dir().join("measurements.json")
    }

    /// Get the path to users.json
    pub fn users_file(&self) -> PathBuf {
        self.data_dir().join("users.json")
    }

    /// Get the path to the audit log file
    pub fn log_file(&self) -> PathBuf {
        self.data_dir().join("log.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), ClinicError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| ClinicError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| ClinicError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.export_dir())
            .map_err(|e| ClinicError::Io(format!("Failed to create export directory: {}", e)))?;

        Ok(())
    }

    /// Check if clinic-ledger has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, ClinicError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        Err(_) => {
            let home = std::env::var("HOME")
                .map_err(|_| ClinicError::Config("Could not determine home directory".into()))?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("clinic-ledger"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, ClinicError> {
    // Windows: Use APPDATA
    let appdata = std::env::var("APPDATA")
        .map_err(|_| ClinicError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("clinic-ledger"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_base_dir() {
        let temp = TempDir::new().unwrap();
        let paths = ClinicPaths::with_base_dir(temp.path().to_path_buf());

        assert_eq!(paths.base_dir(), &temp.path().to_path_buf());
        assert_eq!(paths.clients_file(), temp.path().join("data/clients.json"));
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_ensure_directories() {
        let temp = TempDir::new().unwrap();
        let paths = ClinicPaths::with_base_dir(temp.path().join("nested"));

        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().exists());
        assert!(paths.export_dir().exists());
    }
}
