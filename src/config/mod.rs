//! Configuration and path management for clinic-ledger

pub mod paths;
pub mod settings;

pub use paths::ClinicPaths;
pub use settings::Settings;
