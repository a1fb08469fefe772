//! Audit log CLI commands

use clap::Subcommand;

use crate::config::paths::ClinicPaths;
use crate::display::format_log_table;
use crate::error::{ClinicError, ClinicResult};
use crate::models::LogEntryId;
use crate::session::Session;
use crate::storage::Storage;
use crate::undo::UndoEngine;

/// Log subcommands
#[derive(Subcommand)]
pub enum LogCommands {
    /// Show recent log entries
    List {
        /// How many entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Show one entry in full
    Show {
        /// Log entry ID (full UUID or unique prefix)
        entry: String,
    },
    /// Reverse a log entry (administrators only)
    Undo {
        /// Log entry ID (full UUID or unique prefix)
        entry: String,
    },
}

/// Handle a log command
pub fn handle_log_command(
    storage: &Storage,
    paths: &ClinicPaths,
    cmd: LogCommands,
) -> ClinicResult<()> {
    match cmd {
        LogCommands::List { limit } => {
            let entries = storage.log.recent(limit)?;
            println!("{}", format_log_table(&entries));
        }

        LogCommands::Show { entry } => {
            let id = resolve_entry_id(storage, &entry)?;
            let entry = storage
                .log
                .get(id)?
                .ok_or_else(|| ClinicError::log_entry_not_found(id.to_string()))?;
            println!("{}", entry.format_human_readable());
            if let Some(user_id) = entry.user_id {
                if let Some(user) = storage.users.get(user_id)? {
                    println!("  By: {}", user.name);
                }
            }
            if entry.previous_data.is_some() {
                println!("  Carries a previous-state snapshot; can be undone.");
            }
        }

        LogCommands::Undo { entry } => {
            let session = Session::load(paths)?.ok_or_else(|| {
                ClinicError::Unauthorized("sign in with 'clinic user login' first".into())
            })?;
            let admin = session.require_admin(storage)?;

            let id = resolve_entry_id(storage, &entry)?;
            let engine = UndoEngine::new(storage);
            let undo_entry = engine.undo(id, &admin)?;
            println!("{}", undo_entry.details);
        }
    }

    Ok(())
}

/// Resolve a log entry ID from a full UUID or a unique prefix
fn resolve_entry_id(storage: &Storage, input: &str) -> ClinicResult<LogEntryId> {
    if let Ok(id) = input.parse::<LogEntryId>() {
        return Ok(id);
    }

    let needle = input.strip_prefix("log-").unwrap_or(input).to_lowercase();
    let matches: Vec<LogEntryId> = storage
        .log
        .get_all()?
        .into_iter()
        .filter(|e| e.id.as_uuid().to_string().starts_with(&needle))
        .map(|e| e.id)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(ClinicError::log_entry_not_found(input)),
        _ => Err(ClinicError::Validation(format!(
            "'{}' matches {} log entries; use a longer prefix",
            input,
            matches.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Action, AuditRecorder, LogEntry, RelatedEntity};
    use crate::models::ClientId;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_entry_id_by_prefix() {
        let temp = TempDir::new().unwrap();
        let paths = ClinicPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let id = AuditRecorder::new(&storage)
            .record(LogEntry::create(
                Action::ClientAdded,
                "Client added",
                RelatedEntity::client(ClientId::new()),
                None,
            ))
            .unwrap();

        let prefix = &id.as_uuid().to_string()[..8];
        assert_eq!(resolve_entry_id(&storage, prefix).unwrap(), id);
        assert_eq!(
            resolve_entry_id(&storage, &format!("log-{}", prefix)).unwrap(),
            id
        );

        let err = resolve_entry_id(&storage, "ffffffff").unwrap_err();
        assert!(err.is_not_found());
    }
}
