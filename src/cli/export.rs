//! Export CLI commands

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Subcommand;

use crate::error::{ClinicError, ClinicResult};
use crate::export::{export_expenses_csv, export_full_json, export_payments_csv};
use crate::storage::Storage;

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the full database as JSON
    Json {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export payments as CSV
    Payments {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export expenses as CSV
    Expenses {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle an export command
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> ClinicResult<()> {
    match cmd {
        ExportCommands::Json { output } => {
            write_export(output, |w| export_full_json(storage, w))
        }
        ExportCommands::Payments { output } => {
            write_export(output, |w| export_payments_csv(storage, w))
        }
        ExportCommands::Expenses { output } => {
            write_export(output, |w| export_expenses_csv(storage, w))
        }
    }
}

fn write_export<F>(output: Option<PathBuf>, export: F) -> ClinicResult<()>
where
    F: FnOnce(&mut dyn Write) -> ClinicResult<()>,
{
    match output {
        Some(path) => {
            let mut file =
                File::create(&path).map_err(|e| ClinicError::Export(e.to_string()))?;
            export(&mut file)?;
            println!("Exported to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            export(&mut handle)?;
        }
    }
    Ok(())
}
