//! Client CLI commands

use clap::Subcommand;

use crate::display::{format_client_details, format_client_list};
use crate::error::{ClinicError, ClinicResult};
use crate::models::UserId;
use crate::services::ClientService;
use crate::storage::Storage;

/// Client subcommands
#[derive(Subcommand)]
pub enum ClientCommands {
    /// Register a new client
    Add {
        /// Client name
        name: String,
        /// Phone number
        #[arg(short, long, default_value = "")]
        phone: String,
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
        /// Free-text notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// List clients
    List {
        /// Include archived clients
        #[arg(short, long)]
        all: bool,
    },
    /// Show a client's details, packages and balance
    Show {
        /// Client name or ID
        client: String,
    },
    /// Edit a client's details
    Edit {
        /// Client name or ID
        client: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New phone number
        #[arg(short, long)]
        phone: Option<String>,
        /// New email address
        #[arg(short, long)]
        email: Option<String>,
        /// New notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Archive a client without deleting any data
    Archive {
        /// Client name or ID
        client: String,
    },
    /// Delete a client and everything that belongs to them
    Delete {
        /// Client name or ID
        client: String,
    },
}

/// Handle a client command
pub fn handle_client_command(
    storage: &Storage,
    actor: Option<UserId>,
    cmd: ClientCommands,
) -> ClinicResult<()> {
    let service = ClientService::new(storage, actor);

    match cmd {
        ClientCommands::Add {
            name,
            phone,
            email,
            notes,
        } => {
            let client = service.create(&name, &phone, email, &notes)?;
            println!("Registered client: {}", client.name);
            println!("  ID: {}", client.id);
        }

        ClientCommands::List { all } => {
            let clients = service.list(all)?;
            print!("{}", format_client_list(&clients));
        }

        ClientCommands::Show { client } => {
            let found = service
                .find(&client)?
                .ok_or_else(|| ClinicError::client_not_found(&client))?;

            let services = storage.services.get_by_client(found.id)?;
            let payments = storage.payments.get_by_client(found.id)?;
            let appointments = storage.appointments.get_by_client(found.id)?;
            let measurements = storage.measurements.get_by_client(found.id)?;
            print!(
                "{}",
                format_client_details(&found, &services, &payments, &appointments, &measurements)
            );
        }

        ClientCommands::Edit {
            client,
            name,
            phone,
            email,
            notes,
        } => {
            let found = service
                .find(&client)?
                .ok_or_else(|| ClinicError::client_not_found(&client))?;

            if name.is_none() && phone.is_none() && email.is_none() && notes.is_none() {
                println!("No changes specified.");
                return Ok(());
            }

            let updated = service.update(
                found.id,
                name.as_deref(),
                phone.as_deref(),
                email,
                notes.as_deref(),
            )?;
            println!("Updated client: {}", updated.name);
        }

        ClientCommands::Archive { client } => {
            let found = service
                .find(&client)?
                .ok_or_else(|| ClinicError::client_not_found(&client))?;

            let archived = service.archive(found.id)?;
            println!("Archived client: {}", archived.name);
        }

        ClientCommands::Delete { client } => {
            let found = service
                .find(&client)?
                .ok_or_else(|| ClinicError::client_not_found(&client))?;

            service.delete(found.id)?;
            println!(
                "Deleted client '{}' and all their data. Use 'clinic log undo' to reverse.",
                found.name
            );
        }
    }

    Ok(())
}
