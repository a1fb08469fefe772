//! Package CLI commands

use chrono::Utc;
use clap::Subcommand;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{Money, UserId};
use crate::services::{ClientService, PackageService};
use crate::storage::Storage;

/// Package subcommands
#[derive(Subcommand)]
pub enum PackageCommands {
    /// Sell a package to a client
    Sell {
        /// Client name or ID
        client: String,
        /// Package name, or a catalog entry name with --from-catalog
        name: String,
        /// Package price (e.g., "1500.00"); required unless --from-catalog
        #[arg(short, long)]
        price: Option<String>,
        /// Number of sessions included; required unless --from-catalog
        #[arg(short, long)]
        sessions: Option<u32>,
        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(short = 'd', long)]
        start_date: Option<String>,
        /// Take price and session count from the catalog entry of this name
        #[arg(long)]
        from_catalog: bool,
    },
    /// List packages
    List {
        /// Only this client's packages (name or ID)
        #[arg(short, long)]
        client: Option<String>,
    },
    /// Deduct one session from a package (walk-in visit)
    Deduct {
        /// Package ID
        package: String,
    },
    /// Delete a package
    Delete {
        /// Package ID
        package: String,
    },
    /// Add a reusable package type to the catalog
    AddType {
        /// Catalog name
        name: String,
        /// Default number of sessions
        #[arg(short, long)]
        sessions: u32,
        /// Default price
        #[arg(short, long)]
        price: String,
    },
    /// List the package catalog
    Types,
}

/// Handle a package command
pub fn handle_package_command(
    storage: &Storage,
    actor: Option<UserId>,
    cmd: PackageCommands,
) -> ClinicResult<()> {
    let packages = PackageService::new(storage, actor);
    let clients = ClientService::new(storage, actor);

    match cmd {
        PackageCommands::Sell {
            client,
            name,
            price,
            sessions,
            start_date,
            from_catalog,
        } => {
            let found = clients
                .find(&client)?
                .ok_or_else(|| ClinicError::client_not_found(&client))?;
            let start = parse_date_or_today(start_date.as_deref())?;

            let service = if from_catalog {
                let entry = packages
                    .find_catalog_entry(&name)?
                    .ok_or(ClinicError::NotFound {
                        entity_type: "ServiceType",
                        identifier: name.clone(),
                    })?;
                packages.sell_from_catalog(found.id, entry.id, start)?
            } else {
                let price = price.ok_or_else(|| {
                    ClinicError::Validation("--price is required without --from-catalog".into())
                })?;
                let price = Money::parse(&price)
                    .map_err(|e| ClinicError::Validation(format!("Invalid price: {}", e)))?;
                let sessions = sessions.ok_or_else(|| {
                    ClinicError::Validation("--sessions is required without --from-catalog".into())
                })?;
                packages.sell(found.id, &name, price, sessions, start)?
            };

            println!("Sold package '{}' to {}", service.name, found.name);
            println!("  Sessions: {}", service.total_sessions);
            println!("  Price:    {}", service.total_price);
            println!("  ID:       {}", service.id);
        }

        PackageCommands::List { client } => {
            let list = match client {
                Some(identifier) => {
                    let found = clients
                        .find(&identifier)?
                        .ok_or_else(|| ClinicError::client_not_found(&identifier))?;
                    packages.list_for_client(found.id)?
                }
                None => packages.list()?,
            };

            if list.is_empty() {
                println!("No packages found.");
            }
            for service in list {
                println!(
                    "{}  {}  {}/{} sessions left  {}",
                    service.id,
                    service.name,
                    service.remaining_sessions,
                    service.total_sessions,
                    service.total_price,
                );
            }
        }

        PackageCommands::Deduct { package } => {
            let id = package
                .parse()
                .map_err(|_| ClinicError::service_not_found(&package))?;
            let service = packages.deduct_session(id)?;
            println!(
                "Deducted one session from '{}' ({} left)",
                service.name, service.remaining_sessions
            );
        }

        PackageCommands::Delete { package } => {
            let id = package
                .parse()
                .map_err(|_| ClinicError::service_not_found(&package))?;
            packages.delete(id)?;
            println!("Deleted package. Use 'clinic log undo' to reverse.");
        }

        PackageCommands::AddType {
            name,
            sessions,
            price,
        } => {
            let price = Money::parse(&price)
                .map_err(|e| ClinicError::Validation(format!("Invalid price: {}", e)))?;
            let entry = packages.add_catalog_entry(&name, sessions, price)?;
            println!("Added '{}' to the catalog ({})", entry.name, entry.id);
        }

        PackageCommands::Types => {
            let catalog = packages.list_catalog()?;
            if catalog.is_empty() {
                println!("The catalog is empty.");
            }
            for entry in catalog {
                println!(
                    "{}  {}  {} sessions  {}",
                    entry.id, entry.name, entry.default_sessions, entry.default_price,
                );
            }
        }
    }

    Ok(())
}

/// Parse a YYYY-MM-DD date, defaulting to today
pub fn parse_date_or_today(input: Option<&str>) -> ClinicResult<chrono::NaiveDate> {
    match input {
        Some(s) => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| ClinicError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s))),
        None => Ok(Utc::now().date_naive()),
    }
}
