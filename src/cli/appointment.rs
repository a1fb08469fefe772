//! Appointment CLI commands

use chrono::NaiveDateTime;
use clap::Subcommand;

use crate::error::{ClinicError, ClinicResult};
use crate::models::UserId;
use crate::services::{AppointmentService, ClientService};
use crate::storage::Storage;

/// Appointment subcommands
#[derive(Subcommand)]
pub enum AppointmentCommands {
    /// Book an appointment
    Schedule {
        /// Client name or ID
        client: String,
        /// When (YYYY-MM-DD HH:MM)
        at: String,
        /// Consume a session from this package (ID)
        #[arg(long)]
        package: Option<String>,
        /// Free-text note
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// List appointments
    List {
        /// Only this client's appointments (name or ID)
        #[arg(short, long)]
        client: Option<String>,
    },
    /// Mark an appointment as completed
    Complete {
        /// Appointment ID
        appointment: String,
    },
    /// Cancel an appointment, returning its session to the package
    Cancel {
        /// Appointment ID
        appointment: String,
    },
    /// Delete an appointment
    Delete {
        /// Appointment ID
        appointment: String,
    },
}

/// Handle an appointment command
pub fn handle_appointment_command(
    storage: &Storage,
    actor: Option<UserId>,
    cmd: AppointmentCommands,
) -> ClinicResult<()> {
    let appointments = AppointmentService::new(storage, actor);
    let clients = ClientService::new(storage, actor);

    match cmd {
        AppointmentCommands::Schedule {
            client,
            at,
            package,
            note,
        } => {
            let found = clients
                .find(&client)?
                .ok_or_else(|| ClinicError::client_not_found(&client))?;

            let scheduled_at = NaiveDateTime::parse_from_str(&at, "%Y-%m-%d %H:%M")
                .map_err(|_| {
                    ClinicError::Validation(format!(
                        "Invalid time '{}', expected YYYY-MM-DD HH:MM",
                        at
                    ))
                })?
                .and_utc();
            let service_id = package
                .map(|p| p.parse().map_err(|_| ClinicError::service_not_found(&p)))
                .transpose()?;

            let appointment = appointments.schedule(found.id, service_id, scheduled_at, &note)?;
            println!(
                "Booked appointment for {} at {}",
                found.name,
                appointment.scheduled_at.format("%Y-%m-%d %H:%M")
            );
            if appointment.session_consumed {
                println!("  One session consumed from the package");
            }
            println!("  ID: {}", appointment.id);
        }

        AppointmentCommands::List { client } => {
            let list = match client {
                Some(identifier) => {
                    let found = clients
                        .find(&identifier)?
                        .ok_or_else(|| ClinicError::client_not_found(&identifier))?;
                    appointments.list_for_client(found.id)?
                }
                None => appointments.list()?,
            };

            if list.is_empty() {
                println!("No appointments found.");
            }
            for appointment in list {
                println!(
                    "{}  {}  {}{}",
                    appointment.id,
                    appointment.scheduled_at.format("%Y-%m-%d %H:%M"),
                    appointment.status,
                    if appointment.session_consumed {
                        "  (session)"
                    } else {
                        ""
                    },
                );
            }
        }

        AppointmentCommands::Complete { appointment } => {
            let id = appointment
                .parse()
                .map_err(|_| ClinicError::appointment_not_found(&appointment))?;
            appointments.complete(id)?;
            println!("Marked appointment as completed.");
        }

        AppointmentCommands::Cancel { appointment } => {
            let id = appointment
                .parse()
                .map_err(|_| ClinicError::appointment_not_found(&appointment))?;
            let cancelled = appointments.cancel(id)?;
            println!(
                "Cancelled appointment at {}.",
                cancelled.scheduled_at.format("%Y-%m-%d %H:%M")
            );
        }

        AppointmentCommands::Delete { appointment } => {
            let id = appointment
                .parse()
                .map_err(|_| ClinicError::appointment_not_found(&appointment))?;
            appointments.delete(id)?;
            println!("Deleted appointment. Use 'clinic log undo' to reverse.");
        }
    }

    Ok(())
}
