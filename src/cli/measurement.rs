//! Measurement CLI commands

use clap::Subcommand;

use crate::error::{ClinicError, ClinicResult};
use crate::models::UserId;
use crate::services::{ClientService, MeasurementService};
use crate::storage::Storage;

use super::package::parse_date_or_today;

/// Measurement subcommands
#[derive(Subcommand)]
pub enum MeasurementCommands {
    /// Record body measurements for a client
    Add {
        /// Client name or ID
        client: String,
        /// Measurement date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Weight in kilograms
        #[arg(short, long)]
        weight: Option<f64>,
        /// Height in centimeters
        #[arg(long)]
        height: Option<f64>,
        /// Waist circumference in centimeters
        #[arg(long)]
        waist: Option<f64>,
        /// Hip circumference in centimeters
        #[arg(long)]
        hip: Option<f64>,
        /// Free-text note
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// List a client's measurements
    List {
        /// Client name or ID
        client: String,
    },
    /// Delete a measurement
    Delete {
        /// Measurement ID
        measurement: String,
    },
}

/// Handle a measurement command
pub fn handle_measurement_command(
    storage: &Storage,
    actor: Option<UserId>,
    cmd: MeasurementCommands,
) -> ClinicResult<()> {
    let measurements = MeasurementService::new(storage, actor);
    let clients = ClientService::new(storage, actor);

    match cmd {
        MeasurementCommands::Add {
            client,
            date,
            weight,
            height,
            waist,
            hip,
            note,
        } => {
            let found = clients
                .find(&client)?
                .ok_or_else(|| ClinicError::client_not_found(&client))?;
            let date = parse_date_or_today(date.as_deref())?;

            let measurement =
                measurements.add(found.id, date, weight, height, waist, hip, &note)?;
            println!("Recorded measurement for {} ({})", found.name, date);
            if let Some(bmi) = measurement.bmi() {
                println!("  BMI: {:.1}", bmi);
            }
            println!("  ID: {}", measurement.id);
        }

        MeasurementCommands::List { client } => {
            let found = clients
                .find(&client)?
                .ok_or_else(|| ClinicError::client_not_found(&client))?;

            let list = measurements.list_for_client(found.id)?;
            if list.is_empty() {
                println!("No measurements found.");
            }
            for m in list {
                let weight = m
                    .weight_kg
                    .map(|w| format!("{:.1} kg", w))
                    .unwrap_or_default();
                let bmi = m.bmi().map(|b| format!("  BMI {:.1}", b)).unwrap_or_default();
                println!("{}  {}  {}{}", m.id, m.date, weight, bmi);
            }
        }

        MeasurementCommands::Delete { measurement } => {
            let id = measurement.parse().map_err(|_| ClinicError::NotFound {
                entity_type: "Measurement",
                identifier: measurement.clone(),
            })?;
            measurements.delete(id)?;
            println!("Deleted measurement. Use 'clinic log undo' to reverse.");
        }
    }

    Ok(())
}
