//! Payment CLI commands

use clap::Subcommand;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{Money, PaymentMethod, UserId};
use crate::services::{ClientService, PaymentService};
use crate::storage::Storage;

use super::package::parse_date_or_today;

/// Payment subcommands
#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Record a payment from a client
    Add {
        /// Client name or ID
        client: String,
        /// Amount (e.g., "1500.00")
        amount: String,
        /// Payment method (cash, credit-card, bank-transfer)
        #[arg(short, long, default_value = "cash")]
        method: String,
        /// The package this payment is for (ID)
        #[arg(long)]
        package: Option<String>,
        /// Payment date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Free-text note
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// List payments
    List {
        /// Only this client's payments (name or ID)
        #[arg(short, long)]
        client: Option<String>,
    },
    /// Delete a payment (and its VAT expense, if any)
    Delete {
        /// Payment ID
        payment: String,
    },
}

/// Handle a payment command
pub fn handle_payment_command(
    storage: &Storage,
    actor: Option<UserId>,
    vat_rate_percent: i64,
    cmd: PaymentCommands,
) -> ClinicResult<()> {
    let payments = PaymentService::new(storage, actor);
    let clients = ClientService::new(storage, actor);

    match cmd {
        PaymentCommands::Add {
            client,
            amount,
            method,
            package,
            date,
            note,
        } => {
            let found = clients
                .find(&client)?
                .ok_or_else(|| ClinicError::client_not_found(&client))?;

            let amount = Money::parse(&amount)
                .map_err(|e| ClinicError::Validation(format!("Invalid amount: {}", e)))?;
            let method = PaymentMethod::parse(&method).ok_or_else(|| {
                ClinicError::Validation(format!(
                    "Invalid payment method: '{}'. Valid methods: cash, credit-card, bank-transfer",
                    method
                ))
            })?;
            let service_id = package
                .map(|p| p.parse().map_err(|_| ClinicError::service_not_found(&p)))
                .transpose()?;
            let date = parse_date_or_today(date.as_deref())?;

            let payment = payments.add(
                found.id,
                service_id,
                amount,
                method,
                date,
                &note,
                vat_rate_percent,
            )?;

            println!("Recorded payment of {} from {}", payment.amount, found.name);
            println!("  Method: {}", payment.method);
            println!("  ID:     {}", payment.id);
            if payment.method.incurs_vat() {
                println!(
                    "  VAT expense of {} recorded automatically",
                    payment.amount.percentage(vat_rate_percent)
                );
            }
        }

        PaymentCommands::List { client } => {
            let list = match client {
                Some(identifier) => {
                    let found = clients
                        .find(&identifier)?
                        .ok_or_else(|| ClinicError::client_not_found(&identifier))?;
                    payments.list_for_client(found.id)?
                }
                None => payments.list()?,
            };

            if list.is_empty() {
                println!("No payments found.");
            }
            for payment in &list {
                println!(
                    "{}  {}  {}  {}",
                    payment.id, payment.date, payment.amount, payment.method,
                );
            }
            if !list.is_empty() {
                let total: Money = list.iter().map(|p| p.amount).sum();
                println!("Total: {}", total);
            }
        }

        PaymentCommands::Delete { payment } => {
            let id = payment
                .parse()
                .map_err(|_| ClinicError::payment_not_found(&payment))?;
            payments.delete(id)?;
            println!("Deleted payment. Use 'clinic log undo' to reverse.");
        }
    }

    Ok(())
}
