use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clinic_ledger::cli::{
    handle_appointment_command, handle_client_command, handle_expense_command,
    handle_export_command, handle_log_command, handle_measurement_command,
    handle_package_command, handle_payment_command, handle_user_command,
};
use clinic_ledger::config::{paths::ClinicPaths, settings::Settings};
use clinic_ledger::models::UserId;
use clinic_ledger::session::Session;
use clinic_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "clinic",
    version,
    about = "Terminal-based client, package, and payment tracker",
    long_about = "clinic-ledger tracks the clients, session packages, payments, \
                  expenses, appointments and measurements of a small practice. \
                  Every change is written to an audit log, and an administrator \
                  can undo individual entries."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Client management commands
    #[command(subcommand)]
    Client(clinic_ledger::cli::ClientCommands),

    /// Package and catalog commands
    #[command(subcommand, alias = "pkg")]
    Package(clinic_ledger::cli::PackageCommands),

    /// Payment commands
    #[command(subcommand, alias = "pay")]
    Payment(clinic_ledger::cli::PaymentCommands),

    /// Expense commands
    #[command(subcommand)]
    Expense(clinic_ledger::cli::ExpenseCommands),

    /// Appointment commands
    #[command(subcommand, alias = "appt")]
    Appointment(clinic_ledger::cli::AppointmentCommands),

    /// Measurement commands
    #[command(subcommand)]
    Measurement(clinic_ledger::cli::MeasurementCommands),

    /// Operator and session commands
    #[command(subcommand)]
    User(clinic_ledger::cli::UserCommands),

    /// Audit log commands, including undo
    #[command(subcommand)]
    Log(clinic_ledger::cli::LogCommands),

    /// Data export commands
    #[command(subcommand)]
    Export(clinic_ledger::cli::ExportCommands),

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = ClinicPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    // The signed-in operator, recorded as the actor on every log entry
    let actor: Option<UserId> = Session::load(&paths)?
        .map(|s| s.resolve_user(&storage))
        .transpose()?
        .flatten()
        .map(|u| u.id);

    match cli.command {
        Some(Commands::Client(cmd)) => {
            handle_client_command(&storage, actor, cmd)?;
        }
        Some(Commands::Package(cmd)) => {
            handle_package_command(&storage, actor, cmd)?;
        }
        Some(Commands::Payment(cmd)) => {
            handle_payment_command(&storage, actor, settings.vat_rate_percent, cmd)?;
        }
        Some(Commands::Expense(cmd)) => {
            handle_expense_command(&storage, actor, cmd)?;
        }
        Some(Commands::Appointment(cmd)) => {
            handle_appointment_command(&storage, actor, cmd)?;
        }
        Some(Commands::Measurement(cmd)) => {
            handle_measurement_command(&storage, actor, cmd)?;
        }
        Some(Commands::User(cmd)) => {
            handle_user_command(&storage, &paths, actor, cmd)?;
        }
        Some(Commands::Log(cmd)) => {
            handle_log_command(&storage, &paths, cmd)?;
        }
        Some(Commands::Export(cmd)) => {
            handle_export_command(&storage, cmd)?;
        }
        Some(Commands::Init) => {
            println!("Initializing clinic-ledger at: {}", paths.data_dir().display());
            storage.save_all()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Register an operator with 'clinic user register <name> --role admin',");
            println!("then sign in with 'clinic user login <name>'.");
        }
        Some(Commands::Config) => {
            println!("clinic-ledger Configuration");
            println!("===========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Date format:     {}", settings.date_format);
            println!("  VAT rate:        {}%", settings.vat_rate_percent);
        }
        None => {
            println!("clinic-ledger - Practice bookkeeping with a reversible log");
            println!();
            println!("Run 'clinic --help' for usage information.");
        }
    }

    Ok(())
}
