//! User and session CLI commands

use clap::Subcommand;

use crate::config::paths::ClinicPaths;
use crate::error::{ClinicError, ClinicResult};
use crate::models::{Role, UserId};
use crate::services::UserService;
use crate::session::Session;
use crate::storage::Storage;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new operator
    Register {
        /// Operator name
        name: String,
        /// Role (admin, staff)
        #[arg(short, long, default_value = "staff")]
        role: String,
    },
    /// List operators
    List,
    /// Sign in as an operator
    Login {
        /// Operator name
        name: String,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Whoami,
}

/// Handle a user command
pub fn handle_user_command(
    storage: &Storage,
    paths: &ClinicPaths,
    actor: Option<UserId>,
    cmd: UserCommands,
) -> ClinicResult<()> {
    let users = UserService::new(storage, actor);

    match cmd {
        UserCommands::Register { name, role } => {
            let role = Role::parse(&role).ok_or_else(|| {
                ClinicError::Validation(format!(
                    "Invalid role: '{}'. Valid roles: admin, staff",
                    role
                ))
            })?;

            // The very first operator must be able to administer the practice
            let role = if users.any_registered()? {
                role
            } else {
                Role::Admin
            };

            let user = users.register(&name, role)?;
            println!("Registered {} as {}", user.name, user.role);
        }

        UserCommands::List => {
            let list = users.list()?;
            if list.is_empty() {
                println!("No operators registered.");
            }
            for user in list {
                println!("{}  {}  {}", user.id, user.name, user.role);
            }
        }

        UserCommands::Login { name } => {
            let user = users.find_by_name(&name)?.ok_or(ClinicError::NotFound {
                entity_type: "User",
                identifier: name.clone(),
            })?;

            Session::start(&user).save(paths)?;
            println!("Signed in as {} ({})", user.name, user.role);
        }

        UserCommands::Logout => {
            Session::clear(paths)?;
            println!("Signed out.");
        }

        UserCommands::Whoami => match Session::load(paths)? {
            Some(session) => match session.resolve_user(storage)? {
                Some(user) => println!("{} ({})", user.name, user.role),
                None => println!("Stale session: user no longer exists."),
            },
            None => println!("Not signed in."),
        },
    }

    Ok(())
}
