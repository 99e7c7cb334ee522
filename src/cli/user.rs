//! User CLI commands

use clap::Subcommand;

use super::Context;
use crate::display::format_user_list;
use crate::error::{WeldMatchError, WeldMatchResult};
use crate::models::Role;
use crate::services::UserService;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Add {
        /// Login email
        email: String,
        /// Role (welder, employer, admin)
        #[arg(short, long, default_value = "welder")]
        role: String,
    },
    /// List all users (admin only)
    List,
}

/// Handle a user command
pub fn handle_user_command(ctx: &Context, cmd: UserCommands) -> WeldMatchResult<()> {
    let service = UserService::new(&ctx.storage);

    match cmd {
        UserCommands::Add { email, role } => {
            let role: Role = role.parse()?;

            // The first user may bootstrap an admin; after that only admins can
            if role == Role::Admin && !service.list()?.is_empty() {
                let actor = ctx.actor()?;
                if actor.role != Role::Admin {
                    return Err(WeldMatchError::AccessDenied(
                        "only an admin can create another admin".into(),
                    ));
                }
            }

            let password = ctx.new_password()?;
            let user = service.create(&email, role, &password)?;

            println!("Created user: {}", user.email);
            println!("  Role: {}", user.role);
            println!("  ID: {}", user.id);
        }

        UserCommands::List => {
            let actor = ctx.actor()?;
            if actor.role != Role::Admin {
                return Err(WeldMatchError::AccessDenied(
                    "only an admin can list users".into(),
                ));
            }
            print!("{}", format_user_list(&service.list()?));
        }
    }

    Ok(())
}
