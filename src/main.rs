use anyhow::Result;
use clap::{Parser, Subcommand};

use weldmatch::cli::{
    handle_audit_command, handle_config, handle_fields, handle_init, handle_migrate,
    handle_profile_command, handle_user_command, AuditCommands, Context, ProfileCommands,
    UserCommands, PASSWORD_ENV, USER_ENV,
};
use weldmatch::config::WeldMatchPaths;

#[derive(Parser)]
#[command(
    name = "weldmatch",
    version,
    about = "Field-level encryption and access control for WeldMatch profile data",
    long_about = "Stores welder profiles, employer profiles and certifications with \
                  their sensitive fields encrypted per user. Values are masked by \
                  default, revealed only to their owner or an admin, and every \
                  reveal, edit and export is audited."
)]
struct Cli {
    /// Act as this user (email or ID)
    #[arg(long = "as", global = true, env = USER_ENV, value_name = "USER")]
    acting_as: Option<String>,

    /// Password for step-up verification (prompted when omitted)
    #[arg(long, global = true, env = PASSWORD_ENV, hide_env_values = true)]
    password: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and master key
    Init,

    /// Show current configuration and paths
    Config,

    /// Show the sensitive field registry
    Fields {
        /// Only this table
        entity: Option<String>,
    },

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Profile and certification records
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Audit log commands
    #[command(subcommand)]
    Audit(AuditCommands),

    /// Encrypt sensitive fields still stored as plaintext
    Migrate {
        /// Only this table
        entity: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    weldmatch::logging::init(cli.verbose);

    let paths = WeldMatchPaths::new()?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("WeldMatch - encrypted profile data");
            println!();
            println!("Run 'weldmatch --help' for usage information.");
            return Ok(());
        }
    };

    match command {
        Commands::Init => handle_init(&paths)?,
        Commands::Fields { entity } => handle_fields(entity)?,
        Commands::Config => {
            let ctx = Context::load(paths, cli.acting_as, cli.password)?;
            handle_config(&ctx)?;
        }
        Commands::User(cmd) => {
            let ctx = Context::load(paths, cli.acting_as, cli.password)?;
            handle_user_command(&ctx, cmd)?;
        }
        Commands::Profile(cmd) => {
            let ctx = Context::load(paths, cli.acting_as, cli.password)?;
            handle_profile_command(&ctx, cmd)?;
        }
        Commands::Audit(cmd) => {
            let ctx = Context::load(paths, cli.acting_as, cli.password)?;
            handle_audit_command(&ctx, cmd)?;
        }
        Commands::Migrate { entity } => {
            let ctx = Context::load(paths, cli.acting_as, cli.password)?;
            handle_migrate(&ctx, entity)?;
        }
    }

    Ok(())
}
