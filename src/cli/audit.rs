//! Audit CLI commands
//!
//! Admins see every entry; other users only see their own.

use std::fs::File;
use std::path::PathBuf;

use clap::Subcommand;

use super::Context;
use crate::audit::AuditEntry;
use crate::display::format_audit_entries;
use crate::error::{WeldMatchError, WeldMatchResult};
use crate::export::export_audit_csv;
use crate::models::{Role, UserAccount};
use crate::services::UserService;

/// Audit subcommands
#[derive(Subcommand)]
pub enum AuditCommands {
    /// Show recent audit entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only entries by this user (email or ID)
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Export the audit log as CSV (admin only)
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle an audit command
pub fn handle_audit_command(ctx: &Context, cmd: AuditCommands) -> WeldMatchResult<()> {
    let actor = ctx.actor()?;
    let logger = ctx.audit.logger();

    match cmd {
        AuditCommands::List { limit, user } => {
            let subject = match user {
                Some(identifier) => UserService::new(&ctx.storage).require(&identifier)?,
                None if actor.role == Role::Admin => {
                    let entries = logger.read_recent(limit)?;
                    println!("{}", format_audit_entries(&entries));
                    return Ok(());
                }
                None => actor.clone(),
            };

            ensure_may_read(&actor, &subject)?;
            let entries = logger.read_for_user(subject.id)?;
            let start = entries.len().saturating_sub(limit);
            println!("{}", format_audit_entries(&entries[start..]));
        }

        AuditCommands::Export { output } => {
            if actor.role != Role::Admin {
                return Err(WeldMatchError::AccessDenied(
                    "only an admin can export the audit log".into(),
                ));
            }

            let entries: Vec<AuditEntry> = logger.read_all()?;
            let count = match output {
                Some(path) => {
                    let file = File::create(&path).map_err(|e| {
                        WeldMatchError::Export(format!(
                            "Failed to create {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    let count = export_audit_csv(&entries, file)?;
                    eprintln!("Exported {} audit entries to {}", count, path.display());
                    count
                }
                None => export_audit_csv(&entries, std::io::stdout().lock())?,
            };
            tracing::debug!(entries = count, "Audit export finished");
        }
    }

    Ok(())
}

fn ensure_may_read(actor: &UserAccount, subject: &UserAccount) -> WeldMatchResult<()> {
    if actor.role == Role::Admin || actor.id == subject.id {
        Ok(())
    } else {
        Err(WeldMatchError::AccessDenied(
            "only an admin can read another user's audit entries".into(),
        ))
    }
}
