//! Profile CLI commands
//!
//! Create, view, reveal, edit and export welder/employer profiles and
//! certifications. Sensitive columns are masked unless revealed.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use serde_json::Value;

use super::Context;
use crate::display::{format_display_fields, format_record_list};
use crate::error::{WeldMatchError, WeldMatchResult};
use crate::export::{export_record, ExportFormat};
use crate::fields::{self, EntityKind};
use crate::models::FieldMap;
use crate::services::{EncryptedDataService, RevealSession, StepUpGate, UserService};

/// Profile subcommands
#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Create a record
    Create {
        /// Table (welder_profiles, employer_profiles, certifications)
        entity: String,
        /// Column value as name=value (repeatable)
        #[arg(short, long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, Value)>,
        /// Owner email or ID (admins only; defaults to the acting user)
        #[arg(long)]
        owner: Option<String>,
    },
    /// Show a record with sensitive fields masked
    Show {
        entity: String,
        /// Record ID
        record: String,
        /// Reveal these fields in the output (repeatable)
        #[arg(short, long)]
        reveal: Vec<String>,
    },
    /// Print the plaintext value of one field
    Reveal {
        entity: String,
        record: String,
        field: String,
    },
    /// Change, add or remove columns
    Update {
        entity: String,
        record: String,
        #[arg(short, long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, Value)>,
        /// Remove a column (repeatable)
        #[arg(short, long)]
        unset: Vec<String>,
    },
    /// Delete a record
    Delete { entity: String, record: String },
    /// Export a decrypted record
    Export {
        entity: String,
        record: String,
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List records visible to the acting user
    List { entity: String },
}

/// Parse a `name=value` assignment
///
/// Numbers and booleans keep their type when they round-trip exactly, so
/// values with leading zeros stay strings.
pub fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;

    let name = name.trim();
    if name.is_empty() {
        return Err("field name cannot be empty".to_string());
    }

    let value = match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Number(n)) if n.to_string() == raw => Value::Number(n),
            _ => Value::String(raw.to_string()),
        },
    };

    Ok((name.to_string(), value))
}

/// Handle a profile command
pub fn handle_profile_command(ctx: &Context, cmd: ProfileCommands) -> WeldMatchResult<()> {
    let actor = ctx.actor()?;
    let keys = ctx.keyring()?;
    let service = EncryptedDataService::new(&ctx.storage, &keys, &ctx.audit);

    match cmd {
        ProfileCommands::Create { entity, set, owner } => {
            let entity: EntityKind = entity.parse()?;
            let owner = match owner {
                Some(owner) => UserService::new(&ctx.storage).require(&owner)?,
                None => actor.clone(),
            };

            let fields: FieldMap = set.into_iter().collect();
            let record = service.create(entity, owner.id, fields, actor.viewer())?;

            println!("Created {} record: {}", entity, record.id);
            println!("  Owner: {}", owner.email);
            let encrypted = record
                .fields
                .keys()
                .filter(|name| fields::is_sensitive(entity, name))
                .count();
            println!("  Encrypted fields: {}", encrypted);
        }

        ProfileCommands::Show {
            entity,
            record,
            reveal,
        } => {
            let entity: EntityKind = entity.parse()?;
            let found = service.find(entity, &record)?;
            let now = Utc::now();
            let mut session = RevealSession::load(service, &actor, &ctx.settings)?;

            if reveal
                .iter()
                .any(|field| fields::requires_verification(entity, field))
            {
                let password = ctx.password("Password to reveal sensitive fields: ")?;
                session.verify(&password, now)?;
            }

            for field in &reveal {
                session.reveal(entity, found.id, field, now)?;
            }

            let rows = session.display(entity, found.id, now)?;
            print!("{}", format_display_fields(&found, &rows));

            if !reveal.is_empty() {
                println!(
                    "\nRevealed values hide again after {}s.",
                    ctx.settings.reveal.auto_hide_secs
                );
            }
        }

        ProfileCommands::Reveal {
            entity,
            record,
            field,
        } => {
            let entity: EntityKind = entity.parse()?;
            let found = service.find(entity, &record)?;
            let now = Utc::now();
            let mut gate = StepUpGate::load(&actor, &ctx.settings.verification, &ctx.audit)?;

            if fields::requires_verification(entity, &field) {
                let password = ctx.password(&format!("Password to reveal '{}': ", field))?;
                gate.verify(&password, now, &ctx.audit)?;
            }

            let value = service.reveal_field(entity, found.id, &field, actor.viewer(), &gate, now)?;
            println!("{}", value.as_str());
        }

        ProfileCommands::Update {
            entity,
            record,
            set,
            unset,
        } => {
            let entity: EntityKind = entity.parse()?;
            let found = service.find(entity, &record)?;

            let mut changes: FieldMap = set.into_iter().collect();
            for name in unset {
                changes.insert(name, Value::Null);
            }

            if changes.is_empty() {
                println!("No changes specified. Use --set or --unset.");
                return Ok(());
            }

            let updated = service.update(entity, found.id, actor.viewer(), changes)?;
            if updated.updated_at == found.updated_at {
                println!("No changes to {} {}", entity, found.id);
            } else {
                println!("Updated {} {}", entity, found.id);
            }
        }

        ProfileCommands::Delete { entity, record } => {
            let entity: EntityKind = entity.parse()?;
            let found = service.find(entity, &record)?;
            service.delete(entity, found.id, actor.viewer())?;
            println!("Deleted {} {}", entity, found.id);
        }

        ProfileCommands::Export {
            entity,
            record,
            format,
            output,
        } => {
            let entity: EntityKind = entity.parse()?;
            let found = service.find(entity, &record)?;
            let now = Utc::now();

            let mut gate = StepUpGate::load(&actor, &ctx.settings.verification, &ctx.audit)?;
            let password = ctx.password("Password to export: ")?;
            gate.verify(&password, now, &ctx.audit)?;

            match output {
                Some(path) => {
                    let mut file = File::create(&path).map_err(|e| {
                        WeldMatchError::Export(format!(
                            "Failed to create {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    export_record(
                        &service,
                        entity,
                        found.id,
                        actor.viewer(),
                        &gate,
                        format,
                        now,
                        &mut file,
                    )?;
                    file.flush()?;
                    eprintln!("Exported {} {} to {}", entity, found.id, path.display());
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut handle = stdout.lock();
                    export_record(
                        &service,
                        entity,
                        found.id,
                        actor.viewer(),
                        &gate,
                        format,
                        now,
                        &mut handle,
                    )?;
                }
            }
        }

        ProfileCommands::List { entity } => {
            let entity: EntityKind = entity.parse()?;
            let records = service.list_masked(entity, actor.viewer())?;
            println!("{}", format_record_list(&records));
        }
    }

    Ok(())
}
