//! Setup and maintenance commands: init, config, fields, migrate

use super::Context;
use crate::config::{ensure_master_secret, Settings, WeldMatchPaths, MASTER_KEY_ENV};
use crate::display::format_field_registry;
use crate::error::{WeldMatchError, WeldMatchResult};
use crate::fields::EntityKind;
use crate::models::Role;
use crate::services::EncryptedDataService;

/// Create the data directory, settings and master key
pub fn handle_init(paths: &WeldMatchPaths) -> WeldMatchResult<()> {
    println!("Initializing WeldMatch at: {}", paths.base_dir().display());
    paths.ensure_directories()?;

    let settings = Settings::load_or_create(paths)?;
    settings.save(paths)?;

    if std::env::var(MASTER_KEY_ENV).is_ok() {
        println!("Using master secret from {}; no key file written.", MASTER_KEY_ENV);
    } else if ensure_master_secret(paths)? {
        println!("Generated master key: {}", paths.master_key_file().display());
        println!("Back it up. Encrypted fields cannot be recovered without it.");
    } else {
        println!("Master key already exists: {}", paths.master_key_file().display());
    }

    println!("Initialization complete!");
    println!();
    println!("Run 'weldmatch user add <email> --role admin' to create the first admin.");
    Ok(())
}

/// Show paths and settings
pub fn handle_config(ctx: &Context) -> WeldMatchResult<()> {
    let settings = &ctx.settings;

    println!("WeldMatch Configuration");
    println!("=======================");
    println!("Base directory:  {}", ctx.paths.base_dir().display());
    println!("Data directory:  {}", ctx.paths.data_dir().display());
    println!("Audit log:       {}", ctx.paths.audit_log().display());
    println!(
        "Master key:      {}",
        if std::env::var(MASTER_KEY_ENV).is_ok() {
            format!("from {}", MASTER_KEY_ENV)
        } else if ctx.paths.master_key_file().exists() {
            ctx.paths.master_key_file().display().to_string()
        } else {
            "not configured".to_string()
        }
    );
    println!();
    println!("Settings:");
    println!(
        "  Key derivation:        argon2id m={}KiB t={} p={}",
        settings.key_params.memory_cost,
        settings.key_params.time_cost,
        settings.key_params.parallelism
    );
    println!("  Auto-hide:             {}s", settings.reveal.auto_hide_secs);
    println!("  Verification window:   {}s", settings.verification.window_secs);
    println!(
        "  Lockout:               {} attempts, {}s",
        settings.verification.max_attempts, settings.verification.lockout_secs
    );
    Ok(())
}

/// List the field registry
pub fn handle_fields(entity: Option<String>) -> WeldMatchResult<()> {
    let entities = match entity {
        Some(name) => vec![name.parse::<EntityKind>()?],
        None => EntityKind::all().to_vec(),
    };
    print!("{}", format_field_registry(&entities));
    Ok(())
}

/// Encrypt legacy plaintext in sensitive columns (admin only)
pub fn handle_migrate(ctx: &Context, entity: Option<String>) -> WeldMatchResult<()> {
    let actor = ctx.actor()?;
    if actor.role != Role::Admin {
        return Err(WeldMatchError::AccessDenied(
            "only an admin can migrate records".into(),
        ));
    }

    let entities = match entity {
        Some(name) => vec![name.parse::<EntityKind>()?],
        None => EntityKind::all().to_vec(),
    };

    let keys = ctx.keyring()?;
    let service = EncryptedDataService::new(&ctx.storage, &keys, &ctx.audit);

    for entity in entities {
        let count = service.encrypt_plaintext_fields(entity)?;
        println!("{}: encrypted {} record(s)", entity, count);
    }
    Ok(())
}
