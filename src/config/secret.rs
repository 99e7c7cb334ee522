//! Master secret loading
//!
//! The master secret is the root every per-user field key is derived from.
//! It comes from `WELDMATCH_MASTER_KEY` when set, otherwise from the
//! `master.key` file written by `weldmatch init`.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use super::paths::WeldMatchPaths;
use crate::crypto::{SecureBytes, SecureString, KEY_SIZE};
use crate::error::{WeldMatchError, WeldMatchResult};

/// Environment variable holding the master secret
pub const MASTER_KEY_ENV: &str = "WELDMATCH_MASTER_KEY";

/// Load the master secret from the environment or the key file
pub fn load_master_secret(paths: &WeldMatchPaths) -> WeldMatchResult<SecureString> {
    if let Ok(secret) = std::env::var(MASTER_KEY_ENV) {
        let secret = SecureString::new(secret.trim());
        if !secret.is_empty() {
            debug!("Using master secret from {}", MASTER_KEY_ENV);
            return Ok(secret);
        }
    }

    let path = paths.master_key_file();
    if !path.exists() {
        return Err(WeldMatchError::Config(format!(
            "No master secret found; set {} or run 'weldmatch init'",
            MASTER_KEY_ENV
        )));
    }

    let contents = SecureString::new(std::fs::read_to_string(&path).map_err(|e| {
        WeldMatchError::Io(format!("Failed to read master key file: {}", e))
    })?);
    let secret = SecureString::new(contents.trim());
    if secret.is_empty() {
        return Err(WeldMatchError::Config("Master key file is empty".into()));
    }

    Ok(secret)
}

/// Create a random master secret file unless one already exists
///
/// Returns `true` when a new file was written. The file is created
/// exclusively and, on unix, with mode 0600 from the start.
pub fn ensure_master_secret(paths: &WeldMatchPaths) -> WeldMatchResult<bool> {
    paths.ensure_directories()?;
    let path = paths.master_key_file();

    let mut file = match create_private(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(WeldMatchError::Io(format!(
                "Failed to create master key file: {}",
                e
            )))
        }
    };

    let mut bytes = SecureBytes::zeroed(KEY_SIZE);
    OsRng.fill_bytes(bytes.as_mut_slice());
    let secret = SecureString::new(STANDARD.encode(bytes.as_slice()));

    file.write_all(secret.as_str().as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| WeldMatchError::Io(format!("Failed to write master key file: {}", e)))?;

    info!(path = %path.display(), "Generated new master secret");
    Ok(true)
}

fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
