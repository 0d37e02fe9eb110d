//! Sender keypair loading
//!
//! The signing key is an opaque capability from the core's point of view:
//! it is loaded here, used to sign exactly one transaction, and never
//! persisted or logged.

use std::path::PathBuf;

use solana_sdk::signature::Keypair;

use crate::error::{OrbitError, Result};

/// Load the sender keypair from an explicit path or the default Solana CLI
/// location (`~/.config/solana/id.json`)
///
/// Accepts the standard JSON byte-array format as well as raw 64-byte files.
pub fn load_sender_keypair(sender_path: Option<&str>) -> Result<Keypair> {
    let path = match sender_path {
        Some(p) => PathBuf::from(p),
        None => {
            let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
            home.join(".config").join("solana").join("id.json")
        }
    };

    if !path.exists() {
        return Err(OrbitError::configuration(format!(
            "sender keypair file not found at {}. Provide one with --sender",
            path.display()
        )));
    }

    let bytes = std::fs::read(&path).map_err(|e| {
        OrbitError::configuration(format!("failed to read keypair {}: {e}", path.display()))
    })?;

    let secret: Vec<u8> = if bytes.len() == 64 {
        bytes
    } else {
        serde_json::from_slice(&bytes).map_err(|e| {
            OrbitError::configuration(format!(
                "failed to parse keypair JSON {}: {e}",
                path.display()
            ))
        })?
    };

    if secret.len() != 64 {
        return Err(OrbitError::configuration(format!(
            "invalid keypair length: expected 64 bytes, got {}",
            secret.len()
        )));
    }
    if secret.iter().all(|&b| b == 0) {
        return Err(OrbitError::configuration("invalid keypair: all-zero key rejected"));
    }

    Keypair::try_from(secret.as_slice())
        .map_err(|e| OrbitError::configuration(format!("invalid keypair bytes: {e}")))
}
