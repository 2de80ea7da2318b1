//! Hash-based ID generation for catalog records.
//!
//! Record ids are `{kind-prefix}-{hash}`, e.g. `svc-a3f8` for a service,
//! `sys-k2d9` for a system, `own-b7c1` for an owner. The hash is a base36
//! encoding of a SHA256 over the record's name, description, and a
//! timestamp, with a nonce retry loop for collision resistance. Hash length
//! adapts to catalog size (4 characters up to 500 records, 5 up to 1500,
//! 6 beyond) so ids stay short while the collision space keeps pace.

use crate::domain::EntityKind;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Unable to generate a unique ID after exhausting all nonces and length increases
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of nonces tried before giving up
        attempts: u32,
    },

    /// Base36 encoding failed
    #[error("Base36 encoding failed: {0}")]
    EncodingFailed(String),

    /// Invalid length parameter
    #[error("Length must be greater than 0")]
    InvalidLength,
}

/// Configuration for ID generation
#[derive(Debug, Clone)]
pub struct IdGeneratorConfig {
    /// Current number of records in the catalog (drives adaptive length)
    pub catalog_size: usize,
}

/// The id prefix for a given entity kind.
#[must_use]
pub fn kind_prefix(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Service => "svc",
        EntityKind::System => "sys",
        EntityKind::Owner => "own",
    }
}

/// Hash-based ID generator with collision detection.
///
/// The generator tracks every id it has handed out (plus any registered
/// existing ids) in a hash set. For long-lived processes, recreate the
/// generator periodically; for a CLI that reloads per invocation the memory
/// held here is negligible.
pub struct IdGenerator {
    config: IdGeneratorConfig,
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a new ID generator with the given configuration
    #[must_use]
    pub fn new(config: IdGeneratorConfig) -> Self {
        Self {
            config,
            existing_ids: HashSet::new(),
        }
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: String) {
        self.existing_ids.insert(id);
    }

    /// The catalog size this generator was configured with.
    #[must_use]
    pub fn catalog_size(&self) -> usize {
        self.config.catalog_size
    }

    /// Generate a new unique ID for a record of the given kind.
    ///
    /// # Errors
    ///
    /// Returns an error if no unique ID can be produced after trying all
    /// nonces at the adaptive length and one longer fallback length.
    pub fn generate(
        &mut self,
        kind: EntityKind,
        name: &str,
        description: &str,
    ) -> Result<String, IdGenerationError> {
        let id_length = self.adaptive_length();

        for nonce in 0..MAX_NONCE {
            let id = self.generate_hash_id(kind, name, description, nonce, id_length)?;

            if !self.existing_ids.contains(&id) {
                if nonce > 0 {
                    debug!(
                        nonce,
                        id_length, "Generated unique ID after {} collision retries", nonce
                    );
                }
                self.existing_ids.insert(id.clone());
                return Ok(id);
            }
        }

        // All nonces collide at this length; try once more, one char longer.
        if id_length < 6 {
            warn!(
                id_length,
                max_nonce = MAX_NONCE,
                "All nonces exhausted, increasing ID length to {}",
                id_length + 1
            );
            let longer_id = self.generate_hash_id(kind, name, description, 0, id_length + 1)?;
            self.existing_ids.insert(longer_id.clone());
            return Ok(longer_id);
        }

        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_NONCE,
        })
    }

    /// Generate a hash-based ID with the given parameters
    fn generate_hash_id(
        &self,
        kind: EntityKind,
        name: &str,
        description: &str,
        nonce: u32,
        length: usize,
    ) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp();
        let content = format!("{kind}|{name}|{description}|{timestamp}|{nonce}");

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let hash_bytes = hasher.finalize();

        let hash_str = encode_base36(&hash_bytes[..8], length)?;

        Ok(format!("{}-{}", kind_prefix(kind), hash_str))
    }

    /// Determine ID length based on catalog size
    ///
    /// - 0-500 records: 4 chars
    /// - 500-1,500: 5 chars
    /// - 1,500+: 6 chars
    fn adaptive_length(&self) -> usize {
        match self.config.catalog_size {
            0..=500 => 4,
            501..=1500 => 5,
            _ => 6,
        }
    }
}

/// Encode bytes as base36 string.
///
/// The input is limited to the first 8 bytes of the hash by the caller so
/// the accumulated value fits a u64; wrapping arithmetic keeps the output
/// deterministic either way.
///
/// # Errors
///
/// Returns an error if length is 0 or if UTF-8 conversion fails.
fn encode_base36(bytes: &[u8], length: usize) -> Result<String, IdGenerationError> {
    if length == 0 {
        return Err(IdGenerationError::InvalidLength);
    }

    let mut num: u64 = 0;
    for &byte in bytes {
        num = num.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut result = Vec::new();
    let mut n = num;

    while result.len() < length {
        let remainder = (n % 36) as usize;
        result.push(BASE36_CHARS[remainder]);
        n /= 36;
    }

    result.reverse();

    String::from_utf8(result)
        .map_err(|e| IdGenerationError::EncodingFailed(format!("UTF-8 conversion failed: {e}")))
}

/// Validate a record id format: `{svc|sys|own}-{4-6 alphanumerics}`.
#[must_use]
pub fn validate_id(id: &str) -> bool {
    let Some((prefix, hash)) = id.split_once('-') else {
        return false;
    };

    if !matches!(prefix, "svc" | "sys" | "own") {
        return false;
    }

    if hash.len() < 4 || hash.len() > 6 {
        return false;
    }

    hash.chars().all(|c| c.is_ascii_alphanumeric())
}
