use crate::config::{ConfigError, Configuration};
use crate::kdf;
use crate::schema::{FormatVersion, Schema, SchemaError};
use thiserror::Error;
use zeroize::Zeroize;

#[derive(Error, Debug)]
pub enum DeriveError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Kdf(#[from] kdf::KdfError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl DeriveError {
    /// True for errors caused by the cost parameters rather than by the
    /// schema or stored data.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DeriveError::Config(_) | DeriveError::Kdf(_))
    }
}

/// Derives the password for `domain` following `schema`.
///
/// Pure function of its inputs: the same four arguments always give the same
/// password. Runs scrypt once, which dominates the cost of the call; there is
/// no partial result on failure.
pub fn derive(
    schema: &Schema,
    domain: &str,
    master: &str,
    config: &Configuration,
) -> Result<String, DeriveError> {
    tracing::debug!(schema = %schema, "deriving password");
    tracing::trace!(domain, "derivation domain");

    let mut key = kdf::derive_key(master, domain, config)?;
    let seed = kdf::seed_from_bytes(&key);
    // Zeroize key ASAP after the seed is built
    key.zeroize();

    let password = schema.generate(seed);

    debug_assert_eq!(password.chars().count(), schema.size() as usize);
    Ok(password)
}

/// Like [`derive`], for a schema given by stored name and optional size.
///
/// An unknown name or an out of bounds size is reported as
/// [`DeriveError::Schema`]; nothing is substituted.
pub fn derive_named(
    schema_name: &str,
    size: Option<i64>,
    domain: &str,
    master: &str,
    config: &Configuration,
) -> Result<String, DeriveError> {
    let schema = Schema::from_name(schema_name, size, FormatVersion::CURRENT)?;
    derive(&schema, domain, master, config)
}
