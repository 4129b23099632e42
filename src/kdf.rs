use num_bigint::BigUint;
use scrypt::{scrypt, Params};
use thiserror::Error;
use zeroize::Zeroize;

use crate::config::Configuration;

pub const KDF_OUT_LEN: usize = 64;

/// Errors that can occur during key derivation
#[derive(Error, Debug)]
pub enum KdfError {
    #[error("invalid KDF parameters: {0}")]
    InvalidParams(String),

    #[error("scrypt error: {0}")]
    Scrypt(String),
}

/// Stretches `master ‖ extra code` with scrypt, salted by the domain bytes.
/// Returns the 64-byte key. Zeroizes the password buffer.
pub fn derive_key(
    master: &str,
    domain: &str,
    config: &Configuration,
) -> Result<[u8; KDF_OUT_LEN], KdfError> {
    let params = Params::new(
        config.log_cost(),
        config.block_size(),
        config.parallelism(),
        KDF_OUT_LEN,
    )
    .map_err(|e| KdfError::InvalidParams(e.to_string()))?;

    let code = config.extra_code().as_bytes();
    let mut password = Vec::with_capacity(master.len() + code.len());
    password.extend_from_slice(master.as_bytes());
    password.extend_from_slice(code);

    tracing::debug!(
        log_n = config.log_cost(),
        r = config.block_size(),
        p = config.parallelism(),
        "running scrypt"
    );

    let mut out = [0u8; KDF_OUT_LEN];
    let result = scrypt(&password, domain.as_bytes(), &params, &mut out)
        .map_err(|e| KdfError::Scrypt(e.to_string()));

    password.zeroize();
    result?;

    Ok(out)
}

/// Reads `bytes` as one unsigned integer, least significant byte first.
pub fn seed_from_bytes(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_le(bytes)
}
