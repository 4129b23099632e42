use thiserror::Error;

pub const DEFAULT_LOG_COST: u8 = 14;
pub const DEFAULT_BLOCK_SIZE: u32 = 2;
pub const DEFAULT_PARALLELISM: u32 = 1;
pub const DEFAULT_EXTRA_CODE: &str = "";

/// Upper bound (exclusive) on `block_size * parallelism`.
pub const MAX_BLOCK_PRODUCT: u64 = 1 << 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("log cost must be within [1,63], got {0}")]
    InvalidLogCost(u8),

    #[error("block size must be > 0")]
    ZeroBlockSize,

    #[error("parallelism must be > 0")]
    ZeroParallelism,

    #[error("block size * parallelism must be < 2^30, got {0}")]
    BlockProductTooLarge(u64),
}

/// Cost parameters of the key derivation plus an extra code appended to the
/// master secret.
///
/// Built once per derivation and never mutated; two configurations are the
/// same when all four fields are.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Configuration {
    log_cost: u8,
    block_size: u32,
    parallelism: u32,
    extra_code: String,
}

impl Configuration {
    /// Validates invariants:
    ///
    /// - `1 ≤ log_cost ≤ 63`
    /// - `block_size > 0` and `parallelism > 0`
    /// - `block_size * parallelism < 2^30`
    pub fn new(
        log_cost: u8,
        block_size: u32,
        parallelism: u32,
        extra_code: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        if log_cost == 0 || log_cost > 63 {
            return Err(ConfigError::InvalidLogCost(log_cost));
        }
        if block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if parallelism == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        let product = u64::from(block_size) * u64::from(parallelism);
        if product >= MAX_BLOCK_PRODUCT {
            return Err(ConfigError::BlockProductTooLarge(product));
        }

        Ok(Self {
            log_cost,
            block_size,
            parallelism,
            extra_code: extra_code.into(),
        })
    }

    /// Default costs with the given extra code.
    pub fn with_code(extra_code: impl Into<String>) -> Self {
        Self {
            extra_code: extra_code.into(),
            ..Self::default()
        }
    }

    /// Base 2 logarithm of the scrypt cost `N`.
    pub fn log_cost(&self) -> u8 {
        self.log_cost
    }

    /// scrypt `r`.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// scrypt `p`.
    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn extra_code(&self) -> &str {
        &self.extra_code
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_cost: DEFAULT_LOG_COST,
            block_size: DEFAULT_BLOCK_SIZE,
            parallelism: DEFAULT_PARALLELISM,
            extra_code: DEFAULT_EXTRA_CODE.to_string(),
        }
    }
}
