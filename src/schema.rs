use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use thiserror::Error;

use crate::prng::RadixGenerator;

pub const SAFE_NAME: &str = "safe";
pub const ALPHANUMERIC_NAME: &str = "alpha";

pub const DEFAULT_SIZE: u32 = 18;
pub const MAX_SIZE: u32 = 128;

const SAFE_MIN_SIZE: u32 = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown schema name {0:?}")]
    UnknownSchema(String),

    #[error("schema {name} requires a size within [{min},{max}], got {size}")]
    InvalidSize {
        name: &'static str,
        size: i64,
        min: u32,
        max: u32,
    },

    #[error("unknown schema format version {0}")]
    UnknownVersion(u32),

    #[error("malformed schema {0:?} (expected name or name:size)")]
    Malformed(String),
}

/// Version of the stored schema format.
///
/// Only validation differs between versions: `V1` required alphanumeric
/// passwords of at least 4 characters, `V2` accepts 3. Passwords are derived
/// the same way under both.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatVersion {
    V1,
    #[default]
    V2,
}

impl FormatVersion {
    pub const CURRENT: FormatVersion = FormatVersion::V2;

    pub fn as_u32(self) -> u32 {
        match self {
            FormatVersion::V1 => 1,
            FormatVersion::V2 => 2,
        }
    }

    fn alphanumeric_min_size(self) -> u32 {
        match self {
            FormatVersion::V1 => 4,
            FormatVersion::V2 => 3,
        }
    }
}

impl TryFrom<u32> for FormatVersion {
    type Error = SchemaError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FormatVersion::V1),
            2 => Ok(FormatVersion::V2),
            other => Err(SchemaError::UnknownVersion(other)),
        }
    }
}

/// Character class composition of a schema.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Upper and lower case letters, digits and special characters.
    Safe,
    /// Upper and lower case letters and digits.
    Alphanumeric,
}

impl SchemaKind {
    pub fn name(self) -> &'static str {
        match self {
            SchemaKind::Safe => SAFE_NAME,
            SchemaKind::Alphanumeric => ALPHANUMERIC_NAME,
        }
    }

    fn min_size(self, version: FormatVersion) -> u32 {
        match self {
            SchemaKind::Safe => SAFE_MIN_SIZE,
            SchemaKind::Alphanumeric => version.alphanumeric_min_size(),
        }
    }
}

/// Named password composition policy with a target length.
///
/// The kind fixes the character classes, how many of each are drawn and in
/// which order. That order is frozen: changing it changes every password ever
/// derived with the schema.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Schema {
    kind: SchemaKind,
    size: u32,
}

impl Schema {
    /// Validates `size` against the kind's bounds under `version`.
    pub fn new(kind: SchemaKind, size: u32, version: FormatVersion) -> Result<Self, SchemaError> {
        check_size(kind.name(), i64::from(size), kind.min_size(version))?;
        Ok(Self { kind, size })
    }

    pub fn safe(size: u32) -> Result<Self, SchemaError> {
        Self::new(SchemaKind::Safe, size, FormatVersion::CURRENT)
    }

    /// Alphanumeric schema under the current format.
    pub fn alphanumeric(size: u32) -> Result<Self, SchemaError> {
        Self::new(SchemaKind::Alphanumeric, size, FormatVersion::CURRENT)
    }

    /// Builds a schema from its stored name and size. A missing size means
    /// [`DEFAULT_SIZE`].
    pub fn from_name(
        name: &str,
        size: Option<i64>,
        version: FormatVersion,
    ) -> Result<Self, SchemaError> {
        let kind = match name {
            SAFE_NAME => SchemaKind::Safe,
            ALPHANUMERIC_NAME => SchemaKind::Alphanumeric,
            other => return Err(SchemaError::UnknownSchema(other.to_string())),
        };
        let size = size.unwrap_or(i64::from(DEFAULT_SIZE));
        check_size(kind.name(), size, kind.min_size(version))?;
        // within [min, MAX_SIZE] after the check
        Ok(Self {
            kind,
            size: size as u32,
        })
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Derives a password from a seed.
    pub fn generate(&self, seed: BigUint) -> String {
        self.generate_with(&mut RadixGenerator::new(seed))
    }

    /// Derives a password by drawing from `gen`.
    ///
    /// Class counts are drawn first (upper, digit, then special for `Safe`),
    /// each in `[max(1, size/8), 1 + (size-1)/4]`; lowercase letters fill the
    /// rest. Characters are then drawn block by block in that same class order
    /// and the draft is shuffled with one permutation draw.
    pub fn generate_with(&self, gen: &mut RadixGenerator) -> String {
        let size = self.size;
        let min = (size / 8).max(1);
        let max = 1 + (size - 1) / 4;

        let upper = gen.next_in_range(min, max);
        let digit = gen.next_in_range(min, max);
        let special = match self.kind {
            SchemaKind::Safe => {
                let drawn = gen.next_in_range(min, max);
                // Only size 5 can overshoot (2 + 2 + 2); keep the length exact.
                drawn.min(size - upper - digit)
            }
            SchemaKind::Alphanumeric => 0,
        };
        let lower = size - upper - digit - special;

        let mut draft = String::with_capacity(size as usize);
        draft.extend((0..upper).map(|_| gen.next_upper()));
        draft.extend((0..digit).map(|_| gen.next_digit()));
        draft.extend((0..special).map(|_| gen.next_special()));
        draft.extend((0..lower).map(|_| gen.next_lower()));

        gen.next_permutation(&draft)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            kind: SchemaKind::Safe,
            size: DEFAULT_SIZE,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name(), self.size())
    }
}

/// Parses `name` or `name:size` under the current format.
impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, size) = match s.split_once(':') {
            Some((name, size)) => {
                let size = size
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| SchemaError::Malformed(s.to_string()))?;
                (name.trim(), Some(size))
            }
            None => (s.trim(), None),
        };
        Schema::from_name(name, size, FormatVersion::CURRENT)
    }
}

fn check_size(name: &'static str, size: i64, min: u32) -> Result<(), SchemaError> {
    if size < i64::from(min) || size > i64::from(MAX_SIZE) {
        return Err(SchemaError::InvalidSize {
            name,
            size,
            min,
            max: MAX_SIZE,
        });
    }
    Ok(())
}
