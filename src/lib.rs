//! Deterministic site password derivation.
//!
//! A master secret, a domain and a [`schema::Schema`] are stretched with
//! scrypt into a 64-byte key. The key is read as one large integer which is
//! then decoded digit by digit, in radices chosen by the schema, into the
//! password characters and a final permutation of them.

pub mod config;
pub mod generator;
pub mod history;
pub mod kdf;
pub mod permutation;
pub mod prng;
pub mod schema;

pub use config::Configuration;
pub use generator::{derive, DeriveError};
pub use history::{Entry, History};
pub use schema::{FormatVersion, Schema};
