//! CLI command implementations for trustchain.

pub mod keys;
pub mod token;
