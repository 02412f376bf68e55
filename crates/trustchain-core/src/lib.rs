//! # trustchain-core
//!
//! Configuration types shared by the trustchain crates.

// Configuration types shared across all trustchain crates
pub mod config;

pub use config::{ConfigError, IssuerConfig, TrustChainConfig, parse_duration};
