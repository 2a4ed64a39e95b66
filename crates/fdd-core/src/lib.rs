//! # fdd-core
//!
//! Shared foundation for the FDD e-contract client, providing:
//!
//! - **Types** (`types`): credentials, timestamps, business parameter sets
//! - **Configuration** (`config`): JSON config with serde defaults
//! - **Error types** (`error`): domain-specific `FddError` via thiserror
//! - **Time utilities** (`time_util`): `YYYYMMDDHHMMSS` protocol timestamps
//! - **Logging** (`logging`): tracing-based structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod time_util;
pub mod types;

// Re-export types at crate root for convenience.
pub use types::*;
