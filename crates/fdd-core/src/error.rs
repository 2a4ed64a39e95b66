//! Typed error definitions for the FDD client.
//!
//! Provides [`FddError`] for the hard failures of the signing layer:
//! configuration problems, missing local resources, and malformed calls.
//! Signature mismatches and cipher failures are deliberately *not* variants
//! here; they travel as plain values (`bool` / `CipherOutcome`) so callers can
//! branch on them without error handling.
//!
//! All variants implement `std::error::Error` via `thiserror`, so they convert
//! into `anyhow::Error` at I/O boundaries and can be downcast back.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-specific errors for the FDD client.
#[derive(Debug, Error)]
pub enum FddError {
    /// Missing or invalid configuration (e.g. no `app_id` / `app_secret`).
    #[error("config error: {0}")]
    Config(String),

    /// A referenced local file does not exist or is not a regular file.
    #[error("resource not found: {}", path.display())]
    ResourceNotFound {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// A call that cannot proceed without ciphertext got a cipher failure.
    #[error("cipher error: {0}")]
    Cipher(String),

    /// No endpoint with this name exists in the catalogue.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// A required business field was not supplied.
    #[error("endpoint '{endpoint}' requires field '{field}'")]
    MissingField {
        endpoint: &'static str,
        field: String,
    },

    /// A business field the endpoint does not accept was supplied.
    #[error("endpoint '{endpoint}' does not accept field '{field}'")]
    UnexpectedField {
        endpoint: &'static str,
        field: String,
    },

    /// A business field collides with one of the common parameters.
    #[error("field '{0}' is reserved for common parameters")]
    ReservedField(String),

    /// The endpoint's delivery mode does not match the requested operation
    /// (e.g. asking for a redirect URL from a dispatch endpoint).
    #[error("endpoint '{endpoint}' is delivered as {actual}, not {requested}")]
    WrongDelivery {
        endpoint: &'static str,
        actual: &'static str,
        requested: &'static str,
    },

    /// Input could not be parsed (payload files, CLI `key=value` pairs, ...).
    #[error("parse error: {0}")]
    Parse(String),
}
