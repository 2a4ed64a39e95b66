//! Credentials and timestamps: the fixed inputs of every digest.

use std::fmt;

use crate::time_util;

/// Application credentials issued by the remote platform.
///
/// `app_secret` is a shared secret; it is hashed into digests but never sent
/// on the wire, and `Debug` output redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    app_id: String,
    app_secret: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    /// Public application identifier (the `app_id` common parameter).
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Shared secret.
    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

/// A protocol timestamp (`YYYYMMDDHHMMSS`).
///
/// Outbound requests use a timestamp captured once when the client is built.
/// Inbound verification uses whatever the counterpart declared, carried
/// verbatim via [`Timestamp::from_raw`] even if it is empty or malformed: the
/// digest must be recomputed over exactly what was received.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp(String);

impl Timestamp {
    /// Current local time.
    pub fn now() -> Self {
        Self(time_util::now_timestamp())
    }

    /// Wrap a timestamp string without validation.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` if the value has the 14-digit protocol shape.
    pub fn is_well_formed(&self) -> bool {
        time_util::is_timestamp_shaped(&self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
