//! `msg_digest` computation.
//!
//! Two schemes coexist, selected per endpoint through [`DigestScheme`]:
//!
//! 1. **Standard** (scheme A): binds the full canonical string:
//!
//!    ```text
//!    base64( UPPER( sha1( app_id
//!                         · UPPER(md5(timestamp))
//!                         · UPPER(sha1(app_secret · canonical))
//!                         · extra ) ) )
//!    ```
//!
//! 2. **Transaction-bound** (scheme B): binds a transaction / customer pair
//!    and nothing else:
//!
//!    ```text
//!    base64( UPPER( sha1( app_id
//!                         · UPPER(md5(transaction_id · timestamp))
//!                         · UPPER(sha1(app_secret · customer_id)) ) ) )
//!    ```
//!
//! Hash outputs are hex strings; base64 is applied to the uppercase hex text
//! with the standard padded alphabet. The timestamp is always an explicit
//! argument: signing and verification never share a stored value.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use fdd_core::{Credentials, Timestamp};
use md5::{Digest as _, Md5};
use sha1::Sha1;
use tracing::debug;

/// Which digest formula an endpoint uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestScheme {
    /// Scheme A over a canonical string.
    Standard,
    /// Scheme B over `(transaction_id, customer_id)`.
    TransactionBound,
}

impl DigestScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::TransactionBound => "transaction-bound",
        }
    }
}

/// Computes digests for one set of credentials.
///
/// Holds no mutable state; a single generator can serve any number of
/// concurrent signing and verification calls.
#[derive(Debug, Clone, Copy)]
pub struct DigestGenerator<'a> {
    credentials: &'a Credentials,
}

impl<'a> DigestGenerator<'a> {
    pub fn new(credentials: &'a Credentials) -> Self {
        Self { credentials }
    }

    /// Scheme A with an empty trailing segment.
    pub fn standard(&self, timestamp: &Timestamp, canonical: &str) -> String {
        self.standard_with_extra(timestamp, canonical, "")
    }

    /// Scheme A with an explicit trailing segment appended inside the outer
    /// hash.
    pub fn standard_with_extra(&self, timestamp: &Timestamp, canonical: &str, extra: &str) -> String {
        debug!(scheme = "standard", timestamp = %timestamp, "computing msg_digest");
        let inner = format!(
            "{}{}{}{}",
            self.credentials.app_id(),
            md5_upper(timestamp.as_str()),
            sha1_upper(&format!("{}{}", self.credentials.app_secret(), canonical)),
            extra,
        );
        BASE64.encode(sha1_upper(&inner))
    }

    /// Scheme B.
    pub fn transaction_bound(
        &self,
        timestamp: &Timestamp,
        transaction_id: &str,
        customer_id: &str,
    ) -> String {
        debug!(scheme = "transaction-bound", timestamp = %timestamp, "computing msg_digest");
        let inner = format!(
            "{}{}{}",
            self.credentials.app_id(),
            md5_upper(&format!("{transaction_id}{timestamp}")),
            sha1_upper(&format!("{}{}", self.credentials.app_secret(), customer_id)),
        );
        BASE64.encode(sha1_upper(&inner))
    }
}

/// Uppercase hex MD5 of `data`.
pub fn md5_upper(data: &str) -> String {
    hex::encode_upper(Md5::digest(data.as_bytes()))
}

/// Uppercase hex SHA-1 of `data`.
pub fn sha1_upper(data: &str) -> String {
    hex::encode_upper(Sha1::digest(data.as_bytes()))
}
