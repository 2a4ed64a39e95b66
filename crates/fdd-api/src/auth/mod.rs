//! Message authentication for the FDD API.
//!
//! Every outbound call carries a `msg_digest` proving knowledge of the shared
//! `app_secret`, and inbound payloads are checked against the same scheme.
//!
//! - [`canonical`]: business parameters → canonical string
//! - [`digest`]: scheme A (standard) and scheme B (transaction-bound) digests
//! - [`verify`]: recompute and compare digests of inbound payloads
//! - [`cipher`]: Triple-DES for the three-element identity check

pub mod canonical;
pub mod cipher;
pub mod digest;
pub mod verify;

pub use canonical::{SortMode, canonicalize, template_fill_canonical};
pub use cipher::{CipherMethod, CipherOutcome};
pub use digest::{DigestGenerator, DigestScheme};
pub use verify::SignatureVerifier;
