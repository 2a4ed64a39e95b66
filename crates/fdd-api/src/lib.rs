//! # fdd-api
//!
//! Signed request layer for the FDD e-contract / e-signature HTTP API.
//!
//! Every endpoint is a row in the [`endpoint::ENDPOINTS`] table describing its
//! path, delivery, signing scheme, and fields. [`FddClient`] turns a name plus
//! business parameters into a [`SignedRequest`] and then either dispatches it
//! through a [`Transport`] or renders it as a redirect URL.
//!
//! ## Delivery
//!
//! | Delivery | Behavior                                   | Examples                          |
//! |----------|--------------------------------------------|-----------------------------------|
//! | POST     | form body, multipart when a file is attached | `account_register`, `upload_docs` |
//! | GET      | query string                               | `hash_deposit`                    |
//! | Redirect | signed URL returned, nothing sent          | `view_contract`, `ext_sign`       |
//!
//! ## Signing
//!
//! Standard endpoints sign the canonical concatenation of their business
//! values (scheme A). Manual and auto signing sign a transaction / customer
//! pair instead (scheme B). See [`auth`].

pub mod assembler;
pub mod auth;
pub mod client;
pub mod endpoint;
pub mod transport;

pub use assembler::{RequestAssembler, SignedRequest, encode_image};
pub use client::FddClient;
pub use endpoint::{ENDPOINTS, Endpoint};
pub use transport::{HttpMethod, HttpTransport, Transport, WireValue};
