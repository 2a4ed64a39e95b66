//! Core data types shared by the signing layer and its callers.

pub mod credentials;
pub mod params;

pub use credentials::*;
pub use params::*;
