//! Signed-request client for the `AliExpress` affiliate gateway.
//!
//! Builds HMAC-signed requests, normalizes the gateway's inconsistent JSON
//! shapes into [`aepub_core::Product`] records, and resolves a usable
//! affiliate link for a product without ever losing the original URL.

pub mod client;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod sign;

pub use client::{AffiliateClient, LinkOutcome};
pub use error::AffiliateError;
pub use extract::extract_products;
pub use sign::{sign, ParamValue};
