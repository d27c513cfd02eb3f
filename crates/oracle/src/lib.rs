//! Oracle client — credential rotation, bounded retries, and the
//! fail-open fallback combinator.
//!
//! The client wraps a [`Transport`] (one prompt + one credential → text)
//! and retries the *same* prompt across the credential pool: every
//! transport failure advances the shared cursor to the next credential,
//! and only a full fruitless cycle surfaces as
//! [`OracleError::Exhausted`](loreweave_core::error::OracleError).

mod client;
mod fallback;
mod http;
mod pool;
pub mod reply;

pub use client::{OracleClient, Transport};
pub use fallback::or_fallback;
pub use http::HttpTransport;
pub use pool::CredentialPool;
