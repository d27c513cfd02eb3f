//! The rotating oracle client.
//!
//! One logical `generate` call tries each credential in the pool at most
//! once, always with the same prompt. Failing credential identities go to
//! the log, never to the caller; the caller sees either the generated
//! text or `OracleError::Exhausted`.

use crate::pool::CredentialPool;
use async_trait::async_trait;
use loreweave_core::error::OracleError;
use loreweave_core::oracle::{GenerateOptions, Oracle};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// One prompt + one credential → one complete text reply.
///
/// The transport owns endpoint, model, and timeout concerns; the client
/// owns rotation. Tests swap in scripted transports.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        prompt: &str,
        credential: &str,
        options: &GenerateOptions,
    ) -> std::result::Result<String, OracleError>;
}

/// Oracle client with credential failover.
pub struct OracleClient {
    transport: Arc<dyn Transport>,
    pool: Arc<CredentialPool>,
}

impl OracleClient {
    pub fn new(transport: Arc<dyn Transport>, pool: Arc<CredentialPool>) -> Self {
        Self { transport, pool }
    }

    /// The shared pool, for wiring and inspection.
    pub fn pool(&self) -> &Arc<CredentialPool> {
        &self.pool
    }
}

#[async_trait]
impl Oracle for OracleClient {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> std::result::Result<String, OracleError> {
        let attempts = self.pool.len();
        for attempt in 0..attempts {
            let Some((idx, credential)) = self.pool.current() else {
                break;
            };
            match self.transport.send(prompt, &credential, &options).await {
                Ok(text) => {
                    debug!(credential_index = idx, attempt, "Oracle call succeeded");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        credential_index = idx,
                        attempt,
                        total = attempts,
                        error = %e,
                        "Oracle call failed, rotating credential"
                    );
                    self.pool.rotate_from(idx);
                }
            }
        }

        error!(pool_size = attempts, "All credentials failed for this call");
        Err(OracleError::Exhausted)
    }
}
