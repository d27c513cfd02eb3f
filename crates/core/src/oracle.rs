//! Oracle trait — the abstraction over the text-generation service.
//!
//! An Oracle takes a prompt and returns a complete text reply. All
//! classification, rewriting, and synthesis decisions in the system go
//! through this one contract; streaming, if the backing service supports
//! it, is assembled into a full string before this layer sees it.

use crate::error::OracleError;
use async_trait::async_trait;

/// Per-call options for a generate request.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Hint for the maximum output size, in tokens. Decision prompts that
    /// expect a one-word answer pass a small hint; synthesis prompts leave
    /// it unset.
    pub max_output_hint: Option<u32>,
}

impl GenerateOptions {
    /// Options for a short classification/decision reply.
    pub fn short() -> Self {
        Self {
            max_output_hint: Some(64),
        }
    }
}

/// The core Oracle trait.
///
/// The production implementation is the rotating-credential client in
/// `loreweave-oracle`; tests use scripted stubs.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send a prompt and get the complete generated text.
    async fn generate(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> std::result::Result<String, OracleError>;
}
