//! AnswerEngine trait — the external vector-index query service.
//!
//! The pipeline constructs the `(query, context)` pair; retrieval and
//! answer synthesis happen behind this interface and are not part of the
//! core. A stub implementation is enough for tests.

use crate::error::Error;
use crate::session::ContextMessage;
use async_trait::async_trait;

/// Answers a query against the document index, optionally steered by
/// role-tagged context messages.
#[async_trait]
pub trait AnswerEngine: Send + Sync {
    async fn answer(
        &self,
        query: &str,
        context: &[ContextMessage],
        length_hint: Option<usize>,
    ) -> std::result::Result<String, Error>;
}
