//! The fail-open combinator for oracle-backed decision points.
//!
//! Every "ask the oracle, fall back on failure" site in the pipeline and
//! the curator goes through [`or_fallback`], so the fallback policy is
//! visible and testable in one place instead of duplicated at each call.

use loreweave_core::error::OracleError;
use std::future::Future;
use tracing::warn;

/// Await an oracle-backed operation; on error, log it and return the
/// supplied fallback value. `stage` names the decision point in the log.
pub async fn or_fallback<T, F>(stage: &str, operation: F, fallback: T) -> T
where
    F: Future<Output = std::result::Result<T, OracleError>>,
{
    match operation.await {
        Ok(value) => value,
        Err(e) => {
            warn!(stage, error = %e, "Oracle-backed decision failed, using fallback");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_success() {
        let value = or_fallback("test", async { Ok::<_, OracleError>(7) }, 0).await;
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn substitutes_fallback_on_error() {
        let value = or_fallback(
            "test",
            async { Err::<i32, _>(OracleError::Exhausted) },
            42,
        )
        .await;
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn works_for_owned_types() {
        let value = or_fallback(
            "summary",
            async { Err::<String, _>(OracleError::MalformedReply("bad".into())) },
            "placeholder summary".to_string(),
        )
        .await;
        assert_eq!(value, "placeholder summary");
    }
}
