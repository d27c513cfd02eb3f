//! Keyword search over the knowledge store.
//!
//! A simple containment filter with word-overlap scoring — enough for the
//! ingestion novelty pre-check, which only needs "is anything vaguely
//! related already stored". Semantic retrieval stays behind the external
//! answer engine.

use loreweave_core::error::StoreError;
use loreweave_core::store::DocumentStore;
use tracing::warn;

/// One matching document with its relevance score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub path: String,
    pub content: String,
    /// Fraction of query words found in the content
    pub relevance: f32,
}

/// Case-insensitive containment search, best matches first.
pub async fn keyword_search(
    store: &dyn DocumentStore,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchHit>, StoreError> {
    let query_lower = query.to_lowercase();
    let query_words: Vec<&str> = query_lower.split_whitespace().collect();

    let mut hits = Vec::new();
    for path in store.list(".txt").await? {
        let content = match store.read(&path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path, error = %e, "Skipping unreadable document in search");
                continue;
            }
        };
        let content_lower = content.to_lowercase();
        if !content_lower.contains(&query_lower) {
            continue;
        }
        let relevance = if query_words.is_empty() {
            0.0
        } else {
            let matched = query_words
                .iter()
                .filter(|word| content_lower.contains(**word))
                .count();
            matched as f32 / query_words.len() as f32
        };
        hits.push(SearchHit {
            path,
            content,
            relevance,
        });
    }

    hits.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(limit);
    Ok(hits)
}
