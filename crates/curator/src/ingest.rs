//! Knowledge ingestion — the per-turn write path.
//!
//! A finished `(user, assistant)` exchange becomes a structured note filed
//! under the category the shared classifier picks. A best-effort novelty
//! pre-check skips the write when the knowledge base already covers the
//! exchange; the check defaults to "update" on any failure, since losing a
//! potential contribution is worse than one redundant file.

use chrono::Utc;
use loreweave_config::CurationConfig;
use loreweave_core::error::Error;
use loreweave_core::oracle::{GenerateOptions, Oracle};
use loreweave_core::store::DocumentStore;
use loreweave_oracle::{or_fallback, reply};
use std::sync::Arc;
use tracing::{info, warn};

use crate::classify::Classifier;
use crate::inventory::{char_prefix, content_hash};
use crate::naming;
use crate::prompts;
use crate::search::keyword_search;

/// How many search hits the novelty check shows the oracle.
const NOVELTY_CONTEXT_HITS: usize = 3;

/// Writes conversation knowledge into the store.
pub struct Ingestor {
    oracle: Arc<dyn Oracle>,
    store: Arc<dyn DocumentStore>,
    classifier: Classifier,
    config: CurationConfig,
}

impl Ingestor {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        store: Arc<dyn DocumentStore>,
        config: CurationConfig,
    ) -> Self {
        let classifier = Classifier::new(oracle.clone(), config.classify_sample_chars);
        Self {
            oracle,
            store,
            classifier,
            config,
        }
    }

    /// Ingest one finished exchange. Returns the written path, or `None`
    /// when the novelty check decided the knowledge base already covers it.
    pub async fn ingest_turn(
        &self,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<Option<String>, Error> {
        if !self.adds_knowledge(user_text, assistant_text).await {
            info!("Exchange adds nothing new, skipping knowledge write");
            return Ok(None);
        }

        let note = self
            .oracle
            .generate(
                &prompts::extract_note(user_text, assistant_text),
                GenerateOptions::default(),
            )
            .await
            .map_err(Error::from)?;

        let category = self
            .classifier
            .classify("conversation", &format!("{user_text}\n{note}"))
            .await;

        let base = self.note_filename(&note).await;
        let path = naming::unique_path(&*self.store, &category.rel_dir(), &base, "txt").await;
        self.store.write(&path, &note).await.map_err(Error::from)?;
        info!(path = %path, category = %category, "Knowledge note written");
        Ok(Some(path))
    }

    /// Best-effort novelty pre-check over a keyword search of the store.
    async fn adds_knowledge(&self, user_text: &str, assistant_text: &str) -> bool {
        let hits = match keyword_search(&*self.store, user_text, 5).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Novelty search failed, assuming new knowledge");
                return true;
            }
        };
        if hits.is_empty() {
            return true;
        }

        let existing = hits
            .iter()
            .take(NOVELTY_CONTEXT_HITS)
            .map(|hit| format!("- {}: {}", hit.path, char_prefix(&hit.content, 200)))
            .collect::<Vec<_>>()
            .join("\n");

        or_fallback(
            "novelty_check",
            async {
                let raw = self
                    .oracle
                    .generate(
                        &prompts::novelty(user_text, assistant_text, &existing),
                        GenerateOptions::short(),
                    )
                    .await?;
                reply::parse_yes_no(&raw)
            },
            true,
        )
        .await
    }

    /// Oracle-suggested name, or a hash/timestamp fallback.
    async fn note_filename(&self, note: &str) -> String {
        let proposed = or_fallback(
            "note_filename",
            async {
                self.oracle
                    .generate(
                        &prompts::filename(
                            "conversation note",
                            char_prefix(note, self.config.tag_sample_chars),
                        ),
                        GenerateOptions::short(),
                    )
                    .await
            },
            String::new(),
        )
        .await;

        let name = naming::sanitize_filename(&proposed, self.config.filename_max_chars);
        if naming::usable(&name) {
            name
        } else {
            let digest = content_hash(note, self.config.hash_prefix_chars);
            format!(
                "note_{}_{}",
                &digest[..8],
                Utc::now().format("%Y%m%d_%H%M%S")
            )
        }
    }
}
