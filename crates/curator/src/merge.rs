//! Phase 4 helpers — merge-cohesion judgment, synthesis, and naming.
//!
//! Small groups get one direct yes/no judgment over content samples;
//! larger groups go through a cheaper per-document topic-tag pass and a
//! majority-similarity heuristic. Both thresholds are configuration, not
//! constants.

use loreweave_config::CurationConfig;
use loreweave_core::category::MergeDecision;
use loreweave_core::oracle::{GenerateOptions, Oracle};
use loreweave_oracle::{or_fallback, reply};
use std::sync::Arc;
use tracing::debug;

use crate::inventory::DocumentInfo;
use crate::naming;
use crate::prompts;

/// Decides and performs the content side of merges.
pub(crate) struct MergePlanner {
    oracle: Arc<dyn Oracle>,
    config: CurationConfig,
}

impl MergePlanner {
    pub(crate) fn new(oracle: Arc<dyn Oracle>, config: CurationConfig) -> Self {
        Self { oracle, config }
    }

    /// Judge whether a same-category group should merge. Any oracle
    /// failure defaults to "no".
    pub(crate) async fn should_merge(&self, docs: &[&DocumentInfo]) -> MergeDecision {
        if docs.len() < 2 {
            return MergeDecision::no("group has fewer than two documents");
        }

        if docs.len() <= self.config.direct_judgment_max {
            let merge = or_fallback(
                "merge_judgment",
                async {
                    let raw = self
                        .oracle
                        .generate(
                            &prompts::merge_judgment(docs, self.config.merge_sample_chars),
                            GenerateOptions::short(),
                        )
                        .await?;
                    reply::parse_yes_no(&raw)
                },
                false,
            )
            .await;
            return if merge {
                MergeDecision::yes("direct judgment")
            } else {
                MergeDecision::no("direct judgment")
            };
        }

        self.tag_cluster_decision(docs).await
    }

    /// Tag a sample of the group and merge only if enough tags match the
    /// first document's tag, by exact or substring match.
    async fn tag_cluster_decision(&self, docs: &[&DocumentInfo]) -> MergeDecision {
        let mut tags: Vec<String> = Vec::new();
        for doc in docs.iter().take(self.config.tag_sample_cap) {
            let tag = or_fallback(
                "topic_tag",
                async {
                    let raw = self
                        .oracle
                        .generate(
                            &prompts::topic_tag(doc, self.config.tag_sample_chars),
                            GenerateOptions::short(),
                        )
                        .await?;
                    Ok(raw.trim().to_string())
                },
                String::new(),
            )
            .await;
            if !tag.is_empty() {
                tags.push(tag);
            }
        }

        let Some(first) = tags.first() else {
            return MergeDecision::no("no topic tags available");
        };
        let similar = tags
            .iter()
            .filter(|tag| *tag == first || tag.contains(first.as_str()) || first.contains(tag.as_str()))
            .count();
        let ratio = similar as f32 / tags.len() as f32;
        debug!(similar, total = tags.len(), ratio, "Tag-cluster cohesion");

        if ratio >= self.config.tag_overlap_threshold {
            MergeDecision::yes(format!("{similar}/{} tags match", tags.len()))
        } else {
            MergeDecision::no(format!("only {similar}/{} tags match", tags.len()))
        }
    }

    /// Consolidate the full contents into one document. Synthesis
    /// failure falls back to plain concatenation with separators.
    pub(crate) async fn synthesize(&self, docs: &[&DocumentInfo]) -> String {
        or_fallback(
            "merge_synthesis",
            async {
                self.oracle
                    .generate(&prompts::synthesize(docs), GenerateOptions::default())
                    .await
            },
            docs.iter()
                .map(|doc| doc.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n---\n\n"),
        )
        .await
    }

    /// Name the consolidated document; too-short or failed generations get
    /// the themed default.
    pub(crate) async fn merged_filename(&self, theme: &str, docs: &[&DocumentInfo]) -> String {
        let proposed = or_fallback(
            "merged_filename",
            async {
                self.oracle
                    .generate(
                        &prompts::merged_filename(theme, docs, self.config.tag_sample_chars),
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
            format!("{theme}_综合")
        }
    }
}
