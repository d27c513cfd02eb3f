//! Single-document categorization — the path shared by batch
//! reorganization and per-turn ingestion.
//!
//! The oracle replies `primary/secondary`; parsing, sanitization, and the
//! `other/unclassified` fallback live in `Category::parse`. On top of
//! that, a lookup table folds known synonymous secondary labels together
//! so oracle output variance does not fragment the category tree.

use loreweave_core::category::Category;
use loreweave_core::oracle::{GenerateOptions, Oracle};
use loreweave_oracle::or_fallback;
use std::sync::Arc;
use tracing::debug;

use crate::inventory::char_prefix;
use crate::prompts;

/// Known synonymous secondary labels, applied after sanitization. Left
/// side is the oracle variant, right side the canonical label.
const SECONDARY_SYNONYMS: &[(&str, &str)] = &[
    // Machine learning family
    ("机器学习介绍", "机器学习"),
    ("机器学习简介", "机器学习"),
    ("机器学习基础", "机器学习"),
    ("machine_learning_basics", "machine_learning"),
    ("introduction_to_machine_learning", "machine_learning"),
    // Deep learning family
    ("深度学习介绍", "深度学习"),
    ("深度学习简介", "深度学习"),
    ("深度学习基础", "深度学习"),
    ("deep_learning_basics", "deep_learning"),
    ("introduction_to_deep_learning", "deep_learning"),
    // NLP family
    ("自然语言处理介绍", "自然语言处理"),
    ("自然语言处理简介", "自然语言处理"),
    ("自然语言处理基础", "自然语言处理"),
    ("nlp", "自然语言处理"),
    ("nlp基础", "自然语言处理"),
    // Computer vision family
    ("计算机视觉介绍", "计算机视觉"),
    ("计算机视觉基础", "计算机视觉"),
    ("cv", "计算机视觉"),
    ("cv基础", "计算机视觉"),
    // World models family
    ("世界模型与AI", "世界模型"),
    ("世界模型与AI应用", "世界模型"),
    ("人工智能与世界模型", "世界模型"),
    ("人工智能世界模型", "世界模型"),
    ("世界模型应用", "世界模型"),
    // Cloud computing family
    ("云计算概念", "云计算"),
    ("云计算基础", "云计算"),
];

/// Fold a sanitized secondary label onto its canonical form.
pub(crate) fn normalize_secondary(secondary: &str) -> &str {
    SECONDARY_SYNONYMS
        .iter()
        .find(|(variant, _)| *variant == secondary)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(secondary)
}

/// Oracle-backed classifier with the fixed fallback category.
pub struct Classifier {
    oracle: Arc<dyn Oracle>,
    sample_chars: usize,
}

impl Classifier {
    pub fn new(oracle: Arc<dyn Oracle>, sample_chars: usize) -> Self {
        Self {
            oracle,
            sample_chars,
        }
    }

    /// Classify free text into a normalized two-level category. Any oracle
    /// failure yields `other/unclassified`.
    pub async fn classify(&self, name: &str, content: &str) -> Category {
        let category = or_fallback(
            "classification",
            async {
                let sample = char_prefix(content, self.sample_chars);
                let raw = self
                    .oracle
                    .generate(&prompts::classify(name, sample), GenerateOptions::short())
                    .await?;
                Ok(Category::parse(&raw))
            },
            Category::unclassified(),
        )
        .await;

        let normalized = Category::new(
            category.primary,
            category
                .secondary
                .as_deref()
                .map(|secondary| normalize_secondary(secondary).to_string()),
        );
        debug!(name, category = %normalized, "Classified document");
        normalized
    }
}
