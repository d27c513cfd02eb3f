//! Batch reorganization — the five-phase idempotent pass.
//!
//! Inventory → classify → dedup/invalid → merge → relocate, then sweep
//! empty directories. Every phase isolates per-document failures: one
//! document's oracle call or store operation failing downgrades to a
//! fallback or a `Failed` record, never an aborted run. Writes precede
//! deletes, so a crash mid-merge leaves the sources intact.
//!
//! At most one run may execute at a time against a curator's root;
//! concurrent callers are rejected, not queued — interleaved renames on
//! the same paths do not compose.

use loreweave_config::CurationConfig;
use loreweave_core::category::sanitize_component;
use loreweave_core::error::CurationError;
use loreweave_core::oracle::{GenerateOptions, Oracle};
use loreweave_core::report::{DeleteReason, Disposition, ReorganizationReport};
use loreweave_core::store::DocumentStore;
use loreweave_oracle::or_fallback;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::inventory::{DocumentInfo, char_prefix, take_inventory};
use crate::merge::MergePlanner;
use crate::naming;
use crate::prompts;

/// The knowledge curator: owns the batch pass over one store.
pub struct Curator {
    oracle: Arc<dyn Oracle>,
    store: Arc<dyn DocumentStore>,
    classifier: Classifier,
    planner: MergePlanner,
    config: CurationConfig,
    run_lock: Mutex<()>,
}

impl Curator {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        store: Arc<dyn DocumentStore>,
        config: CurationConfig,
    ) -> Self {
        let classifier = Classifier::new(oracle.clone(), config.classify_sample_chars);
        let planner = MergePlanner::new(oracle.clone(), config.clone());
        Self {
            oracle,
            store,
            classifier,
            planner,
            config,
            run_lock: Mutex::new(()),
        }
    }

    /// Run the full pass. Rejects a second concurrent run with
    /// [`CurationError::AlreadyRunning`].
    pub async fn reorganize(&self) -> Result<ReorganizationReport, CurationError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| CurationError::AlreadyRunning)?;

        info!("Starting knowledge reorganization");

        // Phase 1: inventory.
        let docs = take_inventory(&*self.store, self.config.hash_prefix_chars).await?;
        let mut report = ReorganizationReport {
            analyzed: docs.len(),
            ..Default::default()
        };

        // Phase 2: classify every document over a capped sample.
        let mut categories = Vec::with_capacity(docs.len());
        for doc in &docs {
            categories.push(self.classifier.classify(&doc.name, &doc.content).await);
        }

        // Phase 3: invalid documents first, then duplicates among the
        // valid ones; each document gets exactly one terminal record.
        let invalid: HashSet<usize> = docs
            .iter()
            .enumerate()
            .filter(|(_, doc)| self.is_invalid(doc))
            .map(|(i, _)| i)
            .collect();

        let mut first_of_hash: HashMap<&str, usize> = HashMap::new();
        let mut duplicates: HashSet<usize> = HashSet::new();
        for (i, doc) in docs.iter().enumerate() {
            if invalid.contains(&i) {
                continue;
            }
            if first_of_hash.contains_key(doc.content_hash.as_str()) {
                duplicates.insert(i);
            } else {
                first_of_hash.insert(&doc.content_hash, i);
            }
        }

        for (i, doc) in docs.iter().enumerate() {
            let reason = if invalid.contains(&i) {
                DeleteReason::Invalid
            } else if duplicates.contains(&i) {
                DeleteReason::Duplicate
            } else {
                continue;
            };
            match self.store.delete(&doc.path).await {
                Ok(()) => report.record(doc.path.as_str(), Disposition::Deleted { reason }),
                Err(e) => {
                    warn!(path = %doc.path, error = %e, "Failed to delete document");
                    report.record(doc.path.as_str(), Disposition::Failed { error: e.to_string() });
                }
            }
        }

        // Phase 4: merge cohesive same-category groups.
        let remaining: Vec<usize> = (0..docs.len())
            .filter(|i| !invalid.contains(i) && !duplicates.contains(i))
            .collect();
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for &i in &remaining {
            groups.entry(categories[i].label()).or_default().push(i);
        }

        let mut consumed: HashSet<usize> = HashSet::new();
        for (label, indices) in &groups {
            if indices.len() < 2 {
                continue;
            }
            let group: Vec<&DocumentInfo> = indices.iter().map(|&i| &docs[i]).collect();
            let decision = self.planner.should_merge(&group).await;
            debug!(category = %label, merge = decision.merge, reason = %decision.reason, "Merge decision");
            if !decision.merge {
                continue;
            }

            let category = &categories[indices[0]];
            let theme = category
                .secondary
                .clone()
                .unwrap_or_else(|| category.primary.as_dir().to_string());
            let content = self.planner.synthesize(&group).await;
            let base = self.planner.merged_filename(&theme, &group).await;
            let dest = naming::unique_path(&*self.store, &category.rel_dir(), &base, "txt").await;

            // Write the consolidated document before touching any source.
            if let Err(e) = self.store.write(&dest, &content).await {
                warn!(dest = %dest, error = %e, "Failed to write merged document, leaving sources in place");
                continue;
            }
            report.record(
                dest.as_str(),
                Disposition::Created {
                    sources: group.iter().map(|doc| doc.path.clone()).collect(),
                    category: label.clone(),
                },
            );

            for &i in indices {
                let doc = &docs[i];
                match self.store.delete(&doc.path).await {
                    Ok(()) => report.record(doc.path.as_str(), Disposition::Merged { into: dest.clone() }),
                    Err(e) => {
                        warn!(path = %doc.path, error = %e, "Failed to delete merged source");
                        report.record(doc.path.as_str(), Disposition::Failed { error: e.to_string() });
                    }
                }
                consumed.insert(i);
            }
        }

        // Phase 5: relocate what remains under its category directory.
        for &i in &remaining {
            if consumed.contains(&i) {
                continue;
            }
            let doc = &docs[i];
            let category = &categories[i];
            let dest_dir = category.rel_dir();
            if doc.parent_dir() == dest_dir {
                // Already filed where it belongs; an idempotent rerun
                // leaves it untouched.
                continue;
            }

            let base = self.relocation_name(doc).await;
            let dest = naming::unique_path(&*self.store, &dest_dir, &base, "txt").await;
            match self.store.rename(&doc.path, &dest).await {
                Ok(()) => report.record(
                    doc.path.as_str(),
                    Disposition::Moved {
                        to: dest,
                        category: category.label(),
                    },
                ),
                Err(e) => {
                    warn!(path = %doc.path, error = %e, "Failed to relocate document");
                    report.record(doc.path.as_str(), Disposition::Failed { error: e.to_string() });
                }
            }
        }

        // Directories emptied by deletes and moves go away last.
        if let Err(e) = self.store.remove_empty_dirs().await {
            warn!(error = %e, "Empty-directory sweep failed");
        }

        info!(
            analyzed = report.analyzed,
            duplicates_removed = report.duplicates_removed,
            invalid_removed = report.invalid_removed,
            merged = report.merged,
            relocated = report.relocated,
            failed = report.failed,
            "Reorganization finished"
        );
        Ok(report)
    }

    fn is_invalid(&self, doc: &DocumentInfo) -> bool {
        doc.size < self.config.min_valid_chars
            || self
                .config
                .placeholder_markers
                .iter()
                .any(|marker| doc.content.contains(marker))
    }

    /// A descriptive filename for relocation: oracle-proposed from the
    /// document's own content, else the original stem stripped of
    /// trailing date-like suffixes.
    async fn relocation_name(&self, doc: &DocumentInfo) -> String {
        let proposed = or_fallback(
            "relocation_filename",
            async {
                self.oracle
                    .generate(
                        &prompts::filename(
                            &doc.name,
                            char_prefix(&doc.content, self.config.tag_sample_chars),
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
            return name;
        }

        let stem = doc.name.strip_suffix(".txt").unwrap_or(&doc.name);
        let cleaned = sanitize_component(naming::strip_date_suffix(stem));
        if naming::usable(&cleaned) {
            cleaned
        } else {
            "untitled".into()
        }
    }
}
