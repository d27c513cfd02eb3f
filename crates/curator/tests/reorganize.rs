//! End-to-end reorganization runs against a temp-directory store.

use async_trait::async_trait;
use loreweave_config::CurationConfig;
use loreweave_core::error::OracleError;
use loreweave_core::oracle::{GenerateOptions, Oracle};
use loreweave_core::report::Disposition;
use loreweave_core::store::DocumentStore;
use loreweave_curator::Curator;
use loreweave_store::FsStore;
use std::sync::Arc;

/// Routes classification by file name and scripts the merge decisions;
/// every unscripted prompt fails so the documented fallbacks engage.
struct RouteOracle {
    classify: Vec<(&'static str, &'static str)>,
    merge: Option<&'static str>,
    synthesized: Option<&'static str>,
    merged_name: Option<&'static str>,
}

impl RouteOracle {
    fn classify_only(classify: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            classify,
            merge: Some("no"),
            synthesized: None,
            merged_name: None,
        }
    }
}

#[async_trait]
impl Oracle for RouteOracle {
    async fn generate(
        &self,
        prompt: &str,
        _options: GenerateOptions,
    ) -> Result<String, OracleError> {
        if prompt.contains("two-level category") {
            for (name, category) in &self.classify {
                if prompt.contains(name) {
                    return Ok(category.to_string());
                }
            }
            return Err(OracleError::Exhausted);
        }
        if prompt.contains("cohesive enough to merge") {
            return self
                .merge
                .map(String::from)
                .ok_or(OracleError::Exhausted);
        }
        if prompt.contains("consolidating the theme") {
            return self
                .merged_name
                .map(String::from)
                .ok_or(OracleError::Exhausted);
        }
        if prompt.contains("one coherent knowledge document") {
            return self
                .synthesized
                .map(String::from)
                .ok_or(OracleError::Exhausted);
        }
        Err(OracleError::Exhausted)
    }
}

fn store() -> (tempfile::TempDir, Arc<FsStore>) {
    let dir = tempfile::tempdir().unwrap();
    let fs = Arc::new(FsStore::open(dir.path()).unwrap());
    (dir, fs)
}

fn curator(oracle: RouteOracle, fs: Arc<FsStore>) -> Curator {
    Curator::new(Arc::new(oracle), fs, CurationConfig::default())
}

fn long(text: &str) -> String {
    format!("{text}: {}", "padding so the document counts as valid. ".repeat(3))
}

#[tokio::test]
async fn full_pass_dedups_invalidates_merges_and_relocates() {
    let (_dir, fs) = store();
    // Two cohesive ML documents to merge.
    fs.write("ml_one.txt", &long("gradient descent basics")).await.unwrap();
    fs.write("ml_two.txt", &long("backpropagation explained")).await.unwrap();
    // Identical twins: one duplicate.
    fs.write("travel_a.txt", &long("tips for travelling in Norway")).await.unwrap();
    fs.write("travel_b.txt", &long("tips for travelling in Norway")).await.unwrap();
    // Too small to be valid.
    fs.write("tiny.txt", "stub").await.unwrap();

    let oracle = RouteOracle {
        classify: vec![
            ("ml_one", "technical/机器学习"),
            ("ml_two", "technical/机器学习"),
            ("travel_a", "lifestyle/travel"),
            ("travel_b", "lifestyle/travel"),
        ],
        merge: Some("yes"),
        synthesized: Some("# Machine learning\nconsolidated body"),
        merged_name: Some("ml overview"),
    };
    let report = curator(oracle, fs.clone()).reorganize().await.unwrap();

    assert_eq!(report.analyzed, 5);
    assert_eq!(report.invalid_removed, 1);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.merged, 2);
    assert_eq!(report.relocated, 1);
    assert_eq!(report.failed, 0);

    // The consolidated file exists where the merge said it would.
    let created = report
        .records
        .iter()
        .find_map(|record| match &record.disposition {
            Disposition::Created { sources, .. } => Some((record.path.clone(), sources.clone())),
            _ => None,
        })
        .expect("a created record");
    assert_eq!(created.0, "technical/机器学习/ml_overview.txt");
    assert_eq!(created.1.len(), 2);
    let merged_body = fs.read(&created.0).await.unwrap();
    assert!(merged_body.contains("consolidated body"));

    // Sources are gone; the surviving twin was relocated.
    assert!(!fs.exists("ml_one.txt").await);
    assert!(!fs.exists("ml_two.txt").await);
    assert!(fs.exists("lifestyle/travel/travel_a.txt").await);
    assert!(!fs.exists("travel_b.txt").await);

    // Every merged source points at the consolidated file.
    let merged_into: Vec<&str> = report
        .records
        .iter()
        .filter_map(|record| match &record.disposition {
            Disposition::Merged { into } => Some(into.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(merged_into, vec![created.0.as_str(), created.0.as_str()]);
}

#[tokio::test]
async fn reorganization_is_idempotent() {
    let (_dir, fs) = store();
    fs.write("ml_one.txt", &long("gradient descent")).await.unwrap();
    fs.write("ml_two.txt", &long("backprop")).await.unwrap();
    fs.write("stray.txt", &long("a history of the silk road")).await.unwrap();

    let routes = vec![
        ("ml_one", "technical/机器学习"),
        ("ml_two", "technical/机器学习"),
        ("ml_overview", "technical/机器学习"),
        ("stray", "humanities/history"),
    ];
    let oracle = || RouteOracle {
        classify: routes.clone(),
        merge: Some("yes"),
        synthesized: Some(
            "Machine learning, consolidated: gradient descent, backpropagation, \
             optimization, and regularization in one document.",
        ),
        merged_name: Some("ml overview"),
    };

    let first = curator(oracle(), fs.clone()).reorganize().await.unwrap();
    assert_eq!(first.merged, 2);
    assert_eq!(first.relocated, 1);

    let second = curator(oracle(), fs.clone()).reorganize().await.unwrap();
    assert!(
        second.is_empty(),
        "second run should change nothing, got {:?}",
        second.records
    );
}

#[tokio::test]
async fn forced_name_collisions_resolve_with_suffixes() {
    let (_dir, fs) = store();
    // Different content, same cleaned fallback stem after date stripping.
    fs.write("note_20250101.txt", &long("first body")).await.unwrap();
    fs.write("note_20250202.txt", &long("second body")).await.unwrap();

    let oracle = RouteOracle::classify_only(vec![
        ("note_20250101", "technical/notes"),
        ("note_20250202", "technical/notes"),
    ]);
    let report = curator(oracle, fs.clone()).reorganize().await.unwrap();
    assert_eq!(report.relocated, 2);

    let mut listed = fs.list(".txt").await.unwrap();
    listed.sort();
    assert_eq!(
        listed,
        vec!["technical/notes/note.txt", "technical/notes/note_1.txt"]
    );
}

#[tokio::test]
async fn dedup_keeps_exactly_one_per_hash_group() {
    let (_dir, fs) = store();
    for name in ["copy_a.txt", "copy_b.txt", "copy_c.txt"] {
        fs.write(name, &long("the same body every time")).await.unwrap();
    }

    let oracle = RouteOracle::classify_only(vec![("copy_", "other/copies")]);
    let report = curator(oracle, fs.clone()).reorganize().await.unwrap();

    assert_eq!(report.duplicates_removed, 2);
    assert_eq!(fs.list(".txt").await.unwrap().len(), 1);
}

#[tokio::test]
async fn no_produced_path_exceeds_two_levels() {
    let (_dir, fs) = store();
    fs.write("deep/nested/dirs/doc_a.txt", &long("alpha body")).await.unwrap();
    fs.write("doc_b.txt", &long("beta body")).await.unwrap();
    fs.write("somewhere/doc_c.txt", &long("gamma body")).await.unwrap();

    let oracle = RouteOracle::classify_only(vec![
        ("doc_a", "technical/alpha"),
        ("doc_b", "lifestyle/general"),
        ("doc_c", "humanities/art"),
    ]);
    curator(oracle, fs.clone()).reorganize().await.unwrap();

    for path in fs.list(".txt").await.unwrap() {
        assert!(
            path.matches('/').count() <= 2,
            "path deeper than two levels: {path}"
        );
    }
    // lifestyle/general collapses to the one-level form.
    assert!(fs.exists("lifestyle/doc_b.txt").await);
    // Directories emptied by the moves are swept.
    assert!(!fs.exists("deep").await);
    assert!(!fs.exists("somewhere").await);
}

#[tokio::test]
async fn placeholder_documents_are_invalid_in_pairs() {
    let (_dir, fs) = store();
    fs.write("p1.txt", "这是默认的文档内容").await.unwrap();
    fs.write("p2.txt", "这是默认的文档内容").await.unwrap();

    let report = curator(RouteOracle::classify_only(vec![]), fs.clone())
        .reorganize()
        .await
        .unwrap();
    assert_eq!(report.invalid_removed, 2);
    assert_eq!(report.duplicates_removed, 0);
    assert!(fs.list(".txt").await.unwrap().is_empty());
}
