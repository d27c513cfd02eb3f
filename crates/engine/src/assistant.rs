//! Turn orchestration over the assembled subsystems.

use loreweave_config::AppConfig;
use loreweave_core::answer::AnswerEngine;
use loreweave_core::clarify::ClarificationRequest;
use loreweave_core::error::{CurationError, Error};
use loreweave_core::log::{ConversationLog, LogEntry};
use loreweave_core::oracle::Oracle;
use loreweave_core::report::ReorganizationReport;
use loreweave_core::store::DocumentStore;
use loreweave_context::{ContextManager, ContextPipeline, PreferenceRecorder, ProcessedTurn};
use loreweave_curator::{Curator, Ingestor};
use loreweave_oracle::{CredentialPool, HttpTransport, OracleClient};
use loreweave_store::{FsStore, JsonlLog};
use std::sync::Arc;
use tracing::{error, info, warn};

const ANSWER_FAILURE: &str =
    "Sorry, I could not produce an answer right now. Please try again.";

/// What one processed turn hands back to the application.
#[derive(Debug, Clone)]
pub enum TurnReply {
    /// A generated answer, plus the knowledge path this turn produced
    /// (if ingestion decided the exchange was worth keeping).
    Answer {
        text: String,
        knowledge_path: Option<String>,
    },

    /// The input was unclear; the application should present the
    /// candidate intents and wait for a resubmission.
    Clarification(ClarificationRequest),
}

/// The assembled assistant. One instance serves many concurrent sessions.
pub struct Assistant {
    pipeline: ContextPipeline,
    manager: ContextManager,
    curator: Curator,
    ingestor: Ingestor,
    preferences: Arc<PreferenceRecorder>,
    log: Arc<dyn ConversationLog>,
    answer_engine: Arc<dyn AnswerEngine>,
    default_context_budget: usize,
    knowledge_updates: bool,
}

impl Assistant {
    /// Assemble from explicit collaborators. The production path is
    /// [`Assistant::from_config`]; tests inject mocks here.
    pub fn new(
        config: &AppConfig,
        oracle: Arc<dyn Oracle>,
        store: Arc<dyn DocumentStore>,
        log: Arc<dyn ConversationLog>,
        answer_engine: Arc<dyn AnswerEngine>,
    ) -> Self {
        let preferences = Arc::new(PreferenceRecorder::new(
            oracle.clone(),
            &config.storage.user_data_dir,
        ));
        let pipeline = ContextPipeline::new(
            oracle.clone(),
            log.clone(),
            preferences.clone(),
            config.context.history_limit,
        );
        let manager = ContextManager::new(
            config.context.buffer_budget_chars,
            config.context.relevant_turns,
        );
        let curator = Curator::new(oracle.clone(), store.clone(), config.curation.clone());
        let ingestor = Ingestor::new(oracle, store, config.curation.clone());

        Self {
            pipeline,
            manager,
            curator,
            ingestor,
            preferences,
            log,
            answer_engine,
            default_context_budget: config.context.default_context_budget,
            knowledge_updates: true,
        }
    }

    /// Build the production wiring: rotating HTTP oracle client,
    /// filesystem knowledge store, JSONL conversation log.
    pub fn from_config(
        config: &AppConfig,
        answer_engine: Arc<dyn AnswerEngine>,
    ) -> Result<Self, Error> {
        let transport = Arc::new(HttpTransport::from_config(&config.oracle));
        let pool = Arc::new(CredentialPool::new(config.oracle.api_keys.clone()));
        let oracle: Arc<dyn Oracle> = Arc::new(OracleClient::new(transport, pool));
        let store: Arc<dyn DocumentStore> =
            Arc::new(FsStore::open(&config.storage.knowledge_root)?);
        let log: Arc<dyn ConversationLog> = Arc::new(JsonlLog::open(&config.storage.log_dir)?);
        Ok(Self::new(config, oracle, store, log, answer_engine))
    }

    /// Turn knowledge ingestion off (e.g. for read-only deployments).
    pub fn with_knowledge_updates(mut self, enabled: bool) -> Self {
        self.knowledge_updates = enabled;
        self
    }

    /// Process one user turn end to end: pipeline, answer, bookkeeping,
    /// ingestion. Never errors; failures surface as plain messages.
    pub async fn process_turn(
        &self,
        user_text: &str,
        session_id: &str,
        context_budget: Option<usize>,
    ) -> TurnReply {
        let budget = context_budget.unwrap_or(self.default_context_budget);

        let (query, context) = match self.pipeline.process_turn(user_text, session_id, budget).await
        {
            ProcessedTurn::NeedsClarification(request) => {
                return TurnReply::Clarification(request);
            }
            ProcessedTurn::Failed { message } => {
                return TurnReply::Answer {
                    text: message,
                    knowledge_path: None,
                };
            }
            ProcessedTurn::Ready { query, context } => (query, context),
        };

        let answer = match self.answer_engine.answer(&query, &context, None).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(session_id, error = %e, "Answer engine failed");
                return TurnReply::Answer {
                    text: ANSWER_FAILURE.into(),
                    knowledge_path: None,
                };
            }
        };

        self.manager.add_turn(session_id, user_text, &answer).await;
        self.preferences.record_reflection(user_text, &answer).await;

        let knowledge_path = if self.knowledge_updates {
            match self.ingestor.ingest_turn(user_text, &answer).await {
                Ok(path) => path,
                Err(e) => {
                    warn!(session_id, error = %e, "Knowledge ingestion failed");
                    None
                }
            }
        } else {
            None
        };

        let mut entry = LogEntry::new(session_id, user_text, &answer);
        if let Some(path) = &knowledge_path {
            entry = entry.with_knowledge_path(path);
        }
        if let Err(e) = self.log.append(entry).await {
            warn!(session_id, error = %e, "Failed to append conversation log entry");
        }

        if let Some(path) = &knowledge_path {
            info!(session_id, path = %path, "Turn contributed knowledge");
        }
        TurnReply::Answer {
            text: answer,
            knowledge_path,
        }
    }

    /// Ingest an externally produced exchange into the knowledge base.
    pub async fn ingest_turn(
        &self,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<Option<String>, Error> {
        self.ingestor.ingest_turn(user_text, assistant_text).await
    }

    /// Run the batch reorganization pass over the knowledge store.
    pub async fn reorganize(&self) -> Result<ReorganizationReport, CurationError> {
        self.curator.reorganize().await
    }

    /// The live session buffers (for relevant-context extraction and
    /// external eviction).
    pub fn context(&self) -> &ContextManager {
        &self.manager
    }
}
