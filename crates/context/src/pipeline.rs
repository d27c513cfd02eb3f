//! The turn pipeline — a staged decision workflow over one user message.
//!
//! Stages run strictly in order, each able to short-circuit the turn:
//! clarity check → intent clarification (terminal branch) → rewrite →
//! history load → summarize → context-need decision → truncation →
//! preference side effect. Every oracle-backed stage has a documented
//! fallback applied through `or_fallback`, and the top level converts any
//! remaining error into a plain-language failure: the pipeline never
//! raises to its caller.

use loreweave_core::clarify::ClarificationRequest;
use loreweave_core::error::{Error, OracleError};
use loreweave_core::log::ConversationLog;
use loreweave_core::oracle::{GenerateOptions, Oracle};
use loreweave_core::session::{ContextMessage, Turn};
use loreweave_oracle::{or_fallback, reply};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::preference::PreferenceRecorder;
use crate::prompts;

/// Substituted when summarization fails over a non-empty history.
const PLACEHOLDER_SUMMARY: &str = "Earlier conversation context is unavailable.";

/// Summary used when the session has no persisted history at all.
const NO_HISTORY_SUMMARY: &str = "No prior conversation.";

const GENERIC_FAILURE: &str =
    "Sorry, something went wrong while processing your request. Please try again.";

/// The pipeline's terminal output for one turn.
#[derive(Debug, Clone)]
pub enum ProcessedTurn {
    /// The input is ready to answer, with its bounded context.
    Ready {
        query: String,
        context: Vec<ContextMessage>,
    },

    /// The input was unclear; answering waits for the user to resubmit.
    NeedsClarification(ClarificationRequest),

    /// An unhandled internal error, converted to a plain message.
    Failed { message: String },
}

#[derive(Debug, Deserialize)]
struct RewriteReply {
    rewritten_input: String,
    #[serde(default)]
    changes: Vec<String>,
    #[serde(default)]
    reasoning: String,
}

impl RewriteReply {
    fn unchanged(input: &str) -> Self {
        Self {
            rewritten_input: input.to_string(),
            changes: Vec::new(),
            reasoning: String::new(),
        }
    }
}

/// Orchestrates one user turn into a clarification payload or a
/// ready-to-answer `(query, context)` pair.
pub struct ContextPipeline {
    oracle: Arc<dyn Oracle>,
    log: Arc<dyn ConversationLog>,
    preferences: Arc<PreferenceRecorder>,
    history_limit: usize,
}

impl ContextPipeline {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        log: Arc<dyn ConversationLog>,
        preferences: Arc<PreferenceRecorder>,
        history_limit: usize,
    ) -> Self {
        Self {
            oracle,
            log,
            preferences,
            history_limit,
        }
    }

    /// Process one user turn. Never errors: internal failures come back as
    /// [`ProcessedTurn::Failed`] with empty context.
    pub async fn process_turn(
        &self,
        user_text: &str,
        session_id: &str,
        context_budget: usize,
    ) -> ProcessedTurn {
        let outcome = self.run(user_text, session_id, context_budget).await;

        // Recorded regardless of outcome; failures stay inside the recorder.
        self.preferences.record_intent(session_id, user_text).await;

        match outcome {
            Ok(processed) => processed,
            Err(e) => {
                error!(session_id, error = %e, "Pipeline failed, returning generic error");
                ProcessedTurn::Failed {
                    message: GENERIC_FAILURE.into(),
                }
            }
        }
    }

    async fn run(
        &self,
        user_text: &str,
        session_id: &str,
        context_budget: usize,
    ) -> Result<ProcessedTurn, Error> {
        // 1. Clarity check, fail-open.
        let clear = or_fallback("clarity_check", self.check_clarity(user_text), true).await;

        if !clear {
            // 2. Intent clarification. Terminal: no context, no answer,
            // no ingestion for this turn.
            let request = or_fallback(
                "intent_clarification",
                self.clarify(user_text),
                ClarificationRequest::fallback(),
            )
            .await;
            info!(session_id, "Input unclear, returning clarification request");
            return Ok(ProcessedTurn::NeedsClarification(request));
        }

        // 3. Rewrite; never blocks the turn.
        let rewritten = or_fallback(
            "rewrite",
            self.rewrite(user_text),
            RewriteReply::unchanged(user_text),
        )
        .await;
        if !rewritten.changes.is_empty() {
            debug!(session_id, reasoning = %rewritten.reasoning, "Input rewritten for clarity");
        }

        // 4. History load; a failed read degrades to an empty history.
        let history = match self.log.recent(session_id, self.history_limit).await {
            Ok(history) => history,
            Err(e) => {
                warn!(session_id, error = %e, "History load failed, continuing without it");
                Vec::new()
            }
        };

        // 5. Summarize.
        let summary = if history.is_empty() {
            NO_HISTORY_SUMMARY.to_string()
        } else {
            or_fallback(
                "summarize",
                self.summarize(&history),
                PLACEHOLDER_SUMMARY.to_string(),
            )
            .await
        };

        // 6. Context-need decision. Prior turns or a repeated input
        // decide without the oracle; the oracle path fails open to "yes".
        let repeated = history
            .last()
            .is_some_and(|turn| normalized_eq(&turn.user_text, user_text));
        let need_full = if !history.is_empty() || repeated {
            true
        } else {
            or_fallback(
                "context_need",
                self.context_need(user_text, &summary),
                true,
            )
            .await
        };

        // 7. Truncate to the caller's budget, or hand over the summary.
        let context = if need_full {
            truncate(&history, context_budget)
        } else {
            vec![ContextMessage::system(summary)]
        };

        Ok(ProcessedTurn::Ready {
            query: rewritten.rewritten_input,
            context,
        })
    }

    async fn check_clarity(&self, user_text: &str) -> Result<bool, OracleError> {
        let raw = self
            .oracle
            .generate(&prompts::clarity(user_text), GenerateOptions::short())
            .await?;
        reply::parse_keyword(&raw, "clear", "unclear")
    }

    async fn clarify(&self, user_text: &str) -> Result<ClarificationRequest, OracleError> {
        let raw = self
            .oracle
            .generate(&prompts::intents(user_text), GenerateOptions::default())
            .await?;
        let request: ClarificationRequest = reply::parse_json(&raw)?;
        if request.candidate_intents.is_empty() {
            return Err(OracleError::MalformedReply(
                "clarification reply held no candidate intents".into(),
            ));
        }
        Ok(request)
    }

    async fn rewrite(&self, user_text: &str) -> Result<RewriteReply, OracleError> {
        let raw = self
            .oracle
            .generate(&prompts::rewrite(user_text), GenerateOptions::default())
            .await?;
        let rewritten: RewriteReply = reply::parse_json(&raw)?;
        if rewritten.rewritten_input.trim().is_empty() {
            return Err(OracleError::MalformedReply("empty rewritten input".into()));
        }
        Ok(rewritten)
    }

    async fn summarize(&self, history: &[Turn]) -> Result<String, OracleError> {
        self.oracle
            .generate(&prompts::summarize(history), GenerateOptions::default())
            .await
    }

    async fn context_need(&self, user_text: &str, summary: &str) -> Result<bool, OracleError> {
        let raw = self
            .oracle
            .generate(
                &prompts::context_need(user_text, summary),
                GenerateOptions::short(),
            )
            .await?;
        reply::parse_yes_no(&raw)
    }
}

fn normalized_eq(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Walk the history newest to oldest, keeping turns while the running
/// character total stays within the budget, then emit role-tagged
/// messages in chronological order.
fn truncate(history: &[Turn], budget_chars: usize) -> Vec<ContextMessage> {
    let mut kept = 0;
    let mut total = 0;
    for turn in history.iter().rev() {
        let len = turn.render().chars().count();
        if total + len > budget_chars {
            break;
        }
        total += len;
        kept += 1;
    }

    history[history.len() - kept..]
        .iter()
        .flat_map(|turn| {
            [
                ContextMessage::user(&turn.user_text),
                ContextMessage::assistant(&turn.assistant_text),
            ]
        })
        .collect()
}
