//! Clarification payload returned when an input is judged unclear.
//!
//! Terminal for the turn: no context is built and no answer is generated
//! until the user resubmits with one of the candidate intents (or more
//! detail).

use serde::{Deserialize, Serialize};

/// One guessed interpretation of an unclear input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateIntent {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// The catch-all "tell me more" option presented alongside the candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedMoreInfo {
    pub title: String,
    pub description: String,
}

/// What the pipeline hands back instead of an answer when the clarity
/// check says the input is not understandable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationRequest {
    pub candidate_intents: Vec<CandidateIntent>,
    pub need_more_info: NeedMoreInfo,
}

impl ClarificationRequest {
    /// The fixed two-item set substituted when the oracle's structured
    /// reply does not parse.
    pub fn fallback() -> Self {
        Self {
            candidate_intents: vec![
                CandidateIntent {
                    id: "question".into(),
                    title: "Ask a question".into(),
                    description: "You want an answer from the knowledge base".into(),
                },
                CandidateIntent {
                    id: "task".into(),
                    title: "Describe a task".into(),
                    description: "You want help working something out step by step".into(),
                },
            ],
            need_more_info: NeedMoreInfo {
                title: "Something else".into(),
                description: "Add a few more details so I can understand".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_has_two_candidates() {
        let req = ClarificationRequest::fallback();
        assert_eq!(req.candidate_intents.len(), 2);
        assert!(!req.need_more_info.title.is_empty());
    }

    #[test]
    fn roundtrips_through_json() {
        let req = ClarificationRequest::fallback();
        let json = serde_json::to_string(&req).unwrap();
        let back: ClarificationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.candidate_intents.len(), 2);
    }
}
