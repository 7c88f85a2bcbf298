//! Attempt records synthesized per request.
//!
//! None of these are persisted here. They are built fresh for each call and
//! handed to the caller.

use serde::{Deserialize, Serialize};

use crate::model::Feedback;

/// Progress marker for a page or question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Progress {
    NotStarted,
    Started,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProgress {
    pub page_number: usize,
    pub progress: Progress,
}

/// Score record of a part attempt.
///
/// Point totals are left to the grading layer; only the flags are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartScore {
    pub correct: bool,
    pub no_response: bool,
    pub awarded: Option<f64>,
    pub out_of: Option<f64>,
}

/// Result of evaluating one submitted response against one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartAttempt {
    pub id: String,
    pub part_id: String,
    /// Interaction the response was submitted for.
    pub target_input: String,
    pub correct: Option<bool>,
    pub no_response: Option<bool>,
    pub feedbacks: Vec<Feedback>,
    pub feedback_visible: bool,
    /// Authored score of the condition that produced this result.
    pub outcome_score: Option<f64>,
    pub score: Option<PartScore>,
    pub explanation_body: Option<String>,
}

impl PartAttempt {
    pub fn new(id: String, part_id: &str, target_input: &str) -> Self {
        Self {
            id,
            part_id: part_id.to_string(),
            target_input: target_input.to_string(),
            correct: None,
            no_response: None,
            feedbacks: Vec::new(),
            feedback_visible: false,
            outcome_score: None,
            score: None,
            explanation_body: None,
        }
    }

    /// Whether any response condition has written a result.
    pub fn is_evaluated(&self) -> bool {
        self.outcome_score.is_some()
    }
}

/// Evaluation result for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAttempt {
    pub question_id: String,
    pub attempt_number: u32,
    pub part_attempts: Vec<PartAttempt>,
    pub page_progress: PageProgress,
}

impl QuestionAttempt {
    /// `true` when every evaluated part attempt is correct and at least one was evaluated.
    pub fn is_fully_correct(&self) -> bool {
        let mut evaluated = self
            .part_attempts
            .iter()
            .filter(|p| p.is_evaluated())
            .peekable();
        evaluated.peek().is_some() && evaluated.all(|p| p.correct == Some(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_serializes_screaming_case() {
        let json = serde_json::to_string(&Progress::NotStarted).unwrap();
        assert_eq!(json, "\"NOT_STARTED\"");
        let json = serde_json::to_string(&PageProgress {
            page_number: 2,
            progress: Progress::Started,
        })
        .unwrap();
        assert_eq!(json, r#"{"pageNumber":2,"progress":"STARTED"}"#);
    }

    #[test]
    fn fresh_part_attempt_is_unevaluated() {
        let attempt = PartAttempt::new("p1_1_1".into(), "p1", "i1");
        assert!(!attempt.is_evaluated());
        assert!(attempt.correct.is_none());
        assert!(!attempt.feedback_visible);
        assert!(attempt.feedbacks.is_empty());
    }

    #[test]
    fn fully_correct_needs_an_evaluated_part() {
        let mut question = QuestionAttempt {
            question_id: "q1".into(),
            attempt_number: 1,
            part_attempts: vec![PartAttempt::new("a".into(), "p1", "i1")],
            page_progress: PageProgress {
                page_number: 1,
                progress: Progress::Started,
            },
        };
        assert!(!question.is_fully_correct());

        let part = &mut question.part_attempts[0];
        part.correct = Some(true);
        part.outcome_score = Some(1.0);
        assert!(question.is_fully_correct());
    }
}
