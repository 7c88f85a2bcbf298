//! Engine error types.
//!
//! Matching errors are recovered per response condition by the evaluator.
//! Lookup and rendering errors abort the whole request.

use thiserror::Error;

/// Failure raised by the render collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("render failed: {message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A pattern or submitted value that could not be parsed for an interaction style.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The authored match pattern is malformed.
    #[error("malformed pattern '{pattern}': {reason}")]
    PatternFormat { pattern: String, reason: String },

    /// The learner's submitted value is malformed.
    #[error("malformed input '{value}': {reason}")]
    InputFormat { value: String, reason: String },
}

impl MatchError {
    pub fn pattern(pattern: &str, reason: impl Into<String>) -> Self {
        MatchError::PatternFormat {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub fn input(value: &str, reason: impl Into<String>) -> Self {
        MatchError::InputFormat {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the authored pattern, not the learner, is at fault.
    pub fn is_authoring_error(&self) -> bool {
        matches!(self, MatchError::PatternFormat { .. })
    }
}

/// Request-level failures of the assembler and evaluator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No question id in the document is a prefix of the requested id.
    #[error("question not found: {question_id}")]
    QuestionNotFound { question_id: String },

    /// The render collaborator failed; no partial result is produced.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl EngineError {
    /// Stable machine-readable code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::QuestionNotFound { .. } => "QUESTION_NOT_FOUND",
            EngineError::Render(_) => "RENDER_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_error_messages() {
        let err = MatchError::pattern("[3,1]", "lower bound exceeds upper bound");
        assert_eq!(
            err.to_string(),
            "malformed pattern '[3,1]': lower bound exceeds upper bound"
        );
        assert!(err.is_authoring_error());
        assert!(!MatchError::input("abc", "not a number").is_authoring_error());
    }

    #[test]
    fn render_error_converts_into_engine_error() {
        let err: EngineError = RenderError::new("unclosed <p>").into();
        assert_eq!(err.code(), "RENDER_ERROR");
        assert_eq!(err.to_string(), "render failed: unclosed <p>");
    }
}
