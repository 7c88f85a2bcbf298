//! Renderer error types.

use quizforge_core::RenderError;
use thiserror::Error;

/// Errors raised while rendering rich-text markup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    /// A tag was opened and never closed.
    #[error("unclosed tag <{tag}>")]
    UnclosedTag { tag: String },

    /// A closing tag does not match the innermost open tag.
    #[error("expected </{expected}>, found </{found}>")]
    MismatchedTag { expected: String, found: String },

    /// A closing tag with nothing open.
    #[error("unexpected closing tag </{tag}>")]
    UnexpectedClosingTag { tag: String },

    /// A `<` without a matching `>`.
    #[error("unterminated tag at byte {offset}")]
    UnterminatedTag { offset: usize },

    /// A `{{name}}` placeholder the renderer does not know.
    #[error("unknown placeholder {{{{{0}}}}}")]
    UnknownPlaceholder(String),
}

impl From<MarkupError> for RenderError {
    fn from(err: MarkupError) -> Self {
        RenderError::new(err.to_string())
    }
}
