//! Collaborator traits consumed by the assembler and evaluator.
//!
//! Implementations live in `quizforge-providers`.

use crate::error::RenderError;
use crate::model::ResourceRef;

// ---------------------------------------------------------------------------
// Renderer trait
// ---------------------------------------------------------------------------

/// Context passed alongside every piece of raw material.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub resource: &'a ResourceRef,
    pub server_url: &'a str,
    pub theme_id: &'a str,
}

/// Transforms raw rich-text material into final markup.
///
/// Called synchronously; callers wanting a timeout wrap the renderer.
pub trait Renderer: Send + Sync {
    /// Human-readable renderer name (e.g. "markup").
    fn name(&self) -> &str;

    fn render(&self, ctx: &RenderContext<'_>, raw: &str) -> Result<String, RenderError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Wraps material in brackets so tests can see what went through the renderer.
    pub struct BracketRenderer;

    impl Renderer for BracketRenderer {
        fn name(&self) -> &str {
            "bracket"
        }

        fn render(&self, _ctx: &RenderContext<'_>, raw: &str) -> Result<String, RenderError> {
            Ok(format!("[{raw}]"))
        }
    }

    /// Fails on any material containing the trigger text.
    pub struct FailingRenderer(pub &'static str);

    impl Renderer for FailingRenderer {
        fn name(&self) -> &str {
            "failing"
        }

        fn render(&self, _ctx: &RenderContext<'_>, raw: &str) -> Result<String, RenderError> {
            if raw.contains(self.0) {
                Err(RenderError::new(format!("cannot render '{raw}'")))
            } else {
                Ok(raw.to_string())
            }
        }
    }
}
