//! Mock renderer for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use quizforge_core::traits::{RenderContext, Renderer};
use quizforge_core::RenderError;

/// A renderer that records what it is asked to render.
///
/// Output is the raw material with an optional prefix. A failure trigger
/// makes every call whose material contains it return an error.
#[derive(Default)]
pub struct MockRenderer {
    prefix: String,
    fail_on: Option<String>,
    call_count: AtomicU32,
    last_input: Mutex<Option<String>>,
}

impl MockRenderer {
    /// A mock that returns material unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that prepends `prefix` to everything it renders.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Self::default()
        }
    }

    /// A mock that fails on material containing `trigger`.
    pub fn failing_on(trigger: &str) -> Self {
        Self {
            fail_on: Some(trigger.to_string()),
            ..Self::default()
        }
    }

    /// Number of render calls made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The most recent material passed in.
    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().ok().and_then(|last| last.clone())
    }
}

impl Renderer for MockRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    fn render(&self, _ctx: &RenderContext<'_>, raw: &str) -> Result<String, RenderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_input.lock() {
            *last = Some(raw.to_string());
        }

        if let Some(trigger) = &self.fail_on {
            if raw.contains(trigger.as_str()) {
                return Err(RenderError::new(format!("mock failure on '{trigger}'")));
            }
        }

        Ok(format!("{}{raw}", self.prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use quizforge_core::ids::SequentialIds;
    use quizforge_core::model::{AssessmentDocument, Content, Node, Page, ResourceRef};
    use quizforge_core::{DeliveryAssembler, DeliveryConfig, DeliveryMode, EngineError};

    fn resource() -> ResourceRef {
        ResourceRef {
            id: "r".into(),
            title: "R".into(),
        }
    }

    fn ctx(resource: &ResourceRef) -> RenderContext<'_> {
        RenderContext {
            resource,
            server_url: "http://localhost",
            theme_id: "default",
        }
    }

    #[test]
    fn records_calls() {
        let renderer = MockRenderer::with_prefix("> ");
        let r = resource();

        assert_eq!(renderer.render(&ctx(&r), "one").unwrap(), "> one");
        assert_eq!(renderer.render(&ctx(&r), "two").unwrap(), "> two");
        assert_eq!(renderer.call_count(), 2);
        assert_eq!(renderer.last_input().as_deref(), Some("two"));
    }

    #[test]
    fn fails_on_trigger() {
        let renderer = MockRenderer::failing_on("BOOM");
        let r = resource();

        assert!(renderer.render(&ctx(&r), "fine").is_ok());
        let err = renderer.render(&ctx(&r), "<p>BOOM</p>").unwrap_err();
        assert!(err.message.contains("BOOM"));
        assert_eq!(renderer.call_count(), 2);
    }

    #[test]
    fn render_failure_aborts_assembly() {
        let document = AssessmentDocument::new(
            resource(),
            vec![Page {
                id: "p1".into(),
                title: "One".into(),
                nodes: vec![Node::Content(Content {
                    id: None,
                    body: "BOOM".into(),
                })],
            }],
        );
        let assembler = DeliveryAssembler::new(
            Arc::new(MockRenderer::failing_on("BOOM")),
            Arc::new(SequentialIds::new()),
            DeliveryConfig::default(),
        );

        let err = assembler
            .assemble(&document, 1, 1, DeliveryMode::Delivery)
            .unwrap_err();
        assert!(matches!(err, EngineError::Render(_)));
    }
}
