//! Delivery payload assembly.
//!
//! Expands one page of an [`AssessmentDocument`] into the payload a client
//! renders, plus a pre-submission attempt scaffold.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::attempt::Progress;
use crate::error::{EngineError, RenderError};
use crate::ids::IdGenerator;
use crate::model::{
    AssessmentDocument, Image, InputComponent, Interaction, InteractionStyle, Node, NodeKind, Page,
    Part, Question, ResourceRef, SelectMode,
};
use crate::traits::{RenderContext, Renderer};

/// Settings shared by the assembler and the evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Base URL handed to the renderer for asset links.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Theme handed to the renderer.
    #[serde(default = "default_theme")]
    pub theme_id: String,
    /// Length of generated ids.
    #[serde(default = "default_id_length")]
    pub id_length: usize,
}

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_id_length() -> usize {
    12
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            theme_id: default_theme(),
            id_length: default_id_length(),
        }
    }
}

impl DeliveryConfig {
    pub fn render_context<'a>(&'a self, resource: &'a ResourceRef) -> RenderContext<'a> {
        RenderContext {
            resource,
            server_url: &self.server_url,
            theme_id: &self.theme_id,
        }
    }
}

/// Why the page is being delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// A learner taking the assessment.
    #[default]
    Delivery,
    /// A learner reviewing a submitted attempt.
    Review,
    /// An author previewing; no attempt scaffold is produced.
    Preview,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Delivery => write!(f, "delivery"),
            DeliveryMode::Review => write!(f, "review"),
            DeliveryMode::Preview => write!(f, "preview"),
        }
    }
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delivery" | "deliver" => Ok(DeliveryMode::Delivery),
            "review" => Ok(DeliveryMode::Review),
            "preview" => Ok(DeliveryMode::Preview),
            other => Err(format!("unknown delivery mode: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// Everything a client needs to show one page of an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPayload {
    pub delivery_id: String,
    pub resource: ResourceRef,
    pub mode: DeliveryMode,
    /// `None` when the document has no pages.
    pub page: Option<PageMeta>,
    pub page_progress: Vec<PageProgressMarker>,
    pub assessment_nodes: Vec<DeliveryNode>,
    pub attempt: Option<AttemptScaffold>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub number: usize,
    pub id: String,
    pub title: String,
    pub page_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProgressMarker {
    pub page_number: usize,
    pub page_id: String,
    pub progress: Progress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeliveryNode {
    Content(DeliveredContent),
    Question(DeliveredQuestion),
    /// Sections, selections and bank references, not rendered here.
    Passthrough(PassthroughNode),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredContent {
    pub id: String,
    /// Always `None`; content belongs to no question.
    pub question_id: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredQuestion {
    /// `<questionId>_<freshId>`; sent back by clients when submitting.
    pub id: String,
    pub question_id: String,
    /// 1-based position among the questions of the page.
    pub number: usize,
    pub title: Option<String>,
    pub body: String,
    pub interactions: Vec<DeliveredInteraction>,
    pub parts: Vec<DeliveredPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredInteraction {
    pub id: String,
    pub style: InteractionStyle,
    pub select: SelectMode,
    pub input_component: InputComponent,
    pub choices: Vec<DeliveredChoice>,
    pub hotspots: Vec<DeliveredHotspot>,
    pub image: Option<Image>,
    pub labels: Vec<String>,
    pub size: Option<String>,
    pub notation: Option<String>,
    pub case_sensitive: Option<bool>,
    pub override_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveredChoice {
    pub value: String,
    pub color: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveredHotspot {
    pub value: String,
    pub shape: String,
    pub coordinates: String,
    pub label: String,
}

/// Client view of a part. Response conditions stay on the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredPart {
    pub id: String,
    pub hints: Vec<DeliveredHint>,
    pub has_explanation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveredHint {
    pub id: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassthroughNode {
    pub id: String,
    pub kind: NodeKind,
    pub source: Node,
}

/// Pre-submission skeleton of attempt records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptScaffold {
    pub attempt_number: u32,
    pub question_attempts: Vec<QuestionAttemptStub>,
    /// One entry per part that has at least one hint.
    pub part_attempts: Vec<PartAttemptStub>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAttemptStub {
    pub id: String,
    pub question_id: String,
    pub delivered_id: String,
    pub number: usize,
    pub progress: Progress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartAttemptStub {
    pub id: String,
    pub question_id: String,
    pub part_id: String,
    pub hint_count: usize,
    pub hints_shown: usize,
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Builds delivery payloads. Holds no per-request state.
pub struct DeliveryAssembler {
    renderer: Arc<dyn Renderer>,
    ids: Arc<dyn IdGenerator>,
    config: DeliveryConfig,
}

impl DeliveryAssembler {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        ids: Arc<dyn IdGenerator>,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            renderer,
            ids,
            config,
        }
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Assemble the payload for one page.
    ///
    /// `page_number` is clamped to `[1, page_count]`. Any render failure
    /// aborts the whole call.
    pub fn assemble(
        &self,
        document: &AssessmentDocument,
        page_number: i64,
        attempt_number: u32,
        mode: DeliveryMode,
    ) -> Result<DeliveryPayload, EngineError> {
        let ctx = self.config.render_context(document.resource());

        let page_progress = document
            .pages()
            .iter()
            .enumerate()
            .map(|(i, page)| PageProgressMarker {
                page_number: i + 1,
                page_id: page.id.clone(),
                progress: Progress::NotStarted,
            })
            .collect();

        let mut payload = DeliveryPayload {
            delivery_id: self.fresh_id(),
            resource: document.resource().clone(),
            mode,
            page: None,
            page_progress,
            assessment_nodes: Vec::new(),
            attempt: (mode != DeliveryMode::Preview).then(|| AttemptScaffold {
                attempt_number,
                question_attempts: Vec::new(),
                part_attempts: Vec::new(),
            }),
        };

        let Some((number, page)) = document
            .clamp_page_number(page_number)
            .and_then(|n| document.page(n).map(|page| (n, page)))
        else {
            tracing::debug!("document '{}' has no pages", document.resource().id);
            return Ok(payload);
        };

        if i64::try_from(number).ok() != Some(page_number) {
            tracing::debug!("page {page_number} clamped to {number}");
        }

        payload.page = Some(PageMeta {
            number,
            id: page.id.clone(),
            title: page.title.clone(),
            page_count: document.page_count(),
        });

        self.expand_page(page, &ctx, &mut payload)?;

        tracing::debug!(
            "assembled page {number}/{} of '{}' ({} nodes)",
            document.page_count(),
            document.resource().id,
            payload.assessment_nodes.len()
        );

        Ok(payload)
    }

    fn expand_page(
        &self,
        page: &Page,
        ctx: &RenderContext<'_>,
        payload: &mut DeliveryPayload,
    ) -> Result<(), RenderError> {
        let mut question_number = 0;

        for node in &page.nodes {
            let delivered = match node {
                Node::Content(content) => DeliveryNode::Content(DeliveredContent {
                    id: self.fresh_id(),
                    question_id: None,
                    body: self.renderer.render(ctx, &content.body)?,
                }),
                Node::Question(question) => {
                    question_number += 1;
                    let delivered = self.deliver_question(question, question_number, ctx)?;
                    if let Some(scaffold) = payload.attempt.as_mut() {
                        self.scaffold_question(question, &delivered, scaffold);
                    }
                    DeliveryNode::Question(delivered)
                }
                Node::Section(section) => self.passthrough(&section.id, node),
                Node::Selection(selection) => self.passthrough(&selection.id, node),
                Node::QuestionBankRef(bank) => self.passthrough(&bank.id, node),
            };
            payload.assessment_nodes.push(delivered);
        }

        Ok(())
    }

    fn passthrough(&self, id: &str, node: &Node) -> DeliveryNode {
        DeliveryNode::Passthrough(PassthroughNode {
            id: id.to_string(),
            kind: node.kind(),
            source: node.clone(),
        })
    }

    fn deliver_question(
        &self,
        question: &Question,
        number: usize,
        ctx: &RenderContext<'_>,
    ) -> Result<DeliveredQuestion, RenderError> {
        let interactions = question
            .interactions
            .iter()
            .map(|i| self.deliver_interaction(i, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let parts = question
            .parts
            .iter()
            .map(|p| self.deliver_part(p, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DeliveredQuestion {
            id: format!("{}_{}", question.id, self.fresh_id()),
            question_id: question.id.clone(),
            number,
            title: question.title.clone(),
            body: self.renderer.render(ctx, &question.body)?,
            interactions,
            parts,
        })
    }

    fn deliver_interaction(
        &self,
        interaction: &Interaction,
        ctx: &RenderContext<'_>,
    ) -> Result<DeliveredInteraction, RenderError> {
        let choices = interaction
            .choices
            .iter()
            .map(|c| {
                Ok(DeliveredChoice {
                    value: c.value.clone(),
                    color: c.color.clone(),
                    body: self.renderer.render(ctx, &c.body)?,
                })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        let hotspots = interaction
            .hotspots
            .iter()
            .map(|h| {
                Ok(DeliveredHotspot {
                    value: h.value.clone(),
                    shape: h.shape.clone(),
                    coordinates: h.coordinates.clone(),
                    label: self.renderer.render(ctx, &h.label)?,
                })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        Ok(DeliveredInteraction {
            id: interaction.id.clone(),
            style: interaction.style,
            select: interaction.select_mode(),
            input_component: interaction.input_component(),
            choices,
            hotspots,
            image: interaction.image.clone(),
            labels: interaction.labels.clone(),
            size: interaction.size.clone(),
            notation: interaction.notation.clone(),
            case_sensitive: interaction.case_sensitive,
            override_value: interaction.override_value.clone(),
        })
    }

    fn deliver_part(&self, part: &Part, ctx: &RenderContext<'_>) -> Result<DeliveredPart, RenderError> {
        let hints = part
            .hints
            .iter()
            .map(|h| {
                Ok(DeliveredHint {
                    id: h.id.clone(),
                    body: self.renderer.render(ctx, &h.body)?,
                })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        Ok(DeliveredPart {
            id: part.id.clone(),
            hints,
            has_explanation: part.explanation_body().is_some(),
        })
    }

    fn scaffold_question(
        &self,
        question: &Question,
        delivered: &DeliveredQuestion,
        scaffold: &mut AttemptScaffold,
    ) {
        scaffold.question_attempts.push(QuestionAttemptStub {
            id: self.fresh_id(),
            question_id: question.id.clone(),
            delivered_id: delivered.id.clone(),
            number: delivered.number,
            progress: Progress::NotStarted,
        });

        for part in &question.parts {
            // Only parts with hints need attempt tracking before submission.
            if part.hints.is_empty() {
                continue;
            }
            scaffold.part_attempts.push(PartAttemptStub {
                id: self.fresh_id(),
                question_id: question.id.clone(),
                part_id: part.id.clone(),
                hint_count: part.hints.len(),
                hints_shown: 0,
            });
        }
    }

    fn fresh_id(&self) -> String {
        self.ids.fresh_id(self.config.id_length)
    }
}
