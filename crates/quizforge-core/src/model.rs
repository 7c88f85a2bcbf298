//! Core data model types for quizforge.
//!
//! An [`AssessmentDocument`] is built once per resource and never mutated.
//! Construction builds an index so the evaluator can look up questions,
//! interactions and page numbers without scanning the tree.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Identity of the resource an assessment belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// An immutable, indexed assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "DocumentSource", into = "DocumentSource")]
pub struct AssessmentDocument {
    resource: ResourceRef,
    pages: Vec<Page>,
    index: DocumentIndex,
}

/// Serialized shape of a document, without the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentSource {
    resource: ResourceRef,
    #[serde(default)]
    pages: Vec<Page>,
}

impl From<DocumentSource> for AssessmentDocument {
    fn from(source: DocumentSource) -> Self {
        AssessmentDocument::new(source.resource, source.pages)
    }
}

impl From<AssessmentDocument> for DocumentSource {
    fn from(document: AssessmentDocument) -> Self {
        DocumentSource {
            resource: document.resource,
            pages: document.pages,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct DocumentIndex {
    questions: HashMap<String, QuestionSlot>,
}

#[derive(Debug, Clone)]
struct QuestionSlot {
    /// 0-based page position.
    page: usize,
    /// 0-based node position within the page.
    node: usize,
    /// Document order across all questions.
    ordinal: usize,
    interactions: HashMap<String, usize>,
}

impl AssessmentDocument {
    pub fn new(resource: ResourceRef, pages: Vec<Page>) -> Self {
        let mut index = DocumentIndex::default();
        let mut ordinal = 0;

        for (page_pos, page) in pages.iter().enumerate() {
            for (node_pos, node) in page.nodes.iter().enumerate() {
                let Node::Question(question) = node else {
                    continue;
                };

                if index.questions.contains_key(&question.id) {
                    tracing::warn!(
                        "duplicate question id '{}' on page '{}', keeping first occurrence",
                        question.id,
                        page.id
                    );
                    continue;
                }

                let mut interactions = HashMap::new();
                for (pos, interaction) in question.interactions.iter().enumerate() {
                    interactions.entry(interaction.id.clone()).or_insert(pos);
                }

                index.questions.insert(
                    question.id.clone(),
                    QuestionSlot {
                        page: page_pos,
                        node: node_pos,
                        ordinal,
                        interactions,
                    },
                );
                ordinal += 1;
            }
        }

        Self {
            resource,
            pages,
            index,
        }
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Clamp a requested 1-based page number to `[1, page_count]`.
    ///
    /// Returns `None` for a document without pages.
    pub fn clamp_page_number(&self, requested: i64) -> Option<usize> {
        if self.pages.is_empty() {
            return None;
        }
        let count = self.pages.len() as i64;
        Some(requested.clamp(1, count) as usize)
    }

    /// Page by 1-based number.
    pub fn page(&self, number: usize) -> Option<&Page> {
        number.checked_sub(1).and_then(|i| self.pages.get(i))
    }

    /// Question by its exact authored id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.index.questions.get(id).and_then(|slot| self.slot_question(slot))
    }

    /// Resolve a runtime-composite id (e.g. `q1_x7Hk2`) to its question.
    ///
    /// The first question in document order whose id is a prefix of
    /// `composite_id` wins.
    pub fn find_question(&self, composite_id: &str) -> Option<&Question> {
        composite_id
            .char_indices()
            .map(|(i, c)| &composite_id[..i + c.len_utf8()])
            .filter_map(|prefix| self.index.questions.get(prefix))
            .min_by_key(|slot| slot.ordinal)
            .and_then(|slot| self.slot_question(slot))
    }

    /// Interaction by id within the given question.
    pub fn interaction(&self, question_id: &str, interaction_id: &str) -> Option<&Interaction> {
        let slot = self.index.questions.get(question_id)?;
        let pos = slot.interactions.get(interaction_id)?;
        self.slot_question(slot)?.interactions.get(*pos)
    }

    /// 1-based number of the page that contains the question.
    pub fn page_number_of(&self, question_id: &str) -> Option<usize> {
        self.index.questions.get(question_id).map(|slot| slot.page + 1)
    }

    /// All questions in document order, paired with their 1-based page number.
    pub fn questions(&self) -> impl Iterator<Item = (usize, &Question)> {
        self.pages.iter().enumerate().flat_map(|(i, page)| {
            page.questions().map(move |question| (i + 1, question))
        })
    }

    fn slot_question(&self, slot: &QuestionSlot) -> Option<&Question> {
        match self.pages.get(slot.page)?.nodes.get(slot.node)? {
            Node::Question(question) => Some(question),
            _ => None,
        }
    }
}

/// One page of an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Page {
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Question(question) => Some(question),
            _ => None,
        })
    }
}

/// A page node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Content(Content),
    Question(Question),
    Section(Section),
    Selection(Selection),
    QuestionBankRef(QuestionBankRef),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Content(_) => NodeKind::Content,
            Node::Question(_) => NodeKind::Question,
            Node::Section(_) => NodeKind::Section,
            Node::Selection(_) => NodeKind::Selection,
            Node::QuestionBankRef(_) => NodeKind::QuestionBankRef,
        }
    }
}

/// Discriminant of [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Content,
    Question,
    Section,
    Selection,
    QuestionBankRef,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Content => write!(f, "content"),
            NodeKind::Question => write!(f, "question"),
            NodeKind::Section => write!(f, "section"),
            NodeKind::Selection => write!(f, "selection"),
            NodeKind::QuestionBankRef => write!(f, "question_bank_ref"),
        }
    }
}

/// Static material between questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Draws questions from a pool at delivery time. Not expanded by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub id: String,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBankRef {
    pub id: String,
    pub bank_id: String,
}

/// A question: interactions the learner answers and parts that score them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Supported interaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStyle {
    #[serde(alias = "multiplechoice")]
    MultipleChoice,
    Ordering,
    Text,
    Numeric,
    #[serde(alias = "fill_in_blank")]
    FillInTheBlank,
    Essay,
    #[serde(alias = "short")]
    ShortAnswer,
    #[serde(alias = "hotspot")]
    ImageHotspot,
}

impl fmt::Display for InteractionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionStyle::MultipleChoice => write!(f, "multiple_choice"),
            InteractionStyle::Ordering => write!(f, "ordering"),
            InteractionStyle::Text => write!(f, "text"),
            InteractionStyle::Numeric => write!(f, "numeric"),
            InteractionStyle::FillInTheBlank => write!(f, "fill_in_the_blank"),
            InteractionStyle::Essay => write!(f, "essay"),
            InteractionStyle::ShortAnswer => write!(f, "short_answer"),
            InteractionStyle::ImageHotspot => write!(f, "image_hotspot"),
        }
    }
}

impl FromStr for InteractionStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "multiple_choice" | "multiplechoice" => Ok(InteractionStyle::MultipleChoice),
            "ordering" => Ok(InteractionStyle::Ordering),
            "text" => Ok(InteractionStyle::Text),
            "numeric" => Ok(InteractionStyle::Numeric),
            "fill_in_the_blank" | "fill_in_blank" => Ok(InteractionStyle::FillInTheBlank),
            "essay" => Ok(InteractionStyle::Essay),
            "short_answer" | "short" => Ok(InteractionStyle::ShortAnswer),
            "image_hotspot" | "hotspot" => Ok(InteractionStyle::ImageHotspot),
            other => Err(format!("unknown interaction style: {other}")),
        }
    }
}

/// Whether the learner may pick one or several values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectMode {
    Single,
    Multiple,
}

/// Client widget used to render an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputComponent {
    Default,
    Checkbox,
}

/// A single answerable input element of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: String,
    pub style: InteractionStyle,
    #[serde(default)]
    pub multiple_select: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hotspots: Vec<Hotspot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_value: Option<String>,
}

impl Interaction {
    pub fn select_mode(&self) -> SelectMode {
        if self.style == InteractionStyle::ImageHotspot || self.multiple_select {
            SelectMode::Multiple
        } else {
            SelectMode::Single
        }
    }

    pub fn input_component(&self) -> InputComponent {
        match self.style {
            InteractionStyle::ImageHotspot => InputComponent::Checkbox,
            _ => InputComponent::Default,
        }
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive.unwrap_or(false)
    }

    /// Values a learner may select, if the interaction declares any.
    ///
    /// Hotspot interactions answer with hotspot values, all others with
    /// choice values.
    pub fn known_values(&self) -> Option<Vec<&str>> {
        let values: Vec<&str> = match self.style {
            InteractionStyle::ImageHotspot => {
                self.hotspots.iter().map(|h| h.value.as_str()).collect()
            }
            _ => self.choices.iter().map(|c| c.value.as_str()).collect(),
        };
        (!values.is_empty()).then_some(values)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub body: String,
}

/// A clickable region of an image hotspot interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub value: String,
    #[serde(default = "default_shape")]
    pub shape: String,
    pub coordinates: String,
    #[serde(default)]
    pub label: String,
}

fn default_shape() -> String {
    "rect".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// A scoring unit within a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: String,
    /// Evaluated in authored order.
    #[serde(default)]
    pub response_conditions: Vec<ResponseCondition>,
    #[serde(default)]
    pub hints: Vec<Hint>,
    #[serde(default)]
    pub explanation: Option<Explanation>,
}

impl Part {
    /// Explanation material, if any non-blank explanation is authored.
    pub fn explanation_body(&self) -> Option<&str> {
        self.explanation
            .as_ref()
            .map(|e| e.body.as_str())
            .filter(|body| !body.trim().is_empty())
    }

    /// Whether any condition of this part reads the given interaction.
    pub fn touches(&self, interaction_id: &str) -> bool {
        self.response_conditions
            .iter()
            .any(|c| c.criteria.interaction_id == interaction_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hint {
    #[serde(default)]
    pub id: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default)]
    pub body: String,
}

/// An authored rule pairing a match pattern with an outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseCondition {
    pub criteria: Criteria,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    pub interaction_id: String,
    /// `None` matches any response.
    #[serde(default, rename = "match")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub feedbacks: Vec<Feedback>,
}

impl Outcome {
    pub fn is_correct(&self) -> bool {
        self.score > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// A learner's answer for one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedResponse {
    /// Interaction id.
    pub input: String,
    pub value: String,
}

impl SubmittedResponse {
    pub fn new(input: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            value: value.into(),
        }
    }
}
