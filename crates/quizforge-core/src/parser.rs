//! Assessment document loading and validation.
//!
//! Documents arrive already normalized into the unified model, as JSON or
//! TOML. Validation flags authoring problems the engine would otherwise
//! only log at evaluation time.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::matching;
use crate::model::{AssessmentDocument, Node};

/// Serialization format of a document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "toml" => Some(DocumentFormat::Toml),
            _ => None,
        }
    }
}

/// Load a single document file.
pub fn load_document(path: &Path) -> Result<AssessmentDocument> {
    let format = DocumentFormat::from_path(path).with_context(|| {
        format!(
            "unsupported document extension (expected .json or .toml): {}",
            path.display()
        )
    })?;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document: {}", path.display()))?;

    parse_document_str(&content, format)
        .with_context(|| format!("failed to parse document: {}", path.display()))
}

/// Parse a document from a string (useful for testing).
pub fn parse_document_str(content: &str, format: DocumentFormat) -> Result<AssessmentDocument> {
    let document = match format {
        DocumentFormat::Json => serde_json::from_str(content).context("invalid JSON document")?,
        DocumentFormat::Toml => toml::from_str(content).context("invalid TOML document")?,
    };
    Ok(document)
}

/// Recursively load all `.json` and `.toml` documents from a directory.
///
/// Files that fail to parse are logged and skipped.
pub fn load_document_directory(dir: &Path) -> Result<Vec<AssessmentDocument>> {
    let mut documents = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            documents.extend(load_document_directory(&path)?);
        } else if DocumentFormat::from_path(&path).is_some() {
            match load_document(&path) {
                Ok(document) => documents.push(document),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(documents)
}

/// A warning from document validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Where the problem is, e.g. `q1/p2`.
    pub location: Option<String>,
    pub message: String,
}

impl ValidationWarning {
    fn at(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            message: message.into(),
        }
    }
}

/// Validate a document for common authoring issues.
pub fn validate_document(document: &AssessmentDocument) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if document.page_count() == 0 {
        warnings.push(ValidationWarning {
            location: None,
            message: "document has no pages".into(),
        });
    }

    // Pages without nodes
    for page in document.pages() {
        if page.nodes.is_empty() {
            warnings.push(ValidationWarning::at(&page.id, "page is empty"));
        }
    }

    // Duplicate question ids across pages
    let mut seen_questions = HashSet::new();
    for page in document.pages() {
        for node in &page.nodes {
            if let Node::Question(question) = node {
                if !seen_questions.insert(question.id.as_str()) {
                    warnings.push(ValidationWarning::at(
                        &question.id,
                        format!("duplicate question id: {}", question.id),
                    ));
                }
            }
        }
    }

    for (_, question) in document.questions() {
        let mut seen_interactions = HashSet::new();
        for interaction in &question.interactions {
            if !seen_interactions.insert(interaction.id.as_str()) {
                warnings.push(ValidationWarning::at(
                    &question.id,
                    format!("duplicate interaction id: {}", interaction.id),
                ));
            }
        }

        let mut seen_parts = HashSet::new();
        for part in &question.parts {
            let location = format!("{}/{}", question.id, part.id);

            if !seen_parts.insert(part.id.as_str()) {
                warnings.push(ValidationWarning::at(
                    &location,
                    format!("duplicate part id: {}", part.id),
                ));
            }

            if part.response_conditions.is_empty() {
                warnings.push(ValidationWarning::at(&location, "part has no response conditions"));
                continue;
            }

            if !part.response_conditions.iter().any(|c| c.outcome.is_correct()) {
                warnings.push(ValidationWarning::at(
                    &location,
                    "no response condition has a positive score",
                ));
            }

            for (i, condition) in part.response_conditions.iter().enumerate() {
                let interaction_id = &condition.criteria.interaction_id;
                let Some(interaction) = document.interaction(&question.id, interaction_id) else {
                    warnings.push(ValidationWarning::at(
                        &location,
                        format!("condition #{} references unknown interaction '{interaction_id}'", i + 1),
                    ));
                    continue;
                };

                if let Some(pattern) = &condition.criteria.pattern {
                    if let Err(e) = matching::check_pattern(interaction, pattern) {
                        warnings.push(ValidationWarning::at(
                            &location,
                            format!("condition #{}: {e}", i + 1),
                        ));
                    }
                }
            }
        }
    }

    warnings
}
