//! The `quizforge evaluate` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use quizforge_core::parser::load_document;
use quizforge_core::{ResponseEvaluator, SubmittedResponse};

pub fn execute(
    document_path: PathBuf,
    question: String,
    responses_path: Option<PathBuf>,
    inline: Vec<String>,
    attempt: u32,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut responses = match &responses_path {
        Some(path) => read_responses(path)?,
        None => Vec::new(),
    };
    for entry in &inline {
        responses.push(parse_inline(entry)?);
    }
    if responses.is_empty() {
        anyhow::bail!("no responses given; use --responses FILE or --response INPUT=VALUE");
    }

    let document = load_document(&document_path)?;
    let (renderer, config) = super::renderer_from_config(config_path.as_deref())?;
    let evaluator = ResponseEvaluator::new(renderer, config);

    match evaluator.evaluate(&document, &question, attempt, &responses) {
        Ok(result) => {
            let correct = result
                .part_attempts
                .iter()
                .filter(|p| p.correct == Some(true))
                .count();
            tracing::info!(
                "evaluated '{}': {correct}/{} part attempt(s) correct",
                result.question_id,
                result.part_attempts.len()
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            let body = serde_json::json!({
                "error": { "code": e.code(), "message": e.to_string() }
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
    }
}

fn read_responses(path: &Path) -> Result<Vec<SubmittedResponse>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read responses: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse responses: {}", path.display()))
}

fn parse_inline(entry: &str) -> Result<SubmittedResponse> {
    let (input, value) = entry
        .split_once('=')
        .with_context(|| format!("expected INPUT=VALUE, got '{entry}'"))?;
    Ok(SubmittedResponse::new(input.trim(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_response_splits_on_first_equals() {
        let r = parse_inline("n1=[1,2]=x").unwrap();
        assert_eq!(r, SubmittedResponse::new("n1", "[1,2]=x"));
        assert!(parse_inline("no-separator").is_err());
    }
}
