//! Response evaluation.
//!
//! Walks a question's parts and their response conditions in authored
//! order, runs the matcher for each applicable condition and folds the
//! matches into one [`PartAttempt`] per (response, part) pair.
//!
//! Per part attempt, the first match always writes. After that a match
//! only overwrites when it is correct and its score is strictly higher
//! than the recorded one, so a correct result never regresses and the
//! highest-scoring correct condition wins regardless of order.

use std::sync::Arc;

use crate::attempt::{PageProgress, PartAttempt, PartScore, Progress, QuestionAttempt};
use crate::delivery::DeliveryConfig;
use crate::error::{EngineError, RenderError};
use crate::matching;
use crate::model::{AssessmentDocument, Feedback, Interaction, Outcome, Part, SubmittedResponse};
use crate::traits::{RenderContext, Renderer};

/// Evaluates submitted responses. Holds no per-request state.
pub struct ResponseEvaluator {
    renderer: Arc<dyn Renderer>,
    config: DeliveryConfig,
}

impl ResponseEvaluator {
    pub fn new(renderer: Arc<dyn Renderer>, config: DeliveryConfig) -> Self {
        Self { renderer, config }
    }

    /// Evaluate `responses` against the question identified by `question_id`.
    ///
    /// `question_id` may be a delivered composite id; the first question in
    /// document order whose id is a prefix of it is used.
    pub fn evaluate(
        &self,
        document: &AssessmentDocument,
        question_id: &str,
        attempt_number: u32,
        responses: &[SubmittedResponse],
    ) -> Result<QuestionAttempt, EngineError> {
        let not_found = || {
            tracing::warn!("no question matches id '{question_id}'");
            EngineError::QuestionNotFound {
                question_id: question_id.to_string(),
            }
        };
        let question = document.find_question(question_id).ok_or_else(not_found)?;
        let page_number = document.page_number_of(&question.id).ok_or_else(not_found)?;

        let ctx = self.config.render_context(document.resource());
        let mut part_attempts = Vec::new();

        for (ordinal, response) in responses.iter().enumerate() {
            let interaction = document.interaction(&question.id, &response.input);
            if interaction.is_none() {
                tracing::warn!(
                    "question '{}' has no interaction '{}', conditions on it cannot match",
                    question.id,
                    response.input
                );
            }

            for part in question.parts.iter().filter(|p| p.touches(&response.input)) {
                let id = format!("{}_{}_{}", part.id, attempt_number, ordinal + 1);
                let attempt = self.evaluate_part(id, part, interaction, response, &ctx)?;
                part_attempts.push(attempt);
            }
        }

        tracing::debug!(
            "evaluated {} response(s) for '{}': {} part attempt(s)",
            responses.len(),
            question.id,
            part_attempts.len()
        );

        Ok(QuestionAttempt {
            question_id: question.id.clone(),
            attempt_number,
            part_attempts,
            page_progress: PageProgress {
                page_number,
                progress: Progress::Started,
            },
        })
    }

    fn evaluate_part(
        &self,
        id: String,
        part: &Part,
        interaction: Option<&Interaction>,
        response: &SubmittedResponse,
        ctx: &RenderContext<'_>,
    ) -> Result<PartAttempt, RenderError> {
        let mut attempt = PartAttempt::new(id, &part.id, &response.input);

        let Some(interaction) = interaction else {
            return Ok(attempt);
        };

        let applicable = part
            .response_conditions
            .iter()
            .enumerate()
            .filter(|(_, c)| c.criteria.interaction_id == response.input);

        for (position, condition) in applicable {
            let pattern = condition.criteria.pattern.as_deref();
            let matched = match matching::matches(interaction, pattern, &response.value) {
                Ok(matched) => matched,
                Err(e) => {
                    tracing::warn!(
                        "part '{}' condition #{} skipped for '{}': {e}",
                        part.id,
                        position + 1,
                        interaction.id
                    );
                    continue;
                }
            };
            if !matched {
                continue;
            }

            let outcome = &condition.outcome;
            if !supersedes(&attempt, outcome) {
                tracing::debug!(
                    "part '{}' condition #{} matched but keeps score {:?}",
                    part.id,
                    position + 1,
                    attempt.outcome_score
                );
                continue;
            }

            tracing::debug!(
                "part '{}' condition #{} matched with score {}",
                part.id,
                position + 1,
                outcome.score
            );
            self.record(&mut attempt, part, outcome, ctx)?;
        }

        Ok(attempt)
    }

    fn record(
        &self,
        attempt: &mut PartAttempt,
        part: &Part,
        outcome: &Outcome,
        ctx: &RenderContext<'_>,
    ) -> Result<(), RenderError> {
        let correct = outcome.is_correct();
        attempt.correct = Some(correct);
        attempt.no_response = Some(false);
        attempt.outcome_score = Some(outcome.score);
        attempt.score = Some(PartScore {
            correct,
            no_response: false,
            awarded: None,
            out_of: None,
        });

        match part.explanation_body() {
            Some(explanation) => {
                attempt.explanation_body = Some(self.renderer.render(ctx, explanation)?);
                attempt.feedbacks.clear();
                attempt.feedback_visible = false;
            }
            None => {
                attempt.feedbacks = outcome
                    .feedbacks
                    .iter()
                    .map(|f| {
                        Ok(Feedback {
                            body: self.renderer.render(ctx, &f.body)?,
                            lang: f.lang.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, RenderError>>()?;
                attempt.feedback_visible = true;
            }
        }

        Ok(())
    }
}

/// Whether a newly matched outcome replaces what the attempt already holds.
fn supersedes(attempt: &PartAttempt, outcome: &Outcome) -> bool {
    match attempt.outcome_score {
        None => true,
        Some(recorded) => outcome.is_correct() && outcome.score > recorded,
    }
}
