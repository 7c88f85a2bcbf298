//! quizforge-core — Assessment delivery and response evaluation.
//!
//! This crate defines the unified document model, the per-style response
//! matchers, the response evaluator and the delivery assembler. Rendering
//! and id generation are injected through the traits in [`traits`] and
//! [`ids`].

pub mod attempt;
pub mod delivery;
pub mod error;
pub mod evaluator;
pub mod ids;
pub mod matching;
pub mod model;
pub mod parser;
pub mod traits;

pub use delivery::{DeliveryAssembler, DeliveryConfig, DeliveryMode, DeliveryPayload};
pub use error::{EngineError, MatchError, RenderError};
pub use evaluator::ResponseEvaluator;
pub use model::{AssessmentDocument, SubmittedResponse};
