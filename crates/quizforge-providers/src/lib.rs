//! quizforge-providers — Rendering backends and configuration.
//!
//! Implements the core `Renderer` trait for plain passthrough, checked
//! markup with placeholder substitution, and a recording mock for tests.

pub mod config;
pub mod error;
pub mod markup;
pub mod mock;

pub use config::{create_renderer, load_config, QuizforgeConfig, RendererConfig};
pub use error::MarkupError;
pub use markup::{MarkupRenderer, PassthroughRenderer};
