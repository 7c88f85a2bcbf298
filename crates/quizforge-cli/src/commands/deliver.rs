//! The `quizforge deliver` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use quizforge_core::ids::{IdGenerator, RandomIds, SequentialIds};
use quizforge_core::parser::load_document;
use quizforge_core::{DeliveryAssembler, DeliveryMode};

pub fn execute(
    document_path: PathBuf,
    page: i64,
    attempt: u32,
    mode: String,
    sequential_ids: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mode: DeliveryMode = mode.parse().map_err(|e: String| anyhow!(e))?;
    let document = load_document(&document_path)?;
    let (renderer, config) = super::renderer_from_config(config_path.as_deref())?;

    let ids: Arc<dyn IdGenerator> = if sequential_ids {
        Arc::new(SequentialIds::new())
    } else {
        Arc::new(RandomIds)
    };

    let assembler = DeliveryAssembler::new(renderer, ids, config);
    let payload = assembler.assemble(&document, page, attempt, mode)?;

    tracing::info!(
        "delivered page {} of {} for '{}'",
        payload.page.as_ref().map(|p| p.number).unwrap_or(0),
        document.page_count(),
        document.resource().id
    );

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
