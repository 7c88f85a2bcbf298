pub mod deliver;
pub mod evaluate;
pub mod init;
pub mod inspect;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use quizforge_core::traits::Renderer;
use quizforge_core::DeliveryConfig;

/// Load configuration and build the renderer it names.
fn renderer_from_config(config_path: Option<&Path>) -> Result<(Arc<dyn Renderer>, DeliveryConfig)> {
    let config = quizforge_providers::config::load_config_from(config_path)?;
    let renderer: Arc<dyn Renderer> =
        Arc::from(quizforge_providers::create_renderer(&config.renderer));
    tracing::debug!(renderer = renderer.name(), "renderer ready");
    Ok((renderer, config.delivery))
}
