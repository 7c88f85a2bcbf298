//! Configuration loading and renderer factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizforge_core::traits::Renderer;
use quizforge_core::DeliveryConfig;

use crate::markup::{MarkupRenderer, PassthroughRenderer, DEFAULT_ASSET_PREFIX};

/// Which renderer delivery and evaluation use for rich text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RendererConfig {
    Passthrough,
    Markup {
        #[serde(default = "default_true")]
        check_balance: bool,
        #[serde(default = "default_asset_prefix")]
        asset_prefix: String,
    },
}

impl Default for RendererConfig {
    fn default() -> Self {
        RendererConfig::Markup {
            check_balance: true,
            asset_prefix: default_asset_prefix(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_asset_prefix() -> String {
    DEFAULT_ASSET_PREFIX.to_string()
}

/// Top-level quizforge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizforgeConfig {
    /// Server URL, theme and id length.
    #[serde(flatten)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(pos) = result[from..].find("${") {
        let start = from + pos;
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + len]).unwrap_or_default();
        result.replace_range(start..start + len + 1, &value);
        from = start + value.len();
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// Environment overrides: `QUIZFORGE_SERVER_URL`, `QUIZFORGE_THEME`.
pub fn load_config() -> Result<QuizforgeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizforgeConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizforge.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => QuizforgeConfig::default(),
    };

    if let Ok(url) = std::env::var("QUIZFORGE_SERVER_URL") {
        config.delivery.server_url = url;
    }
    if let Ok(theme) = std::env::var("QUIZFORGE_THEME") {
        config.delivery.theme_id = theme;
    }

    config.delivery.server_url = resolve_env_vars(&config.delivery.server_url);
    config.delivery.theme_id = resolve_env_vars(&config.delivery.theme_id);
    if let RendererConfig::Markup { asset_prefix, .. } = &mut config.renderer {
        *asset_prefix = resolve_env_vars(asset_prefix);
    }

    Ok(config)
}

/// Parse a config file's contents.
pub fn parse_config_str(content: &str) -> Result<QuizforgeConfig> {
    let config: QuizforgeConfig = toml::from_str(content)?;
    if config.delivery.id_length == 0 {
        anyhow::bail!("id_length must be at least 1");
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}

/// Create a renderer instance from its configuration.
pub fn create_renderer(config: &RendererConfig) -> Box<dyn Renderer> {
    match config {
        RendererConfig::Passthrough => Box::new(PassthroughRenderer),
        RendererConfig::Markup {
            check_balance,
            asset_prefix,
        } => Box::new(
            MarkupRenderer::new()
                .with_balance_check(*check_balance)
                .with_asset_prefix(asset_prefix.clone()),
        ),
    }
}
