//! Configuration provider using Figment

use crate::{
    error::{ConfigError, ConfigResult},
    types::BoardConfig,
};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Prefix for environment variable overrides (`WORKBOARD_UNASSIGNED_LABEL`, ...)
pub const ENV_PREFIX: &str = "WORKBOARD_";

/// Configuration provider
///
/// No caching is performed; every [`load`](Self::load) reads the sources
/// fresh so edits are picked up on the next board build.
#[derive(Debug, Default, Clone)]
pub struct ConfigProvider {
    file: Option<PathBuf>,
}

impl ConfigProvider {
    /// Create a provider with defaults and environment overrides only
    pub fn new() -> Self {
        Self { file: None }
    }

    /// Layer a configuration file between the defaults and the environment
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Load and validate the board configuration
    pub fn load(&self) -> ConfigResult<BoardConfig> {
        let config: BoardConfig = self.build_figment()?.extract()?;
        validate(&config)?;
        debug!(
            placement = ?config.unassigned_placement,
            prefix = %config.storage_prefix,
            "Loaded board configuration"
        );
        Ok(config)
    }

    /// Build the figment with all sources in precedence order
    fn build_figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(BoardConfig::default()));

        if let Some(path) = &self.file {
            figment = figment.merge(load_config_file(path)?);
        }

        trace!("Merging {}* environment overrides", ENV_PREFIX);
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into())))
    }
}

/// Load a single configuration file based on its extension
fn load_config_file(path: &Path) -> ConfigResult<Figment> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    trace!("Loading config file: {}", path.display());
    match extension.as_str() {
        "toml" => Ok(Figment::from(Toml::file(path))),
        "yaml" | "yml" => Ok(Figment::from(Yaml::file(path))),
        "json" => Ok(Figment::from(Json::file(path))),
        other => Err(ConfigError::UnsupportedFormat {
            format: other.to_string(),
        }),
    }
}

fn validate(config: &BoardConfig) -> ConfigResult<()> {
    if config.unassigned_label.trim().is_empty() {
        return Err(ConfigError::validation("unassigned_label cannot be empty"));
    }
    if config.no_type_label.trim().is_empty() {
        return Err(ConfigError::validation("no_type_label cannot be empty"));
    }
    Ok(())
}
