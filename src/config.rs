//! Loader configuration.
//!
//! Values come from [`LoaderConfig::default`], optionally overlaid by a TOML
//! file and then by `FARM_ASSETS_*` environment variables:
//!
//! ```toml
//! asset_root = "assets"
//! target_size = 1.0
//! reflection_intensity = 0.5
//! fetch_timeout_ms = 5000
//! preload_concurrency = 8
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{
    error::ConfigError, normalize::DEFAULT_TARGET_SIZE,
    optimize::DEFAULT_REFLECTION_INTENSITY,
};

pub const ENV_ASSET_ROOT: &str = "FARM_ASSETS_ROOT";
pub const ENV_TARGET_SIZE: &str = "FARM_ASSETS_TARGET_SIZE";
pub const ENV_FETCH_TIMEOUT_MS: &str = "FARM_ASSETS_FETCH_TIMEOUT_MS";
pub const ENV_PRELOAD_CONCURRENCY: &str = "FARM_ASSETS_PRELOAD_CONCURRENCY";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Directory the file asset source resolves logical paths against.
    pub asset_root: PathBuf,
    /// Largest bounding dimension a loaded model may have.
    pub target_size: f32,
    /// Environment-reflection intensity applied to materials that support it.
    pub reflection_intensity: f32,
    /// Fetches taking longer than this fall back to a placeholder. `None` waits forever.
    pub fetch_timeout_ms: Option<u64>,
    /// Upper bound on concurrent loads while preloading. `None` is unbounded.
    pub preload_concurrency: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            target_size: DEFAULT_TARGET_SIZE,
            reflection_intensity: DEFAULT_REFLECTION_INTENSITY,
            fetch_timeout_ms: None,
            preload_concurrency: None,
        }
    }
}

impl LoaderConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any key/value lookup, e.g. the process environment.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(root) = lookup(ENV_ASSET_ROOT) {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(value) = lookup(ENV_TARGET_SIZE) {
            self.target_size = parse(ENV_TARGET_SIZE, value)?;
        }
        if let Some(value) = lookup(ENV_FETCH_TIMEOUT_MS) {
            self.fetch_timeout_ms = Some(parse(ENV_FETCH_TIMEOUT_MS, value)?);
        }
        if let Some(value) = lookup(ENV_PRELOAD_CONCURRENCY) {
            self.preload_concurrency = Some(parse(ENV_PRELOAD_CONCURRENCY, value)?);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.target_size.is_finite() && self.target_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "target_size must be positive, got {}",
                self.target_size
            )));
        }
        if !(0.0..=1.0).contains(&self.reflection_intensity) {
            return Err(ConfigError::Invalid(format!(
                "reflection_intensity must be within [0, 1], got {}",
                self.reflection_intensity
            )));
        }
        if self.preload_concurrency == Some(0) {
            return Err(ConfigError::Invalid(
                "preload_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
