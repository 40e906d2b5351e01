//! Error types.
//!
//! None of these ever reach a caller of [`crate::ModelLoader::load`]: asset
//! errors are logged and absorbed into a fallback model. They exist so the
//! loader can log precisely what went wrong and so sources and config code
//! have a typed vocabulary.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Why resolving a logical path did not produce a real asset.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The asset source could not supply or parse the asset.
    #[error("failed to fetch asset `{path}`: {reason}")]
    FetchFailed { path: String, reason: String },

    /// The asset source did not answer within the configured timeout.
    #[error("fetching asset `{path}` timed out after {after:?}")]
    Timeout { path: String, after: Duration },

    /// The source answered, but with a model that cannot be used.
    #[error("asset `{path}` is invalid: {defect}")]
    InvalidAsset {
        path: String,
        #[source]
        defect: ModelDefect,
    },

    /// A canonical cache entry failed validation.
    #[error("cached entry for `{path}` is corrupted: {defect}")]
    CacheCorruption {
        path: String,
        #[source]
        defect: ModelDefect,
    },
}

/// Structural problems found by [`crate::Model::validate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelDefect {
    #[error("node `{node}` has a non-finite transform")]
    NonFiniteTransform { node: String },

    #[error("node `{node}` has a zero scale component")]
    DegenerateScale { node: String },

    #[error("node `{node}` has invalid geometry")]
    InvalidGeometry { node: String },

    #[error("node `{node}` references vertex {index} but the mesh has {len} vertices")]
    IndexOutOfRange { node: String, index: u32, len: usize },

    #[error("node `{node}` has opacity {opacity} outside [0, 1]")]
    OpacityOutOfRange { node: String, opacity: f32 },
}

/// Errors while building a [`crate::LoaderConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}
