//! farm-assets
//!
//! Asset loading and caching for the vertical-farm digital twin. Given a
//! logical asset path such as `sensors/temperature`, `plants/basil` or
//! `farm-structure`, the [`ModelLoader`] returns a renderable [`Model`]. Real
//! assets come from an [`AssetSource`]; whenever that fails a deterministic
//! procedural placeholder is synthesized instead, so loading never fails from
//! the caller's point of view.
//!
//! Every resolved asset is kept once, as a canonical instance, in an
//! [`AssetCache`]. Callers always receive deep clones and may freely mutate
//! transforms and materials.
//!
//! High-level modules
//! - `data_structures`: the model tree, transforms and bounding volumes
//! - `resources`: asset sources (glTF/OBJ files on disk)
//! - `fallback`: procedural placeholders keyed on path conventions
//! - `optimize` / `normalize`: post-processing applied before caching
//! - `cache`: canonical instances per logical path
//! - `catalog`: path conventions and the crop label table
//! - `loader`: fetch-or-fallback with in-flight deduplication
//! - `preload`: all-settled batch loading
//! - `config`: loader configuration from defaults, TOML and environment
//!

pub mod cache;
pub mod catalog;
pub mod config;
pub mod data_structures;
pub mod error;
pub mod fallback;
pub mod loader;
pub mod normalize;
pub mod optimize;
pub mod preload;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cache::{AssetCache, Origin};
pub use config::LoaderConfig;
pub use data_structures::model::{Capabilities, Color, Geometry, Material, MeshBuffer, Model, Node};
pub use data_structures::transform::Transform;
pub use error::{AssetError, ConfigError, ModelDefect};
pub use fallback::FallbackGenerator;
pub use loader::ModelLoader;
pub use preload::{PreloadReport, PreloadStatus, Preloader};
pub use resources::{AssetSource, FileAssetSource, NoAssetSource};
