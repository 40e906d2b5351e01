use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, bail};
use futures::{FutureExt, future::BoxFuture};

use crate::data_structures::model::Model;

/**
 * This module contains all logic for loading real assets from external files.
 */
pub mod file;
pub mod gltf_scene;
pub mod obj_scene;

/// The loader's only I/O boundary: something that may or may not supply the real asset for a path.
pub trait AssetSource: Send + Sync {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, anyhow::Result<Model>>;
}

/// A source that never has anything. Every load resolves to its fallback placeholder.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssetSource;

impl AssetSource for NoAssetSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, anyhow::Result<Model>> {
        async move { Err(anyhow!("no asset source configured for {path}")) }.boxed()
    }
}

/// File extensions tried, in order, for every logical path.
pub const EXTENSIONS: [&str; 3] = ["glb", "gltf", "obj"];

/// Resolves `{root}/{path}.glb`, `.gltf` or `.obj`, in that order.
#[derive(Clone, Debug)]
pub struct FileAssetSource {
    root: PathBuf,
}

impl FileAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn load(&self, path: &str) -> anyhow::Result<Model> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("asset path {path:?} must be relative and must not leave the asset root");
        }
        for ext in EXTENSIONS {
            let candidate = self.root.join(format!("{path}.{ext}"));
            if !file::exists(&candidate).await {
                continue;
            }
            log::debug!("loading {} for {path}", candidate.display());
            return match ext {
                "obj" => obj_scene::load_model_obj(&candidate).await,
                _ => gltf_scene::load_model_gltf(&candidate).await,
            };
        }
        bail!(
            "no .glb, .gltf or .obj file for {path} under {}",
            self.root.display()
        )
    }
}

impl AssetSource for FileAssetSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, anyhow::Result<Model>> {
        self.load(path).boxed()
    }
}
