//! Fetch-or-fallback model loading with clone-on-read caching.
//!
//! # Load pipeline
//!
//! For a logical path the loader:
//! 1. returns a clone of the canonical cache entry if there is one,
//! 2. otherwise fetches the real asset, falling back to a procedural
//!    placeholder on any failure,
//! 3. optimizes and normalizes the result,
//! 4. stores it as the canonical entry and returns a clone.
//!
//! # Concurrency
//!
//! Concurrent loads of a path that is not cached yet share one in-flight
//! future: the first caller installs it and every later caller awaits the same
//! result, so the source is asked once per path. The cache and the in-flight
//! map live behind one lock, and publishing a finished load (cache insert plus
//! in-flight removal) happens in a single critical section.

use std::{
    any::Any,
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use anyhow::anyhow;
use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use instant::Instant;
use parking_lot::Mutex;

use crate::{
    cache::{AssetCache, Origin},
    catalog,
    config::LoaderConfig,
    data_structures::model::Model,
    error::AssetError,
    fallback::FallbackGenerator,
    normalize::normalize,
    optimize::optimize,
    preload::Preloader,
    resources::{AssetSource, FileAssetSource},
};

#[derive(Clone)]
struct Resolved {
    model: Arc<Model>,
    origin: Origin,
}

type PendingLoad = Shared<BoxFuture<'static, Resolved>>;

struct LoaderState {
    cache: AssetCache,
    in_flight: HashMap<String, PendingLoad>,
    /// Bumped by every clear so loads started before it don't publish afterwards.
    generation: u64,
}

struct LoaderInner {
    source: Arc<dyn AssetSource>,
    config: LoaderConfig,
    fallback: FallbackGenerator,
    state: Mutex<LoaderState>,
}

enum Lookup {
    Hit(Arc<Model>, Origin),
    Pending(PendingLoad),
}

/// Cheap to clone; clones share the same cache.
#[derive(Clone)]
pub struct ModelLoader {
    inner: Arc<LoaderInner>,
}

impl ModelLoader {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self::with_config(source, LoaderConfig::default())
    }

    pub fn with_config(source: impl AssetSource + 'static, config: LoaderConfig) -> Self {
        Self::with_cache(source, config, AssetCache::new())
    }

    /// Starts from an existing cache, e.g. one that was warmed elsewhere.
    pub fn with_cache(
        source: impl AssetSource + 'static,
        config: LoaderConfig,
        cache: AssetCache,
    ) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                source: Arc::new(source),
                config,
                fallback: FallbackGenerator::new(),
                state: Mutex::new(LoaderState {
                    cache,
                    in_flight: HashMap::new(),
                    generation: 0,
                }),
            }),
        }
    }

    /// A loader reading assets from `config.asset_root`.
    pub fn from_config(config: LoaderConfig) -> Self {
        let source = FileAssetSource::new(config.asset_root.clone());
        Self::with_config(source, config)
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    /// Returns an independent copy of the model for `path`. Never fails.
    pub async fn load(&self, path: &str) -> Model {
        self.load_with_origin(path).await.0
    }

    /// Like [`Self::load`], also telling whether the real asset or a placeholder was used.
    pub async fn load_with_origin(&self, path: &str) -> (Model, Origin) {
        let resolved = match self.lookup(path) {
            Lookup::Hit(model, origin) => Resolved { model, origin },
            Lookup::Pending(pending) => pending.await,
        };
        (Model::clone(&resolved.model), resolved.origin)
    }

    pub async fn load_sensor_model(&self, sensor_type: &str) -> Model {
        self.load(&catalog::sensor_path(sensor_type)).await
    }

    /// `crop_label` may be a dashboard label or a canonical id; unknown crops load lettuce.
    pub async fn load_plant_model(&self, crop_label: &str) -> Model {
        self.load(&catalog::plant_path(crop_label)).await
    }

    pub async fn load_farm_structure_model(&self) -> Model {
        self.load(catalog::FARM_STRUCTURE_PATH).await
    }

    /// Drops all canonical entries. Models already handed out stay valid.
    pub fn clear_cache(&self) {
        let mut state = self.inner.state.lock();
        state.cache.clear();
        state.in_flight.clear();
        state.generation += 1;
        log::debug!("asset cache cleared");
    }

    /**
     * Evicts entries that are placeholders so the next load asks the source again.
     *
     * Fallbacks are otherwise cached for good, exactly like real assets. Call this
     * once the source is expected to have become available.
     */
    pub fn refresh_fallbacks(&self) -> usize {
        let removed = self
            .inner
            .state
            .lock()
            .cache
            .remove_origin(Origin::Fallback);
        if removed > 0 {
            log::info!("evicted {removed} cached placeholder(s)");
        }
        removed
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.inner.state.lock().cache.contains(path)
    }

    pub fn cached_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .inner
            .state
            .lock()
            .cache
            .paths()
            .map(str::to_string)
            .collect();
        paths.sort();
        paths
    }

    pub fn preloader(&self) -> Preloader {
        Preloader::new(self.clone()).with_concurrency(self.inner.config.preload_concurrency)
    }

    fn lookup(&self, path: &str) -> Lookup {
        let mut state = self.inner.state.lock();
        if let Some((model, origin)) = state.cache.shared(path) {
            match model.validate() {
                Ok(()) => {
                    log::debug!("cache hit for {path}");
                    return Lookup::Hit(model, origin);
                }
                Err(defect) => {
                    let err = AssetError::CacheCorruption {
                        path: path.to_string(),
                        defect,
                    };
                    log::error!("{err}; regenerating");
                    state.cache.remove(path);
                }
            }
        }
        if let Some(pending) = state.in_flight.get(path) {
            log::debug!("joining in-flight load of {path}");
            return Lookup::Pending(pending.clone());
        }
        let pending = produce(self.inner.clone(), path.to_string(), state.generation)
            .boxed()
            .shared();
        state.in_flight.insert(path.to_string(), pending.clone());
        Lookup::Pending(pending)
    }
}

async fn produce(inner: Arc<LoaderInner>, path: String, generation: u64) -> Resolved {
    let started = Instant::now();
    let prepared = match inner.fetch(&path).await {
        Ok(model) => inner.prepare(&path, model),
        Err(err) => Err(err),
    };
    let (model, factor, origin) = match prepared {
        Ok((model, factor)) => (model, factor, Origin::Fetched),
        Err(err) => {
            log::warn!("{err}; using a placeholder");
            let mut model = inner.fallback.generate(&path);
            optimize(&mut model, inner.config.reflection_intensity);
            let factor = normalize(&mut model, inner.config.target_size);
            (model, factor, Origin::Fallback)
        }
    };
    let model = Arc::new(model);

    {
        let mut state = inner.state.lock();
        if state.generation == generation {
            if !state.cache.put_shared(path.clone(), Arc::clone(&model), origin) {
                log::error!("{path} was cached by another writer; keeping the existing entry");
            }
            state.in_flight.remove(&path);
        } else {
            log::debug!("cache was cleared while {path} was loading; not publishing it");
        }
    }

    log::debug!(
        "resolved {path} ({origin:?}, scale {factor}) in {:?}",
        started.elapsed()
    );
    Resolved { model, origin }
}

impl LoaderInner {
    async fn fetch(&self, path: &str) -> Result<Model, AssetError> {
        // A panicking source is just another failed fetch
        let fetch = AssertUnwindSafe(self.source.fetch(path))
            .catch_unwind()
            .map(|caught| caught.unwrap_or_else(|payload| Err(anyhow!(panic_reason(&*payload)))));
        let fetched = match self.config.fetch_timeout() {
            Some(after) => match tokio::time::timeout(after, fetch).await {
                Ok(fetched) => fetched,
                Err(_) => {
                    return Err(AssetError::Timeout {
                        path: path.to_string(),
                        after,
                    });
                }
            },
            None => fetch.await,
        };
        let model = fetched.map_err(|e| AssetError::FetchFailed {
            path: path.to_string(),
            reason: format!("{e:#}"),
        })?;
        model.validate().map_err(|defect| AssetError::InvalidAsset {
            path: path.to_string(),
            defect,
        })?;
        Ok(model)
    }

    /// Optimizes and normalizes a fetched model. Returns the applied scale factor.
    fn prepare(&self, path: &str, mut model: Model) -> Result<(Model, f32), AssetError> {
        panic::catch_unwind(AssertUnwindSafe(move || {
            optimize(&mut model, self.config.reflection_intensity);
            let factor = normalize(&mut model, self.config.target_size);
            (model, factor)
        }))
        .map_err(|payload| AssetError::FetchFailed {
            path: path.to_string(),
            reason: format!("post-processing {}", panic_reason(&*payload)),
        })
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string payload".to_string());
    format!("panicked: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::NoAssetSource;

    #[tokio::test]
    async fn fallback_is_optimized_and_normalized() {
        let loader = ModelLoader::new(NoAssetSource);
        let model = loader.load_farm_structure_model().await;

        assert!(model.bounding_box().max_dimension() <= 1.0 + 1e-5);
        for node in model.drawables() {
            assert!(node.cast_shadow && node.receive_shadow);
            assert_eq!(
                node.material.as_ref().unwrap().env_map_intensity,
                Some(0.5)
            );
        }
    }

    #[tokio::test]
    async fn unknown_paths_resolve_to_empty_models() {
        let loader = ModelLoader::new(NoAssetSource);
        let model = loader.load("irrigation/valve").await;
        assert!(model.is_empty());
        assert_eq!(loader.cached_paths(), ["irrigation/valve"]);
    }

    #[tokio::test]
    async fn refresh_only_evicts_placeholders() {
        let mut cache = AssetCache::new();
        cache.put("sensors/light", Model::empty("real"), Origin::Fetched);
        let loader = ModelLoader::with_cache(NoAssetSource, LoaderConfig::default(), cache);
        loader.load_sensor_model("co2").await;

        assert_eq!(loader.refresh_fallbacks(), 1);
        assert_eq!(loader.cached_paths(), ["sensors/light"]);
    }
}
