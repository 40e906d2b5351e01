#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use anyhow::bail;
use farm_assets::{AssetSource, Color, Geometry, Material, Model, Node};
use futures::{FutureExt, future::BoxFuture};
use parking_lot::Mutex;

#[derive(Default)]
struct Counters {
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

/// Asset source double that records every fetch.
///
/// Clones share their counters, so a test can hand one clone to the loader
/// and inspect the other.
#[derive(Clone)]
pub(crate) struct StubSource {
    counters: Arc<Counters>,
    failing: Arc<HashSet<String>>,
    panicking: Arc<HashSet<String>>,
    delay: Duration,
    model: Model,
}

impl StubSource {
    pub fn new() -> Self {
        Self {
            counters: Arc::default(),
            failing: Arc::default(),
            panicking: Arc::default(),
            delay: Duration::ZERO,
            model: big_box(),
        }
    }

    pub fn failing(mut self, paths: &[&str]) -> Self {
        self.failing = Arc::new(paths.iter().map(|p| p.to_string()).collect());
        self
    }

    /// Paths whose fetch panics instead of returning an error.
    pub fn panicking(mut self, paths: &[&str]) -> Self {
        self.panicking = Arc::new(paths.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn calls(&self) -> usize {
        self.counters.calls.load(Ordering::SeqCst)
    }

    pub fn max_active(&self) -> usize {
        self.counters.max_active.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.counters.requested.lock().clone()
    }
}

impl Default for StubSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSource for StubSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, anyhow::Result<Model>> {
        async move {
            let counters = &self.counters;
            counters.calls.fetch_add(1, Ordering::SeqCst);
            counters.requested.lock().push(path.to_string());
            let now_active = counters.active.fetch_add(1, Ordering::SeqCst) + 1;
            counters.max_active.fetch_max(now_active, Ordering::SeqCst);

            if self.delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.delay).await;
            }
            counters.active.fetch_sub(1, Ordering::SeqCst);

            if self.panicking.contains(path) {
                panic!("stub: {path} blew up");
            }
            if self.failing.contains(path) {
                bail!("stub: {path} is unavailable");
            }
            Ok(self.model.clone())
        }
        .boxed()
    }
}

/// The "real" asset served by [`StubSource`]: a 4 x 2 x 1 box.
pub(crate) fn big_box() -> Model {
    Model::new(Node::drawable(
        "real-asset",
        Geometry::Cuboid {
            width: 4.0,
            height: 2.0,
            depth: 1.0,
        },
        Material::standard(Color::from_hex(0x336699)),
    ))
}

pub(crate) fn assert_uniform_scale(model: &Model) {
    let scale = model.root.transform.scale;
    assert!(
        (scale.x - scale.y).abs() < 1e-6 && (scale.y - scale.z).abs() < 1e-6,
        "scale is not uniform: {scale:?}"
    );
}

pub(crate) fn assert_fits(model: &Model, target: f32) {
    let max = model.bounding_box().max_dimension();
    assert!(max <= target + 1e-5, "max dimension {max} exceeds {target}");
}
