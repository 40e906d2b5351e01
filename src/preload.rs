//! Batch preloading.
//!
//! All loads of a batch run concurrently and are joined with an all-settled
//! barrier: the batch completes when every path has resolved, and one path
//! failing never cancels the others. Because the loader never fails, "failed"
//! here only means the real asset was not available and a placeholder got
//! cached instead.

use std::collections::BTreeMap;

use futures::future::join_all;
use futures_intrusive::sync::Semaphore;
use instant::Instant;

use crate::{cache::Origin, catalog, loader::ModelLoader};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreloadStatus {
    /// `true` if the real asset was fetched, `false` if a placeholder is cached instead.
    pub ok: bool,
}

/// Per-path outcome of a batch, keyed by logical path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreloadReport {
    statuses: BTreeMap<String, PreloadStatus>,
}

impl PreloadReport {
    pub fn get(&self, path: &str) -> Option<PreloadStatus> {
        self.statuses.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PreloadStatus)> {
        self.statuses.iter().map(|(path, status)| (path.as_str(), *status))
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, s)| s.ok).map(|(path, _)| path)
    }

    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, s)| !s.ok).map(|(path, _)| path)
    }

    pub fn all_ok(&self) -> bool {
        self.statuses.values().all(|s| s.ok)
    }
}

pub struct Preloader {
    loader: ModelLoader,
    concurrency: Option<usize>,
}

impl Preloader {
    pub fn new(loader: ModelLoader) -> Self {
        Self {
            loader,
            concurrency: None,
        }
    }

    /// Caps how many loads run at once. `None` (the default) starts all of them immediately.
    pub fn with_concurrency(mut self, limit: Option<usize>) -> Self {
        self.concurrency = limit.map(|l| l.max(1));
        self
    }

    pub async fn preload_all<I, S>(&self, paths: I) -> PreloadReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        let started = Instant::now();
        let gate = self.concurrency.map(|limit| Semaphore::new(true, limit));

        let results = join_all(
            paths
                .into_iter()
                .map(|path| self.preload_one(path, gate.as_ref())),
        )
        .await;

        let report = PreloadReport {
            statuses: results.into_iter().collect(),
        };
        for path in report.failed() {
            log::warn!("preloading {path}: real asset unavailable, placeholder cached");
        }
        log::info!(
            "preloaded {} asset(s) in {:?}: {} fetched, {} placeholder(s)",
            report.len(),
            started.elapsed(),
            report.succeeded().count(),
            report.failed().count()
        );
        report
    }

    /// Preloads every path of the dashboard catalog.
    pub async fn preload_defaults(&self) -> PreloadReport {
        self.preload_all(catalog::default_preload_paths()).await
    }

    async fn preload_one(&self, path: String, gate: Option<&Semaphore>) -> (String, PreloadStatus) {
        let _permit = match gate {
            Some(gate) => Some(gate.acquire(1).await),
            None => None,
        };
        let (_, origin) = self.loader.load_with_origin(&path).await;
        let status = PreloadStatus {
            ok: origin == Origin::Fetched,
        };
        (path, status)
    }
}

impl ModelLoader {
    /// Loads every path concurrently and reports per path whether the real asset was found.
    pub async fn preload_all<I, S>(&self, paths: I) -> PreloadReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preloader().preload_all(paths).await
    }

    /// [`Self::preload_all`] with at most `limit` loads in flight at once.
    pub async fn preload_all_bounded<I, S>(&self, paths: I, limit: usize) -> PreloadReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Preloader::new(self.clone())
            .with_concurrency(Some(limit))
            .preload_all(paths)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::NoAssetSource;

    #[tokio::test]
    async fn duplicates_collapse_into_one_entry() {
        let loader = ModelLoader::new(NoAssetSource);
        let report = loader.preload_all(vec!["farm-structure"; 4]).await;
        assert_eq!(report.len(), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_fine() {
        let loader = ModelLoader::new(NoAssetSource);
        let report = loader.preload_all(Vec::<String>::new()).await;
        assert!(report.is_empty());
        assert!(report.all_ok());
    }
}
