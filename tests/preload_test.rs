use std::time::Duration;

use farm_assets::{LoaderConfig, ModelLoader, PreloadStatus, catalog};

use crate::common::test_utils::StubSource;

mod common;

#[tokio::test]
async fn partial_failures_still_report_every_path() {
    let source = StubSource::new().failing(&["sensors/light", "plants/mint"]);
    let loader = ModelLoader::new(source.clone());

    let report = loader
        .preload_all(["sensors/light", "sensors/co2", "plants/mint", "farm-structure"])
        .await;

    assert_eq!(report.len(), 4);
    assert_eq!(report.get("sensors/light"), Some(PreloadStatus { ok: false }));
    assert_eq!(report.get("sensors/co2"), Some(PreloadStatus { ok: true }));
    assert_eq!(
        report.failed().collect::<Vec<_>>(),
        ["plants/mint", "sensors/light"]
    );
    assert_eq!(source.calls(), 4);
}

#[tokio::test]
async fn preloaded_paths_are_served_from_the_cache() {
    let source = StubSource::new();
    let loader = ModelLoader::new(source.clone());

    let report = loader.preloader().preload_defaults().await;
    assert!(report.all_ok());
    let preloaded = source.calls();
    assert_eq!(preloaded, catalog::default_preload_paths().len());

    loader.load_sensor_model("temperature").await;
    loader.load_plant_model("상추").await;
    loader.load_farm_structure_model().await;
    assert_eq!(source.calls(), preloaded);
}

#[tokio::test]
async fn unbounded_batches_run_everything_at_once() {
    let source = StubSource::new().with_delay(Duration::from_millis(30));
    let loader = ModelLoader::new(source.clone());

    let paths: Vec<String> = catalog::SENSOR_KINDS
        .iter()
        .map(|kind| catalog::sensor_path(kind))
        .collect();
    loader.preload_all(paths.clone()).await;

    assert_eq!(source.max_active(), paths.len());
}

#[tokio::test]
async fn concurrency_limit_is_respected() {
    let source = StubSource::new().with_delay(Duration::from_millis(10));
    let loader = ModelLoader::new(source.clone());

    let report = loader
        .preloader()
        .with_concurrency(Some(2))
        .preload_defaults()
        .await;

    assert_eq!(report.len(), catalog::default_preload_paths().len());
    assert!(source.max_active() <= 2, "{} active", source.max_active());
}

#[tokio::test]
async fn bounded_preload_caps_in_flight_loads() {
    let source = StubSource::new()
        .with_delay(Duration::from_millis(10))
        .failing(&["sensors/humidity"]);
    let loader = ModelLoader::new(source.clone());

    let report = loader
        .preload_all_bounded(catalog::default_preload_paths(), 3)
        .await;

    assert_eq!(report.len(), catalog::default_preload_paths().len());
    assert_eq!(report.failed().collect::<Vec<_>>(), ["sensors/humidity"]);
    assert!(source.max_active() <= 3, "{} active", source.max_active());
}

#[tokio::test]
async fn configured_concurrency_is_used_by_default() {
    let source = StubSource::new().with_delay(Duration::from_millis(5));
    let config = LoaderConfig {
        preload_concurrency: Some(1),
        ..LoaderConfig::default()
    };
    let loader = ModelLoader::with_config(source.clone(), config);

    loader.preload_all(["plants/basil", "plants/kale", "plants/mint"]).await;

    assert_eq!(source.max_active(), 1);
    assert_eq!(source.calls(), 3);
}
