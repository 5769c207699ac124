//! Unit tests for the dataset cache.
//!
//! Run with: cargo test --test cache_unit_test

mod common;

use std::sync::Arc;

use axum::body::Bytes;
use home_monitor::common::{AppState, DatasetSource};
use home_monitor::config::Config;
use home_monitor::error::AppError;
use home_monitor::pipeline::IngestError;
use home_monitor::routes::cache;
use uuid::Uuid;

use common::{SAMPLE_CSV, write_temp_csv};

fn state_for(path: std::path::PathBuf) -> AppState {
    AppState::new(Config {
        data_path: path,
        disable_rate_limiting: true,
        ..Config::default()
    })
}

fn short_lived_state(path: std::path::PathBuf) -> AppState {
    AppState::new(Config {
        data_path: path,
        disable_rate_limiting: true,
        cache_ttl_seconds: 1,
        ..Config::default()
    })
}

/// Sample header followed by `rows` generated readings.
fn large_csv(rows: usize) -> String {
    let mut csv = String::from(common::HEADER);
    csv.push('\n');
    for i in 0..rows {
        csv.push_str(&format!(
            "H1,2024-01-{:02} {:02}:{:02}:00,21.0,40,250,Active,Room {},0.5,0.25,\n",
            i % 28 + 1,
            i % 24,
            i % 60,
            i % 7
        ));
    }
    csv
}

#[tokio::test]
async fn file_dataset_is_ingested_once() {
    let path = write_temp_csv(SAMPLE_CSV);
    let state = state_for(path.clone());
    let source = state.default_source();

    let first = cache::load_dataset(&state, &source).await.unwrap();
    // Later loads are served from memory even after the file is gone
    std::fs::remove_file(&path).unwrap();
    let second = cache::load_dataset(&state, &source).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 5);
}

#[tokio::test]
async fn invalidate_forces_reingest() {
    let path = write_temp_csv(SAMPLE_CSV);
    let state = state_for(path.clone());
    let source = state.default_source();

    let first = cache::load_dataset(&state, &source).await.unwrap();
    assert!(cache::invalidate(&state, &source).await);
    assert!(!cache::invalidate(&state, &source).await);

    let reloaded = cache::load_dataset(&state, &source).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &reloaded));
    assert_eq!(first.readings(), reloaded.readings());

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn uploads_are_addressable_by_id() {
    let state = state_for(std::env::temp_dir().join("home-monitor-unused.csv"));

    let (id, stored) = cache::store_upload(&state, Bytes::from_static(SAMPLE_CSV.as_bytes()))
        .await
        .unwrap();
    let loaded = cache::load_dataset(&state, &DatasetSource::Upload(id))
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&stored, &loaded));
}

#[test]
fn unknown_upload_is_not_found() {
    let state = state_for(std::env::temp_dir().join("home-monitor-unused.csv"));
    let source = DatasetSource::Upload(Uuid::new_v4());

    let err = tokio_test::block_on(cache::load_dataset(&state, &source)).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn missing_file_is_reported_and_not_cached() {
    let path = std::env::temp_dir().join(format!("home-monitor-missing-{}.csv", Uuid::new_v4()));
    let state = state_for(path);

    let err = cache::load_dataset(&state, &state.default_source())
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ingest(),
        Some(IngestError::SourceNotFound(_))
    ));
    assert!(state.datasets.get(&state.default_source()).await.is_none());
}

#[tokio::test]
async fn invalid_upload_is_rejected() {
    let state = state_for(std::env::temp_dir().join("home-monitor-unused.csv"));
    let body = Bytes::from_static(b"Home_ID,DateTime\nH1,2024-01-01 08:00:00\n");

    let err = cache::store_upload(&state, body).await.unwrap_err();
    assert!(matches!(
        err.as_ingest(),
        Some(IngestError::MissingColumn("Temperature_C"))
    ));
}

#[test]
fn source_display_names_its_kind() {
    let id = Uuid::nil();
    assert_eq!(
        DatasetSource::Upload(id).to_string(),
        "upload:00000000-0000-0000-0000-000000000000"
    );
    assert_eq!(
        DatasetSource::File("data/home.csv".into()).to_string(),
        "file:data/home.csv"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_misses_share_one_ingestion() {
    let path = write_temp_csv(&large_csv(50_000));
    let state = state_for(path.clone());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            tokio::spawn(async move {
                let source = state.default_source();
                cache::load_dataset(&state, &source).await.unwrap()
            })
        })
        .collect();

    let mut loaded = Vec::new();
    for handle in handles {
        loaded.push(handle.await.unwrap());
    }

    assert_eq!(loaded[0].len(), 50_000);
    assert!(loaded.iter().all(|d| Arc::ptr_eq(d, &loaded[0])));

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn expired_file_dataset_is_reingested() {
    let path = write_temp_csv(SAMPLE_CSV);
    let state = short_lived_state(path.clone());
    let source = state.default_source();

    let first = cache::load_dataset(&state, &source).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    let reloaded = cache::load_dataset(&state, &source).await.unwrap();

    assert!(!Arc::ptr_eq(&first, &reloaded));
    assert_eq!(first.readings(), reloaded.readings());

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn expired_upload_is_not_found() {
    let state = short_lived_state(std::env::temp_dir().join("home-monitor-unused.csv"));

    let (id, _) = cache::store_upload(&state, Bytes::from_static(SAMPLE_CSV.as_bytes()))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

    let err = cache::load_dataset(&state, &DatasetSource::Upload(id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
