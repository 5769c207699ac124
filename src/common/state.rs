use moka::future::Cache;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::config::Config;
use crate::pipeline::Dataset;

/// Identity of an input source. Normalized datasets are cached per source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DatasetSource {
    /// The CSV file configured on disk
    File(PathBuf),
    /// A CSV uploaded through the API
    Upload(Uuid),
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Upload(id) => write!(f, "upload:{id}"),
        }
    }
}

/// Normalized datasets keyed by source, expiring after the configured TTL.
/// Weighted by reading count to bound memory.
pub type DatasetCache = Cache<DatasetSource, Arc<Dataset>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub datasets: DatasetCache,
    pub export_permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        // Cache weighted by reading count, not entry count
        let datasets: DatasetCache = Cache::builder()
            .weigher(|_key: &DatasetSource, value: &Arc<Dataset>| -> u32 {
                // Empty datasets still occupy a slot
                value.len().max(1).try_into().unwrap_or(u32::MAX)
            })
            .max_capacity(config.cache_max_readings)
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
            .build();

        Self {
            export_permits: Arc::new(Semaphore::new(config.export_concurrent_limit)),
            config: Arc::new(config),
            datasets,
        }
    }

    /// The source requests fall back to when they name no upload.
    #[must_use]
    pub fn default_source(&self) -> DatasetSource {
        DatasetSource::File(self.config.data_path.clone())
    }
}
