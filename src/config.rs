use std::env;
use std::path::PathBuf;

use crate::pipeline::{IngestOptions, RateBounds};

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Data source
    pub data_path: PathBuf,
    pub energy_columns: Vec<String>,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Dashboard defaults
    pub rate_min: f64,
    pub rate_max: f64,
    pub rate_default: f64,
    pub latest_default_limit: usize,
    pub latest_max_limit: usize,

    // Uploads and exports
    pub upload_max_bytes: usize,
    pub export_concurrent_limit: usize,

    // Rate limiting
    pub disable_rate_limiting: bool,
    /// Seconds between replenished requests per client, i.e. 1 request per N s
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,

    // Caching
    pub cache_ttl_seconds: u64,
    pub cache_max_readings: u64,

    // Application metadata
    pub deployment: Deployment,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the electricity rate bounds or the
    /// latest-readings limits are inconsistent.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            // Data source
            data_path: env::var("DATA_PATH")
                .unwrap_or_else(|_| "smart_home_energy_usage_dataset.csv".to_string())
                .into(),
            energy_columns: env::var("ENERGY_COLUMNS")
                .map(|s| {
                    s.split(',')
                        .map(|c| c.trim().to_string())
                        .filter(|c| !c.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| IngestOptions::default().energy_columns),

            // API settings
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),

            // Dashboard defaults
            rate_min: env::var("RATE_MIN")
                .unwrap_or_else(|_| "0.05".to_string())
                .parse()
                .unwrap_or(0.05),
            rate_max: env::var("RATE_MAX")
                .unwrap_or_else(|_| "0.50".to_string())
                .parse()
                .unwrap_or(0.50),
            rate_default: env::var("RATE_DEFAULT")
                .unwrap_or_else(|_| "0.15".to_string())
                .parse()
                .unwrap_or(0.15),
            latest_default_limit: env::var("LATEST_DEFAULT_LIMIT")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
            latest_max_limit: env::var("LATEST_MAX_LIMIT")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),

            // Uploads and exports
            upload_max_bytes: env::var("UPLOAD_MAX_BYTES")
                .unwrap_or_else(|_| "52428800".to_string())
                .parse()
                .unwrap_or(52_428_800), // 50MB default
            export_concurrent_limit: env::var("EXPORT_CONCURRENT_LIMIT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),

            // Rate limiting
            disable_rate_limiting: env::var("DISABLE_RATE_LIMITING")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            rate_limit_per_second: env::var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            rate_limit_burst: env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),

            // Caching
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600), // 1 hour default
            cache_max_readings: env::var("CACHE_MAX_READINGS")
                .unwrap_or_else(|_| "5000000".to_string())
                .parse()
                .unwrap_or(5_000_000),

            // Application metadata
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rate_min > 0.0 && self.rate_min <= self.rate_max) {
            return Err(ConfigError::Invalid("RATE_MIN must be positive and <= RATE_MAX"));
        }
        if !(self.rate_min..=self.rate_max).contains(&self.rate_default) {
            return Err(ConfigError::Invalid("RATE_DEFAULT must lie within RATE_MIN..=RATE_MAX"));
        }
        if self.latest_default_limit == 0 || self.latest_default_limit > self.latest_max_limit {
            return Err(ConfigError::Invalid(
                "LATEST_DEFAULT_LIMIT must be between 1 and LATEST_MAX_LIMIT",
            ));
        }
        if self.export_concurrent_limit == 0 {
            return Err(ConfigError::Invalid("EXPORT_CONCURRENT_LIMIT must be at least 1"));
        }
        Ok(())
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    #[must_use]
    pub fn rate_bounds(&self) -> RateBounds {
        RateBounds {
            min: self.rate_min,
            max: self.rate_max,
            default: self.rate_default,
        }
    }

    #[must_use]
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            energy_columns: self.energy_columns.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let rates = RateBounds::default();
        Self {
            data_path: "smart_home_energy_usage_dataset.csv".into(),
            energy_columns: IngestOptions::default().energy_columns,
            api_host: "0.0.0.0".to_string(),
            api_port: 3000,
            rate_min: rates.min,
            rate_max: rates.max,
            rate_default: rates.default,
            latest_default_limit: 20,
            latest_max_limit: 500,
            upload_max_bytes: 52_428_800,
            export_concurrent_limit: 5,
            disable_rate_limiting: false,
            rate_limit_per_second: 10,
            rate_limit_burst: 60,
            cache_ttl_seconds: 3600,
            cache_max_readings: 5_000_000,
            deployment: Deployment::Local,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
