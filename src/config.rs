use anyhow::{Context, Result, bail};
use std::env;

/// Which key-value store backs the validation-request routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Spanner,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "spanner" => Ok(StorageBackend::Spanner),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("STORAGE_BACKEND must be one of: spanner, memory, got '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpannerConfig {
    pub emulator_host: Option<String>,
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl SpannerConfig {
    fn from_env() -> Result<Self> {
        let emulator_host = env::var("SPANNER_EMULATOR_HOST").ok();

        let project = env::var("SPANNER_PROJECT")
            .context("SPANNER_PROJECT environment variable is required")?;

        let instance = env::var("SPANNER_INSTANCE")
            .context("SPANNER_INSTANCE environment variable is required")?;

        let database = env::var("SPANNER_DATABASE")
            .context("SPANNER_DATABASE environment variable is required")?;

        Ok(SpannerConfig {
            emulator_host,
            project,
            instance,
            database,
        })
    }

    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    /// Present exactly when `storage_backend` is `Spanner`
    pub spanner: Option<SpannerConfig>,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => StorageBackend::parse(&value)?,
            Err(_) => StorageBackend::Spanner,
        };

        let spanner = match storage_backend {
            StorageBackend::Spanner => Some(SpannerConfig::from_env()?),
            StorageBackend::Memory => None,
        };

        let service_port = env::var("SERVICE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = env::var("SERVICE_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(Config {
            storage_backend,
            spanner,
            service_port,
            service_host,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Storage backend: {:?}", self.storage_backend);
        if let Some(spanner) = &self.spanner {
            tracing::info!("  Spanner emulator: {}",
                spanner.emulator_host.as_deref().unwrap_or("disabled (using production)"));
            tracing::info!("  Spanner project: {}", spanner.project);
            tracing::info!("  Spanner instance: {}", spanner.instance);
            tracing::info!("  Spanner database: {}", spanner.database);
        }
        tracing::info!("  Service listening on: {}", self.bind_address());
    }
}
