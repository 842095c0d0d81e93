use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;
use vitrina_core::config::{AppConfig, ConfigError};
use vitrina_db::{FileProductRepository, ProductRepository, RepositoryError};

use crate::acquisition::AcquisitionService;
use crate::health;
use crate::products;
use crate::provider::RapidApiProductSearch;

pub struct Application {
    pub config: AppConfig,
    pub repository: Arc<FileProductRepository>,
    pub service: AcquisitionService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("product store `{path}` is unusable: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: RepositoryError,
    },
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let repository = Arc::new(FileProductRepository::from_config(&config.store));
    let existing = repository.list_all().await.map_err(|source| BootstrapError::Store {
        path: repository.path().to_path_buf(),
        source,
    })?;
    info!(
        event_name = "system.bootstrap.store_opened",
        correlation_id = "bootstrap",
        path = %repository.path().display(),
        records = existing.len(),
        "product store opened"
    );

    let search =
        RapidApiProductSearch::from_config(&config.provider).map_err(BootstrapError::HttpClient)?;
    info!(
        event_name = "system.bootstrap.provider_ready",
        correlation_id = "bootstrap",
        base_url = %config.provider.base_url,
        timeout_secs = config.provider.timeout_secs,
        max_retries = config.provider.max_retries,
        "product search provider configured"
    );

    let service = AcquisitionService::new(Arc::new(search), repository.clone());

    Ok(Application { config, repository, service })
}

impl Application {
    pub fn router(&self) -> Router {
        products::router(self.service.clone())
            .merge(health::router(self.service.repository()))
            .layer(TraceLayer::new_for_http())
    }
}
