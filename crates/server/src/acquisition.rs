use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};
use vitrina_core::domain::product::ProductRecord;
use vitrina_core::errors::ApplicationError;
use vitrina_core::search::ProductSearch;
use vitrina_db::ProductRepository;

/// Search → price → persist.
///
/// The provider is called before the store is touched, so a failed search
/// never leaves a partial record behind and never holds the store's write lock.
#[derive(Clone)]
pub struct AcquisitionService {
    search: Arc<dyn ProductSearch>,
    repository: Arc<dyn ProductRepository>,
}

impl AcquisitionService {
    pub fn new(search: Arc<dyn ProductSearch>, repository: Arc<dyn ProductRepository>) -> Self {
        Self { search, repository }
    }

    pub fn repository(&self) -> Arc<dyn ProductRepository> {
        Arc::clone(&self.repository)
    }

    pub async fn acquire_and_store(
        &self,
        name: Option<&str>,
        price: Option<Decimal>,
        correlation_id: &str,
    ) -> Result<ProductRecord, ApplicationError> {
        let name = match name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(ApplicationError::Validation("Product name is required".to_string())),
        };
        let price = price.unwrap_or(Decimal::ZERO);
        if price < Decimal::ZERO {
            return Err(ApplicationError::Validation(format!(
                "Product price must not be negative (got {price})"
            )));
        }

        let matched = self.search.search(name).await.map_err(|error| {
            warn!(
                event_name = "products.acquire.search_failed",
                correlation_id,
                product = name,
                error = %error,
                "product search failed; nothing stored"
            );
            ApplicationError::from(error)
        })?;

        let record = ProductRecord::new(name, price, matched.image_url);
        self.repository.append(record.clone()).await?;

        info!(
            event_name = "products.acquire.stored",
            correlation_id,
            product = %record.name,
            price = %record.price,
            image_url = %record.image_url,
            "product acquired and stored"
        );
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<ProductRecord>, ApplicationError> {
        Ok(self.repository.list_all().await?)
    }

    pub async fn remove(&self, name: &str, correlation_id: &str) -> Result<bool, ApplicationError> {
        if name.trim().is_empty() {
            return Err(ApplicationError::Validation("Product name is required".to_string()));
        }

        let removed = self.repository.remove_by_name(name).await?;
        info!(
            event_name = "products.remove.completed",
            correlation_id,
            product = name,
            removed,
            "product removal processed"
        );
        Ok(removed)
    }
}
