use tokio::sync::RwLock;

use vitrina_core::domain::product::ProductRecord;

use super::{ProductRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<ProductRecord>>,
}

impl InMemoryProductRepository {
    pub fn with_records(records: Vec<ProductRecord>) -> Self {
        Self { products: RwLock::new(records) }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.clone())
    }

    async fn append(&self, record: ProductRecord) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products.push(record);
        Ok(())
    }

    async fn remove_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|record| !record.has_name(name));
        Ok(products.len() < before)
    }
}
