use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use vitrina_core::domain::product::ProductRecord;
use vitrina_core::search::{shape_search_response, ProductMatch, ProductSearch, SearchError};
use vitrina_db::{ProductRepository, RepositoryError};

/// Provider double that answers every query with a canned response body.
pub struct StubSearch {
    outcome: Result<Value, SearchError>,
    pub calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl StubSearch {
    pub fn responding(body: Value) -> Self {
        Self { outcome: Ok(body), calls: AtomicUsize::new(0), queries: Mutex::new(Vec::new()) }
    }

    pub fn failing(error: SearchError) -> Self {
        Self { outcome: Err(error), calls: AtomicUsize::new(0), queries: Mutex::new(Vec::new()) }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|queries| queries.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ProductSearch for StubSearch {
    async fn search(&self, query: &str) -> Result<ProductMatch, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }

        match &self.outcome {
            Ok(body) => shape_search_response(query, body),
            Err(error) => Err(error.clone()),
        }
    }
}

/// Store double whose every operation fails as an unreadable document would.
pub struct FailingRepository;

#[async_trait]
impl ProductRepository for FailingRepository {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepositoryError> {
        Err(RepositoryError::Decode("products.json is not a product list".to_string()))
    }

    async fn append(&self, _record: ProductRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Decode("products.json is not a product list".to_string()))
    }

    async fn remove_by_name(&self, _name: &str) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Decode("products.json is not a product list".to_string()))
    }
}
