use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use vitrina_core::domain::product::ProductRecord;
use vitrina_core::errors::ApplicationError;

pub mod memory;
pub mod product;

pub use memory::InMemoryProductRepository;
pub use product::FileProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("store io error at `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encode error: {0}")]
    Encode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Storage(value.to_string())
    }
}

/// Ordered collection of product records.
///
/// Names are not unique: `append` never rejects a duplicate and
/// `remove_by_name` drops every record whose name matches exactly.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepositoryError>;
    async fn append(&self, record: ProductRecord) -> Result<(), RepositoryError>;
    async fn remove_by_name(&self, name: &str) -> Result<bool, RepositoryError>;
}
