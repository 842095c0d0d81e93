//! Port to the external product-search provider.
//!
//! The provider is consulted only for imagery: [`shape_search_response`] reduces
//! a raw response body to the first result's image URL, and every other field
//! the provider returns is dropped.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Used whenever the first search result carries no usable image.
pub const DEFAULT_IMAGE_URL: &str = "https://placehold.co/400x400?text=Sin+imagen";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductMatch {
    pub image_url: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("no products found for `{query}`")]
    NotFound { query: String },
    #[error("product search failed: {0}")]
    Transient(String),
}

impl SearchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[async_trait]
pub trait ProductSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<ProductMatch, SearchError>;
}

pub fn shape_search_response(query: &str, body: &Value) -> Result<ProductMatch, SearchError> {
    let not_found = || SearchError::NotFound { query: query.to_string() };

    let first = body
        .as_object()
        .and_then(|object| object.get("products"))
        .and_then(Value::as_array)
        .and_then(|products| products.first())
        .ok_or_else(not_found)?;

    let image_url = first
        .get("images")
        .and_then(Value::as_array)
        .and_then(|images| images.first())
        .and_then(Value::as_str)
        .filter(|url| !url.trim().is_empty())
        .unwrap_or(DEFAULT_IMAGE_URL);

    Ok(ProductMatch { image_url: image_url.to_string() })
}
