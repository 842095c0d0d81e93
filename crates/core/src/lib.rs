pub mod config;
pub mod domain;
pub mod errors;
pub mod search;

pub use domain::product::ProductRecord;
pub use errors::{ApplicationError, InterfaceError};
pub use search::{
    shape_search_response, ProductMatch, ProductSearch, SearchError, DEFAULT_IMAGE_URL,
};
