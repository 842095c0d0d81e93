pub mod repositories;

pub use repositories::{
    FileProductRepository, InMemoryProductRepository, ProductRepository, RepositoryError,
};
