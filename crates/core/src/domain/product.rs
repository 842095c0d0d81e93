use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored catalog entry.
///
/// Field names on the wire and on disk keep the storefront's schema
/// (`nombre`, `precio`, `imagen_url`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precio", with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "imagen_url")]
    pub image_url: String,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>, price: Decimal, image_url: impl Into<String>) -> Self {
        Self { name: name.into(), price, image_url: image_url.into() }
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name == name
    }
}
