use serde::Serialize;

/// A search result that passed normalization and the price filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    pub price: String,
    pub url: String,
    pub image_url: Option<String>,
}
