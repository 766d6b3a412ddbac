use crate::model::Product;
use std::collections::HashSet;

/// Keep the first product seen for each URL, preserving discovery order.
pub fn dedupe_by_url(products: Vec<Product>) -> Vec<Product> {
    let mut seen = HashSet::new();
    let before = products.len();
    let unique: Vec<Product> = products
        .into_iter()
        .filter(|p| seen.insert(p.url.clone()))
        .collect();
    if unique.len() < before {
        tracing::debug!("Removed {} duplicate products", before - unique.len());
    }
    unique
}
