//! Product discovery over the untyped `__NEXT_DATA__` tree.
//!
//! The payload layout is undocumented and differs between result types (grid
//! items, carousels, sponsored slots), so instead of following a fixed path
//! every object in the tree is probed for product-shaped fields. Candidates
//! that fail normalization or the price filter are dropped silently. The same
//! product can be found under several paths; callers dedupe afterwards.

use crate::config::{DEFAULT_BASE_URL, DEFAULT_IMAGE_ORIGIN};
use crate::model::Product;
use serde_json::Value;

use super::helpers::{
    absolute_image_url, absolute_url, field, first_field, format_price, has_any_field,
    parse_price_value, price_text, scalar_text, truthy,
};

const NAME_FIELDS: &[&str] = &["title", "name", "productName"];
const PRICE_FIELDS: &[&str] = &["price", "currentPrice", "priceInfo"];
const URL_FIELDS: &[&str] = &["productUrl", "url", "canonicalUrl"];
const ITEM_ID_FIELD: &str = "usItemId";

/// Historical locations of the result list, probed in addition to the full walk.
pub const KNOWN_RESULT_PATHS: &[&str] = &[
    "props.pageProps.initialData.searchResult.itemStacks",
    "props.pageProps.initialData.searchResult.items",
    "props.pageProps.initialData.products",
    "props.pageProps.initialData.itemStacks",
    "props.pageProps.initialData.items",
    "props.pageProps.searchResult.itemStacks",
    "props.pageProps.searchResult.items",
    "props.pageProps.products",
];

pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone)]
pub struct ProductExtractor {
    pub threshold: f64,
    pub site_origin: String,
    pub image_origin: String,
    pub max_depth: usize,
}

impl ProductExtractor {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            site_origin: DEFAULT_BASE_URL.to_string(),
            image_origin: DEFAULT_IMAGE_ORIGIN.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_origins(mut self, site_origin: &str, image_origin: &str) -> Self {
        self.site_origin = site_origin.to_string();
        self.image_origin = image_origin.to_string();
        self
    }

    /// Full-tree walk followed by the known-path probe. Not deduplicated.
    pub fn extract(&self, root: &Value) -> Vec<Product> {
        let mut found = self.walk(root);
        tracing::debug!("Generic walk found {} candidate products", found.len());

        for path in KNOWN_RESULT_PATHS {
            if let Some(subtree) = resolve_path(root, path) {
                tracing::info!("Found data at path: {}", path);
                found.extend(self.walk(subtree));
            }
        }

        found
    }

    /// Depth-first search of `node`, in array index order and object key order.
    pub fn walk(&self, node: &Value) -> Vec<Product> {
        let mut found = Vec::new();
        self.walk_into(node, 0, &mut found);
        found
    }

    fn walk_into(&self, node: &Value, depth: usize, found: &mut Vec<Product>) {
        if depth > self.max_depth {
            tracing::debug!("Depth limit {} reached, skipping subtree", self.max_depth);
            return;
        }

        match node {
            Value::Array(items) => {
                for item in items {
                    self.walk_into(item, depth + 1, found);
                }
            }
            Value::Object(map) => {
                if is_candidate(node) {
                    if let Some(product) = self.normalize(node) {
                        found.push(product);
                    }
                }
                for value in map.values() {
                    self.walk_into(value, depth + 1, found);
                }
            }
            _ => {}
        }
    }

    /// Turn a candidate node into a `Product`, or `None` if it is missing a
    /// name, a URL, or a price below the threshold.
    pub fn normalize(&self, node: &Value) -> Option<Product> {
        let name = first_field(node, NAME_FIELDS)
            .and_then(scalar_text)
            .unwrap_or_default();
        let price = resolve_price(node).unwrap_or_default();
        let url = resolve_url(node, &self.site_origin).unwrap_or_default();
        let image_url = resolve_image(node)
            .filter(|s| !s.is_empty())
            .map(|s| absolute_image_url(&s, &self.image_origin));

        let Some(price_value) = parse_price_value(&price) else {
            tracing::trace!("Dropping {:?}: no numeric price in {:?}", name, price);
            return None;
        };

        if price_value < self.threshold && !name.is_empty() && !url.is_empty() {
            Some(Product {
                name,
                price,
                url,
                image_url,
            })
        } else {
            tracing::trace!("Dropping {:?} at {} ({:?})", name, price, url);
            None
        }
    }
}

/// Has a name-bearing field and a price-bearing field.
pub fn is_candidate(node: &Value) -> bool {
    node.is_object() && has_any_field(node, NAME_FIELDS) && has_any_field(node, PRICE_FIELDS)
}

/// Price precedence: `price`, then `currentPrice` (number, nested `.price`,
/// or its own text), then `priceInfo.currentPrice`.
fn resolve_price(node: &Value) -> Option<String> {
    match node.get("price") {
        Some(Value::Number(n)) => return n.as_f64().map(format_price),
        Some(Value::String(s)) => return Some(s.clone()),
        _ => {}
    }

    if let Some(current) = field(node, "currentPrice") {
        if current.is_number() {
            return price_text(current);
        }
        if let Some(nested) = field(current, "price") {
            return price_text(nested);
        }
        return scalar_text(current);
    }

    field(node, "priceInfo")
        .and_then(|info| field(info, "currentPrice"))
        .and_then(price_text)
}

fn resolve_url(node: &Value, site_origin: &str) -> Option<String> {
    let url = match first_field(node, URL_FIELDS) {
        Some(value) => scalar_text(value)?,
        None => {
            let id = field(node, ITEM_ID_FIELD).and_then(scalar_text)?;
            format!("{}/ip/{}", site_origin.trim_end_matches('/'), id)
        }
    };
    if url.is_empty() {
        return None;
    }
    Some(absolute_url(&url, site_origin))
}

/// The first present image field decides; an object without `url`/`src`
/// means no image.
fn resolve_image(node: &Value) -> Option<String> {
    if let Some(v) = field(node, "imageUrl") {
        return scalar_text(v);
    }
    if let Some(v) = field(node, "image") {
        return image_text(v);
    }
    if let Some(v) = field(node, "thumbnail") {
        return image_text(v);
    }
    if let Some(v) = field(node, "thumbnailUrl") {
        return scalar_text(v);
    }
    if let Some(v) = field(node, "primaryImage") {
        return image_text(v);
    }
    if let Some(v) = field(node, "productImage") {
        return image_text(v);
    }
    node.get("images")
        .and_then(Value::as_array)
        .and_then(|images| images.first())
        .and_then(image_text)
}

/// A string, or an object's `url`/`src` string. Numbers and booleans are not images.
fn image_text(value: &Value) -> Option<String> {
    let value = if value.is_object() {
        first_field(value, &["url", "src"])?
    } else {
        value
    };
    value.as_str().map(str::to_owned)
}

/// Follow a dotted path through objects. Resolves only to a present value.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |current, part| current.as_object()?.get(part))
        .filter(|v| truthy(v))
}
