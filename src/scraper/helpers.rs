use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static PRICE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?(\d+(?:\.\d+)?)").expect("hardcoded regex pattern is valid"));

/// Whether a field value counts as present: not null, false, zero or an
/// empty string. Arrays and objects always count, even when empty.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A present (truthy) field of an object node.
pub fn field<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    node.get(key).filter(|v| truthy(v))
}

/// The first present field among `keys`, in order.
pub fn first_field<'a>(node: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| field(node, key))
}

pub fn has_any_field(node: &Value, keys: &[&str]) -> bool {
    first_field(node, keys).is_some()
}

/// Text form of a scalar. Arrays and objects have none.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(match n.as_f64() {
            // f64 Display drops a zero fraction: 123.0 -> "123".
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// `"$"` plus two decimals, e.g. `1.5` -> `"$1.50"`.
pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

/// Numeric prices are formatted, anything else falls back to its text.
pub fn price_text(value: &Value) -> Option<String> {
    match value.as_f64() {
        Some(n) => Some(format_price(n)),
        None => scalar_text(value),
    }
}

/// First decimal number embedded in a price string, e.g. `"Now $1.97"` -> 1.97.
pub fn parse_price_value(text: &str) -> Option<f64> {
    PRICE_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Threshold for display: whole dollars without decimals (`$2`), otherwise two (`$2.50`).
pub fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("${:.0}", value)
    } else {
        format_price(value)
    }
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Make a product URL absolute against the site origin, with exactly one `/`
/// between origin and path.
pub fn absolute_url(url: &str, origin: &str) -> String {
    if has_http_scheme(url) {
        return url.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{}{}", origin, url)
    } else {
        format!("{}/{}", origin, url)
    }
}

/// Make an image URL absolute. Protocol-relative values get `https:`, root
/// relative values go to the image CDN. Anything else is returned unchanged.
pub fn absolute_image_url(url: &str, image_origin: &str) -> String {
    if has_http_scheme(url) {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else if url.starts_with('/') {
        format!("{}{}", image_origin.trim_end_matches('/'), url)
    } else {
        // TODO: bare relative paths like "img/x.jpg" stay relative until the
        // intended host for them is confirmed.
        url.to_string()
    }
}
