use crate::error::ScrapeError;
use url::Url;

/// Search endpoint for `query` limited to `max_price`, e.g.
/// `https://www.walmart.com/search?q=kids+clothes&max_price=2`.
pub fn build_search_url(base_url: &str, query: &str, max_price: f64) -> Result<String, ScrapeError> {
    let base = Url::parse(base_url)
        .and_then(|u| u.join("/search"))
        .map_err(|e| ScrapeError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

    let max_price = max_price.to_string();
    let url = Url::parse_with_params(
        base.as_str(),
        &[("q", query.trim()), ("max_price", max_price.as_str())],
    )
    .map_err(|e| ScrapeError::Config(format!("Invalid search URL: {}", e)))?;

    Ok(url.to_string())
}
