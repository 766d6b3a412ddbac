use crate::error::ScrapeError;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Request settings for the single page fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub referer: Option<String>,
    pub timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            referer: None,
            timeout_secs: 30,
        }
    }
}

impl FetchOptions {
    /// Desktop-browser header set. Accept-Encoding is left to reqwest so the
    /// body is decompressed transparently.
    pub fn headers(&self) -> Result<HeaderMap, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, header_value(&self.user_agent)?);
        headers.insert(header::ACCEPT, header_value(&self.accept)?);
        headers.insert(header::ACCEPT_LANGUAGE, header_value(&self.accept_language)?);
        if let Some(ref referer) = self.referer {
            headers.insert(header::REFERER, header_value(referer)?);
        }

        let navigation = [
            ("upgrade-insecure-requests", "1"),
            ("sec-fetch-dest", "document"),
            ("sec-fetch-mode", "navigate"),
            ("sec-fetch-site", "none"),
            ("sec-fetch-user", "?1"),
            ("cache-control", "max-age=0"),
        ];
        for (name, value) in navigation {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }

        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ScrapeError> {
    HeaderValue::from_str(value)
        .map_err(|_| ScrapeError::Config(format!("Invalid header value: {:?}", value)))
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    /// A previously saved search page, treated like a successful fetch.
    pub fn from_file(path: &Path) -> Result<Self, ScrapeError> {
        let body = std::fs::read_to_string(path)?;
        tracing::info!("Loaded {} bytes from {}", body.len(), path.display());
        Ok(Self {
            final_url: format!("file://{}", path.display()),
            status: 200,
            body,
        })
    }
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .default_headers(options.headers()?)
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// One GET, no retries. Statuses below 500 are returned so that challenge
    /// pages served as 403/404 can still be inspected.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
        tracing::info!("Fetching: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let final_url = response.url().to_string();

        check_status(status)?;
        if !status.is_success() {
            tracing::warn!("Got HTTP {} from {}, inspecting body anyway", status, final_url);
        }
        if final_url != url {
            tracing::debug!("Redirected to {}", final_url);
        }

        let body = response.text().await?;
        tracing::debug!("Fetched {} bytes", body.len());

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}

pub fn check_status(status: StatusCode) -> Result<(), ScrapeError> {
    if status.as_u16() >= 500 {
        return Err(ScrapeError::Http {
            status: status.as_u16(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_not_failures() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(check_status(StatusCode::FORBIDDEN).is_ok());
        assert!(check_status(StatusCode::NOT_FOUND).is_ok());
        assert!(check_status(StatusCode::TOO_MANY_REQUESTS).is_ok());
    }

    #[test]
    fn server_errors_fail_with_status() {
        match check_status(StatusCode::SERVICE_UNAVAILABLE) {
            Err(ScrapeError::Http { status }) => assert_eq!(status, 503),
            other => panic!("expected Http error, got {:?}", other),
        }
        assert!(check_status(StatusCode::INTERNAL_SERVER_ERROR).is_err());
    }

    #[test]
    fn headers_include_browser_set() {
        let options = FetchOptions {
            referer: Some("https://www.walmart.com/".to_string()),
            ..FetchOptions::default()
        };
        let headers = options.headers().unwrap();
        assert!(headers[header::USER_AGENT]
            .to_str()
            .unwrap()
            .starts_with("Mozilla/5.0"));
        assert_eq!(headers[header::ACCEPT_LANGUAGE], "en-US,en;q=0.9");
        assert_eq!(headers[header::REFERER], "https://www.walmart.com/");
        assert_eq!(headers["sec-fetch-mode"], "navigate");
        assert!(!headers.contains_key(header::ACCEPT_ENCODING));
    }

    #[test]
    fn loads_saved_page() {
        let path = std::env::temp_dir().join(format!("walmart-deals-page-{}.html", std::process::id()));
        std::fs::write(&path, "<html>saved</html>").unwrap();
        let page = FetchedPage::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(page.body, "<html>saved</html>");
        assert_eq!(page.status, 200);
        assert!(page.final_url.starts_with("file://"));
    }

    #[test]
    fn missing_saved_page_is_io_error() {
        let path = std::env::temp_dir().join("walmart-deals-no-such-page.html");
        assert!(matches!(FetchedPage::from_file(&path), Err(ScrapeError::Io(_))));
    }

    #[test]
    fn rejects_invalid_header_values() {
        let options = FetchOptions {
            user_agent: "bad\nagent".to_string(),
            ..FetchOptions::default()
        };
        assert!(matches!(options.headers(), Err(ScrapeError::Config(_))));
    }
}
