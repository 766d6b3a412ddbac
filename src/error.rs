use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned HTTP {status}")]
    Http { status: u16 },

    #[error("Request was blocked by a bot challenge page ({url})")]
    Blocked { url: String },

    #[error("Could not find {id} script tag. The page structure may have changed")]
    MissingData { id: String },

    #[error("{id} script tag is empty")]
    EmptyData { id: String },

    #[error("Failed to parse {id} JSON: {source}")]
    MalformedJson {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Email delivery failed: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
