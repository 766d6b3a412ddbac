use crate::cli::Cli;
use crate::error::ScrapeError;
use crate::scraper::fetch::FetchOptions;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://www.walmart.com";
pub const DEFAULT_IMAGE_ORIGIN: &str = "https://i5.walmartimages.com";
const DEFAULT_QUERY: &str = "kids clothes";
const DEFAULT_MAX_PRICE: f64 = 2.0;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DUMP_PATH: &str = "walmart-next-data.json";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const ENV_FILE: &str = ".env";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub query: String,
    pub max_price: f64,
    pub base_url: String,
    pub image_origin: String,
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
    pub dump_path: Option<PathBuf>,
    pub html_path: Option<PathBuf>,
    pub block_phrases: Vec<String>,
    pub send_email: bool,
    pub email: Option<EmailConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailConfig {
    pub user: String,
    pub password: String,
    pub recipient: String,
    pub smtp_host: String,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    defaults: ConfigDefaults,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigDefaults {
    query: Option<String>,
    max_price: Option<f64>,
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
    dump_path: Option<String>,
    #[serde(default)]
    block_phrases: Vec<String>,
    smtp_host: Option<String>,
}

impl AppConfig {
    pub fn load(cli: &Cli) -> Result<Self, ScrapeError> {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("walmart-deals");
        let file_config = load_config_file(&config_dir);
        let env_file = load_env_file(Path::new(ENV_FILE));
        Self::resolve(cli, layered_env(&env_file), file_config)
    }

    /// Priority: CLI flags → env vars → config file → defaults
    pub(crate) fn resolve<F>(cli: &Cli, env: F, file_config: ConfigFile) -> Result<Self, ScrapeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.is_empty());
        let defaults = file_config.defaults;

        let query = cli
            .query
            .clone()
            .or_else(|| env("WALMART_QUERY"))
            .or(defaults.query)
            .unwrap_or_else(|| DEFAULT_QUERY.to_string());

        let max_price_env = match env("WALMART_MAX_PRICE") {
            Some(raw) => Some(raw.trim().parse::<f64>().map_err(|_| {
                ScrapeError::Config(format!("WALMART_MAX_PRICE is not a number: '{}'", raw))
            })?),
            None => None,
        };
        let max_price = cli
            .max_price
            .or(max_price_env)
            .or(defaults.max_price)
            .unwrap_or(DEFAULT_MAX_PRICE);
        Self::validate_max_price(max_price)?;

        let dump_path = if cli.no_dump {
            None
        } else {
            Some(
                cli.dump_path
                    .clone()
                    .or_else(|| defaults.dump_path.map(PathBuf::from))
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DUMP_PATH)),
            )
        };

        let send_email = cli.send_email || env("SEND_EMAIL").as_deref() == Some("true");

        let email = if send_email {
            let smtp_host = env("SMTP_HOST")
                .or(defaults.smtp_host)
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
            Some(Self::email_from_env(&env, smtp_host)?)
        } else {
            None
        };

        Ok(AppConfig {
            query,
            max_price,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_origin: DEFAULT_IMAGE_ORIGIN.to_string(),
            user_agent: defaults.user_agent,
            timeout_secs: defaults.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            dump_path,
            html_path: cli.html.clone(),
            block_phrases: defaults.block_phrases,
            send_email,
            email,
        })
    }

    pub fn validate_max_price(max_price: f64) -> Result<(), ScrapeError> {
        if !max_price.is_finite() || max_price <= 0.0 {
            return Err(ScrapeError::Config(format!(
                "Max price must be a positive number, got {}",
                max_price
            )));
        }
        Ok(())
    }

    fn email_from_env<F>(env: &F, smtp_host: String) -> Result<EmailConfig, ScrapeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user = env("GMAIL_USER");
        let password = env("GMAIL_APP_PASSWORD");
        let recipient = env("EMAIL_RECIPIENT");

        match (user, password, recipient) {
            (Some(user), Some(password), Some(recipient)) => Ok(EmailConfig {
                user,
                password,
                recipient,
                smtp_host,
            }),
            (user, password, recipient) => {
                let missing: Vec<&str> = [
                    ("GMAIL_USER", user.is_none()),
                    ("GMAIL_APP_PASSWORD", password.is_none()),
                    ("EMAIL_RECIPIENT", recipient.is_none()),
                ]
                .iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| *name)
                .collect();
                Err(ScrapeError::Config(format!(
                    "Email sending requested but {} not set. Unset SEND_EMAIL to just print results",
                    missing.join(", ")
                )))
            }
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        let mut options = FetchOptions {
            timeout_secs: self.timeout_secs,
            referer: Some(format!("{}/", self.base_url)),
            ..FetchOptions::default()
        };
        if let Some(ref ua) = self.user_agent {
            options.user_agent = ua.clone();
        }
        options
    }
}

fn load_config_file(config_dir: &Path) -> ConfigFile {
    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid {}: {}", config_path.display(), e);
                ConfigFile::default()
            }),
            Err(_) => ConfigFile::default(),
        }
    } else {
        ConfigFile::default()
    }
}

/// Variables from a local `.env` file. Not written into the process environment.
fn load_env_file(path: &Path) -> HashMap<String, String> {
    match dotenvy::from_path_iter(path) {
        Ok(entries) => collect_env_entries(entries),
        Err(e) => {
            tracing::debug!("No {} loaded: {}", path.display(), e);
            HashMap::new()
        }
    }
}

fn collect_env_entries<I>(entries: I) -> HashMap<String, String>
where
    I: Iterator<Item = dotenvy::Result<(String, String)>>,
{
    entries
        .filter_map(|entry| match entry {
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::warn!("Skipping invalid {} entry: {}", ENV_FILE, e);
                None
            }
        })
        .collect()
}

/// Process environment first, then `.env` values for keys it does not set.
fn layered_env(env_file: &HashMap<String, String>) -> impl Fn(&str) -> Option<String> + '_ {
    move |key| std::env::var(key).ok().or_else(|| env_file.get(key).cloned())
}
