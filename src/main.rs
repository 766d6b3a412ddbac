mod cli;
mod config;
mod error;
mod model;
mod notify;
mod output;
mod scraper;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::AppConfig;

use crate::error::ScrapeError;
use crate::model::Product;
use crate::notify::{Digest, EmailNotifier};
use crate::scraper::blocked::BlockDetector;
use crate::scraper::dedupe::dedupe_by_url;
use crate::scraper::extract::{self as embedded, NEXT_DATA_ID};
use crate::scraper::fetch::{FetchedPage, PageFetcher};
use crate::scraper::helpers::format_threshold;
use crate::scraper::products::ProductExtractor;
use crate::scraper::search::build_search_url;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "walmart_deals=debug"
    } else {
        "walmart_deals=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(&cli)?;

    ctrlc::set_handler(|| {
        eprintln!("\nInterrupted.");
        std::process::exit(130);
    })
    .context("Failed to set Ctrl+C handler")?;

    print!(
        "{}",
        output::format_banner(&chrono::Utc::now().to_rfc3339(), config.send_email)
    );
    println!();

    let products = scrape(&config).await.context("Error during scrape")?;

    print!("{}", output::format_products(&products, config.max_price));

    if products.is_empty() {
        return Ok(());
    }

    match config.email {
        Some(ref email) if config.send_email => {
            println!("Sending email...");
            let digest = Digest {
                products: &products,
                query: &config.query,
                threshold: config.max_price,
            };
            EmailNotifier::new(email.clone())
                .send(&digest)
                .await
                .context("Failed to send email")?;
            println!("Email sent successfully!");
        }
        _ => println!("(Email not sent. Set SEND_EMAIL=true to send email)"),
    }

    Ok(())
}

async fn scrape(config: &AppConfig) -> Result<Vec<Product>> {
    let page = match config.html_path {
        Some(ref path) => FetchedPage::from_file(path)
            .with_context(|| format!("Failed to read saved page {}", path.display()))?,
        None => {
            let url = build_search_url(
                &config.base_url,
                &config.query,
                config.max_price,
            )?;
            let fetcher = PageFetcher::new(&config.fetch_options())?;
            fetcher
                .fetch(&url)
                .await
                .context("Failed to fetch search page")?
        }
    };
    tracing::debug!("HTTP {} from {}", page.status, page.final_url);

    process_page(config, page)
}

/// Everything after the fetch: block check, payload parsing, extraction and dedupe.
fn process_page(config: &AppConfig, page: FetchedPage) -> Result<Vec<Product>> {
    let detector = BlockDetector::with_extra_phrases(config.block_phrases.iter().cloned());
    if detector.is_blocked(&page.body, &page.final_url) {
        return Err(ScrapeError::Blocked {
            url: page.final_url,
        }
        .into());
    }

    tracing::info!("Extracting page data from {} script tag...", NEXT_DATA_ID);
    let data = embedded::extract_next_data(&page.body)?;
    embedded::describe_payload(&data);

    if let Some(ref path) = config.dump_path {
        if let Err(e) = embedded::save_payload(&data, path) {
            tracing::warn!("Could not save page data to {}: {}", path.display(), e);
        }
    }

    tracing::info!("Extracting product data from JSON...");
    let extractor = ProductExtractor::new(config.max_price)
        .with_origins(&config.base_url, &config.image_origin);
    let products = dedupe_by_url(extractor.extract(&data));

    tracing::info!(
        "Found {} products under {}",
        products.len(),
        format_threshold(config.max_price)
    );
    match serde_json::to_string(&products) {
        Ok(json) => tracing::debug!("Products: {}", json),
        Err(e) => tracing::debug!("Could not serialize products: {}", e),
    }
    Ok(products)
}
