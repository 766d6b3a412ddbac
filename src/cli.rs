use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "walmart-deals",
    version,
    about = "Report Walmart search results below a price threshold"
)]
pub struct Cli {
    /// Search keywords (default: "kids clothes")
    #[arg(long)]
    pub query: Option<String>,

    /// Exclusive upper price bound in dollars (default: 2)
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Email the results (same as SEND_EMAIL=true)
    #[arg(long)]
    pub send_email: bool,

    /// Do not write the embedded page data to disk
    #[arg(long)]
    pub no_dump: bool,

    /// Where to write the embedded page data (default: walmart-next-data.json)
    #[arg(long)]
    pub dump_path: Option<PathBuf>,

    /// Parse a saved search page instead of fetching one
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
