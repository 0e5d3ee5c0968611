use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use douban_scraping::{
    api::ListingClient,
    config::{OutputFormat, ScrapeConfig},
    data_collector::collect,
    fs_util::read_toml,
    writer,
};
use log::{debug, info, LevelFilter};
use url::Url;

#[derive(Parser)]
#[command(about = "Scrapes a ranked movie listing into a spreadsheet")]
struct Opts {
    /// TOML file with settings; command-line flags take precedence over it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    #[arg(long)]
    sheet_name: Option<String>,
    #[arg(long)]
    base_url: Option<Url>,
    #[arg(long)]
    user_agent: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long)]
    total: Option<u32>,
    #[arg(long)]
    concurrency: Option<usize>,
    #[arg(long)]
    skip_malformed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Progress and fetch failures are shown unless RUST_LOG says otherwise.
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opts = Opts::parse();
    let config = load_config(opts)?;
    debug!("{config:#?}");

    let client = ListingClient::new(&config.fetch).context("Failed to build the HTTP client")?;
    let records = collect(&client, &config).await?;
    writer::write(&records, &config.output)?;
    info!("Done.");
    Ok(())
}

fn load_config(opts: Opts) -> anyhow::Result<ScrapeConfig> {
    let mut config = match &opts.config {
        Some(path) => read_toml::<ScrapeConfig>(path)?,
        None => ScrapeConfig::default(),
    };
    if let Some(path) = opts.output {
        config.output.path = path;
    }
    if let Some(format) = opts.format {
        config.output.format = Some(format);
    }
    if let Some(sheet_name) = opts.sheet_name {
        config.output.sheet_name = sheet_name;
    }
    if let Some(base_url) = opts.base_url {
        config.fetch.base_url = base_url;
    }
    if let Some(user_agent) = opts.user_agent {
        config.fetch.user_agent = user_agent;
    }
    if let Some(page_size) = opts.page_size {
        config.paging.page_size = page_size;
    }
    if let Some(total) = opts.total {
        config.paging.total = total;
    }
    if let Some(concurrency) = opts.concurrency {
        config.paging.concurrency = concurrency;
    }
    config.skip_malformed |= opts.skip_malformed;
    Ok(config)
}
