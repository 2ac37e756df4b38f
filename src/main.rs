use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use car_listings_lib::application::{CrawlLoop, CrawlOutcome, PageSource, Paginator};
use car_listings_lib::domain::ResultSummary;
use car_listings_lib::infrastructure::{
    AppConfig, CardListParser, ConfigManager, ExportFormat, HttpListingSource, SiteProfile,
    SnapshotListingSource, export_all, init_logging_with_config,
};

#[derive(Parser)]
#[command(author, version, about = "Collects used-car listings from French classified sites")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl a site over HTTP
    Crawl(CrawlArgs),
    /// Run the crawl over saved HTML result pages, in the given order
    Replay {
        #[command(flatten)]
        args: CrawlArgs,
        #[arg(required = true)]
        pages: Vec<PathBuf>,
    },
    /// List the known site profiles
    Sites,
    /// Show or reset the configuration
    Config {
        /// Overwrite the configuration file with defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Args, Clone)]
struct CrawlArgs {
    /// Site profile name
    #[arg(short, long)]
    site: Option<String>,

    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    #[arg(long)]
    max_pages: Option<u32>,

    /// Upper price bound, pushed into the search URL where supported
    #[arg(long)]
    max_price: Option<u32>,

    /// Only keep these brands (repeatable)
    #[arg(short, long = "brand")]
    brands: Vec<String>,

    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Export formats (repeatable)
    #[arg(short, long = "format", value_enum)]
    formats: Vec<ExportFormat>,

    /// Keep encounter order instead of sorting by descending price
    #[arg(long)]
    no_sort: bool,
}

impl CrawlArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(site) = &self.site {
            config.crawl.site = site.clone();
        }
        if let Some(max) = self.max_results {
            config.crawl.max_results = max;
        }
        if self.max_pages.is_some() {
            config.crawl.max_pages = self.max_pages;
        }
        if self.max_price.is_some() {
            config.filters.max_price = self.max_price;
        }
        if !self.brands.is_empty() {
            config.filters.brand_allow_list = self.brands.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.export.output_dir = dir.clone();
        }
        if !self.formats.is_empty() {
            config.export.formats = self.formats.clone();
        }
        if self.no_sort {
            config.export.sort_by_price_desc = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_config().await?;
    init_logging_with_config(&config.logging)?;

    match cli.command {
        Command::Crawl(args) => {
            args.apply(&mut config);
            let site = site_profile(&config)?;
            let mut source = HttpListingSource::for_site(&site, &config)?;
            info!("🌐 Crawling {} from {}", site.display_name, source.current_url());
            crawl_and_export(&site, &config, &mut source).await
        }
        Command::Replay { args, pages } => {
            args.apply(&mut config);
            let site = site_profile(&config)?;
            let parser = CardListParser::new(&site.selectors)?;
            let mut source = SnapshotListingSource::from_files(parser, &pages).await?;
            info!("📂 Replaying {} saved pages with the {} profile", source.page_count(), site.display_name);
            crawl_and_export(&site, &config, &mut source).await
        }
        Command::Sites => {
            for site in SiteProfile::all() {
                println!("{:<12} {:<12} {}", site.name, site.display_name, site.search_url);
            }
            Ok(())
        }
        Command::Config { reset } => {
            if reset {
                config = manager.reset_to_defaults().await?;
            }
            println!("# {}", manager.config_path().display());
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?
            );
            Ok(())
        }
    }
}

fn site_profile(config: &AppConfig) -> Result<SiteProfile> {
    match SiteProfile::by_name(&config.crawl.site) {
        Some(site) => Ok(site),
        None => bail!(
            "Unknown site '{}' (known: {})",
            config.crawl.site,
            SiteProfile::all().iter().map(|s| s.name).collect::<Vec<_>>().join(", ")
        ),
    }
}

async fn crawl_and_export<S>(site: &SiteProfile, config: &AppConfig, source: &mut S) -> Result<()>
where
    S: PageSource + Paginator,
{
    let mut options = config.crawl.to_options();
    options.stuck_detection &= site.stuck_detection;

    let crawl = CrawlLoop::new(site.normalizer(config)?, options).with_site_name(site.name);
    let outcome = crawl.run(source).await;

    if let Some(fault) = &outcome.fault {
        warn!("Crawl ended on a fault: {}", fault);
    }
    print_summary(&outcome);

    if outcome.results.is_empty() {
        warn!("No listings collected, nothing to export");
        return Ok(());
    }
    for path in export_all(&outcome.results, &config.export).await? {
        println!("💾 {}", path.display());
    }
    Ok(())
}

fn print_summary(outcome: &CrawlOutcome) {
    let ResultSummary {
        total,
        unique_brands,
        unique_models,
        prices,
        year_range,
        top_brands,
    } = outcome.results.summary();

    println!("{}", "=".repeat(60));
    println!("📊 Run {} - {} pages, stopped: {}", outcome.run_id, outcome.pages_visited, outcome.stop_reason);
    println!(
        "Cards: {} seen, {} rejected, {} duplicates, {} unreadable",
        outcome.counters.cards_seen,
        outcome.counters.rejected(),
        outcome.counters.duplicates,
        outcome.counters.card_faults
    );
    println!("Listings: {total} ({unique_brands} brands, {unique_models} models)");
    if let Some(p) = prices {
        println!(
            "Price: avg €{:.2}, median €{:.2}, min €{}, max €{}",
            p.average, p.median, p.min, p.max
        );
    }
    if let Some((oldest, newest)) = year_range {
        println!("Years: {oldest} - {newest}");
    }
    if !top_brands.is_empty() {
        println!("Top brands:");
        for (brand, count) in top_brands {
            println!("  {brand:<15} {count}");
        }
    }
    println!("{}", "=".repeat(60));
}
