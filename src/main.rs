//! Dex-Ripple main entry point
//!
//! This is the command-line interface for the Dex-Ripple catalog crawler.

use clap::Parser;
use dex_ripple::config::{load_config_with_hash, Config};
use dex_ripple::crawler::run_crawl;
use dex_ripple::output::{export_images, generate_markdown_summary, print_statistics, CatalogStatistics};
use dex_ripple::storage::{catalog_path, load_catalog, save_catalog};
use dex_ripple::{Catalog, ReadyNotifier};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Dex-Ripple: a species catalog crawler
///
/// Dex-Ripple rebuilds a local catalog of species from an evolution-chain
/// API, caches it to disk and offers search, statistics and sprite export
/// over it.
#[derive(Parser, Debug)]
#[command(name = "dex-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A species catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Restore the saved catalog instead of crawling
    #[arg(long)]
    load: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["load", "stats", "export_images", "export_summary", "search"])]
    dry_run: bool,

    /// Print catalog statistics
    #[arg(long)]
    stats: bool,

    /// Write every sprite to the configured image directory
    #[arg(long)]
    export_images: bool,

    /// Write a markdown listing of the catalog
    #[arg(long)]
    export_summary: bool,

    /// Search the catalog by species name
    #[arg(long, value_name = "NAME")]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let notifier = ReadyNotifier::new();
    let mut ready = notifier.subscribe();

    let catalog = if cli.load {
        handle_load(&config, &notifier)?
    } else {
        handle_crawl(&config, &config_hash, &notifier).await?
    };

    if let Ok(event) = ready.try_recv() {
        tracing::debug!("Catalog ready from {:?} with {} species", event.source, event.species);
    }

    // Post-actions on the resulting catalog
    if let Some(query) = &cli.search {
        handle_search(&catalog, query);
    }
    if cli.stats {
        print_statistics(&CatalogStatistics::from_catalog(&catalog));
    }
    if cli.export_images {
        handle_export_images(&config, &catalog)?;
    }
    if cli.export_summary {
        handle_export_summary(&config, &catalog)?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dex_ripple=info,warn"),
            1 => EnvFilter::new("dex_ripple=debug,info"),
            2 => EnvFilter::new("dex_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Dex-Ripple Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Request timeout: {}s", config.source.request_timeout_secs);
    println!("  Connect timeout: {}s", config.source.connect_timeout_secs);

    println!("\nCrawler:");
    println!("  Workers: {}", config.crawler.workers);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!(
        "  Catalog: {}",
        catalog_path(Path::new(&config.output.catalog_dir)).display()
    );
    println!("  Images: {}", config.output.image_dir);
    println!("  Summary: {}", config.output.summary_path);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {}evolution-chain/ with {} workers",
        config.source.base_url, config.crawler.workers
    );

    Ok(())
}

/// Handles the --load mode: restores the saved catalog
fn handle_load(config: &Config, notifier: &ReadyNotifier) -> Result<Catalog, Box<dyn std::error::Error>> {
    let dir = Path::new(&config.output.catalog_dir);
    match load_catalog(dir, notifier) {
        Ok(catalog) => Ok(catalog),
        Err(e) => {
            tracing::error!("Failed to restore catalog: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the main crawl operation and saves the result
async fn handle_crawl(
    config: &Config,
    config_hash: &str,
    notifier: &ReadyNotifier,
) -> Result<Catalog, Box<dyn std::error::Error>> {
    tracing::info!(
        "Crawling {} with {} workers",
        config.source.base_url,
        config.crawler.workers
    );

    let outcome = match run_crawl(config, notifier).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    save_catalog(
        &outcome.catalog,
        Path::new(&config.output.catalog_dir),
        config_hash,
    )?;
    Ok(outcome.catalog)
}

/// Handles --search: prints every match
fn handle_search(catalog: &Catalog, query: &str) {
    match catalog.find_by_name(query) {
        None => println!("Search query is empty"),
        Some(results) if results.is_empty() => println!("No species match '{}'", query.trim()),
        Some(results) => {
            println!("{} result(s) for '{}':", results.len(), query.trim());
            for record in results {
                println!(
                    "  #{} {} (generation {}, {}, {})",
                    record.id, record.name, record.generation, record.type_a, record.arctype
                );
                for form in &record.forms {
                    println!("      form: {}", form.form_name);
                }
            }
        }
    }
}

/// Handles --export-images: writes every sprite as PNG
fn handle_export_images(config: &Config, catalog: &Catalog) -> Result<(), Box<dyn std::error::Error>> {
    let report = export_images(catalog, Path::new(&config.output.image_dir))?;
    println!(
        "✓ Exported {} sprites to: {}",
        report.written, config.output.image_dir
    );
    if report.failed > 0 {
        println!("  {} sprites could not be written", report.failed);
    }
    Ok(())
}

/// Handles --export-summary: generates markdown summary
fn handle_export_summary(config: &Config, catalog: &Catalog) -> Result<(), Box<dyn std::error::Error>> {
    generate_markdown_summary(catalog, Path::new(&config.output.summary_path))?;
    println!("✓ Summary exported to: {}", config.output.summary_path);
    Ok(())
}
