//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a complete crawl over `[1, max_id]`:
//! - Spawning one worker per scheduler assignment
//! - Expanding each chain a worker visits and handing the tree on
//! - Serializing catalog inserts through a single collector task
//! - Announcing the finished catalog to subscribers

use crate::catalog::{Catalog, CatalogReady, ReadyNotifier, ReadySource};
use crate::config::Config;
use crate::crawler::expander::ChainExpander;
use crate::crawler::fetcher::{DataSource, Endpoints, HttpSource};
use crate::crawler::range::estimate_max_chain_id;
use crate::crawler::scheduler::{Scheduler, WorkerAssignment};
use crate::species::SpeciesRecord;
use crate::{DexError, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Capacity of the worker-to-collector channel
const CHANNEL_CAPACITY: usize = 64;

/// How often the collector reports progress, in inserted chains
const PROGRESS_INTERVAL: usize = 25;

/// Per-worker crawl counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: u32,

    /// Identifiers the worker attempted
    pub visited: usize,

    /// Chains expanded and handed to the collector
    pub succeeded: usize,

    /// Chains skipped because fetching or parsing failed
    pub failed: usize,
}

/// Summary of a finished crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub max_id: u32,
    pub workers: Vec<WorkerReport>,

    /// Chains registered in the catalog
    pub chains_inserted: usize,

    /// Chains rejected by the catalog as duplicates
    pub rejected: usize,

    /// Registered species identifiers
    pub species: usize,

    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn visited(&self) -> usize {
        self.workers.iter().map(|w| w.visited).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.workers.iter().map(|w| w.succeeded).sum()
    }

    pub fn failed(&self) -> usize {
        self.workers.iter().map(|w| w.failed).sum()
    }
}

/// The catalog a crawl produced, with its report
#[derive(Debug)]
pub struct CrawlOutcome {
    pub catalog: Catalog,
    pub report: CrawlReport,
}

/// Main crawler coordinator structure
pub struct Coordinator<S> {
    source: S,
    endpoints: Arc<Endpoints>,
    scheduler: Scheduler,
    notifier: ReadyNotifier,
}

impl<S> Coordinator<S>
where
    S: DataSource + Clone + 'static,
{
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `source` - Data source; every worker gets its own clone
    /// * `endpoints` - Endpoint URLs of the source
    /// * `max_id` - Highest chain identifier to visit
    /// * `workers` - Number of concurrent workers
    /// * `notifier` - Receives the catalog-ready announcement
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(DexError)` - `workers` is zero
    pub fn new(
        source: S,
        endpoints: Endpoints,
        max_id: u32,
        workers: u32,
        notifier: ReadyNotifier,
    ) -> Result<Self> {
        let scheduler = Scheduler::new(max_id, workers)?;
        Ok(Self {
            source,
            endpoints: Arc::new(endpoints),
            scheduler,
            notifier,
        })
    }

    /// Runs the crawl to completion
    ///
    /// Individual chains that fail are skipped. Readiness is announced only
    /// after every worker and the collector have finished.
    pub async fn run(self) -> Result<CrawlOutcome> {
        let start_time = Instant::now();
        tracing::info!(
            "Crawling chains 1..={} with {} workers",
            self.scheduler.max_id(),
            self.scheduler.workers()
        );

        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let collector = tokio::spawn(collect(receiver));

        let mut workers = JoinSet::new();
        for assignment in self.scheduler.assignments() {
            workers.spawn(run_worker(
                self.source.clone(),
                Arc::clone(&self.endpoints),
                assignment,
                sender.clone(),
            ));
        }
        // The collector stops once every worker has dropped its sender
        drop(sender);

        let mut reports = Vec::with_capacity(self.scheduler.workers() as usize);
        while let Some(joined) = workers.join_next().await {
            let report = joined.map_err(|e| DexError::Worker(e.to_string()))?;
            reports.push(report);
        }
        reports.sort_by_key(|r| r.worker);

        let collected = collector
            .await
            .map_err(|e| DexError::Worker(format!("collector: {}", e)))?;

        let report = CrawlReport {
            max_id: self.scheduler.max_id(),
            workers: reports,
            chains_inserted: collected.inserted,
            rejected: collected.rejected,
            species: collected.catalog.len(),
            elapsed: start_time.elapsed(),
        };

        tracing::info!("Crawl complete!");
        tracing::info!("  Chains visited: {}", report.visited());
        tracing::info!("  Chains failed: {}", report.failed());
        tracing::info!("  Chains rejected: {}", report.rejected);
        tracing::info!("  Species registered: {}", report.species);
        tracing::info!("  Time elapsed: {:.2}s", report.elapsed.as_secs_f64());

        self.notifier.notify(CatalogReady {
            source: ReadySource::Crawl,
            species: collected.catalog.len(),
        });

        Ok(CrawlOutcome {
            catalog: collected.catalog,
            report,
        })
    }
}

/// Visits every identifier of one assignment in increasing order
async fn run_worker<S: DataSource>(
    source: S,
    endpoints: Arc<Endpoints>,
    assignment: WorkerAssignment,
    sender: mpsc::Sender<SpeciesRecord>,
) -> WorkerReport {
    let mut report = WorkerReport {
        worker: assignment.worker,
        ..WorkerReport::default()
    };
    let expander = ChainExpander::new(&source);

    tracing::debug!("Worker {} owns chains {:?}", assignment.worker, assignment.ids);

    for id in assignment.ids {
        report.visited += 1;
        let url = endpoints.chain(id);

        match expander.expand_chain(&url).await {
            Ok(record) => {
                if sender.send(record).await.is_err() {
                    tracing::warn!("Worker {}: collector is gone, stopping", assignment.worker);
                    break;
                }
                report.succeeded += 1;
            }
            Err(e) => {
                report.failed += 1;
                tracing::debug!("Skipping chain {}: {}", id, e);
            }
        }
    }

    tracing::debug!(
        "Worker {} finished: {} visited, {} failed",
        report.worker,
        report.visited,
        report.failed
    );
    report
}

struct Collected {
    catalog: Catalog,
    inserted: usize,
    rejected: usize,
}

/// Single writer of the catalog under construction
async fn collect(mut receiver: mpsc::Receiver<SpeciesRecord>) -> Collected {
    let mut collected = Collected {
        catalog: Catalog::new(),
        inserted: 0,
        rejected: 0,
    };

    while let Some(record) = receiver.recv().await {
        let root_id = record.id;
        match collected.catalog.insert(record) {
            Ok(()) => {
                collected.inserted += 1;
                if collected.inserted % PROGRESS_INTERVAL == 0 {
                    tracing::info!(
                        "Progress: {} chains, {} species",
                        collected.inserted,
                        collected.catalog.len()
                    );
                }
            }
            Err(e) => {
                collected.rejected += 1;
                tracing::warn!("Rejected chain rooted at {}: {}", root_id, e);
            }
        }
    }

    collected
}

/// Crawls `[1, max_id]` and returns the resulting catalog
pub async fn crawl<S>(
    source: S,
    endpoints: Endpoints,
    max_id: u32,
    workers: u32,
    notifier: &ReadyNotifier,
) -> Result<Catalog>
where
    S: DataSource + Clone + 'static,
{
    let coordinator = Coordinator::new(source, endpoints, max_id, workers, notifier.clone())?;
    Ok(coordinator.run().await?.catalog)
}

/// Runs a complete crawl against the configured HTTP source
///
/// Estimates the chain range, then crawls it with the configured number of
/// workers.
///
/// # Example
///
/// ```no_run
/// use dex_ripple::config::load_config;
/// use dex_ripple::crawler::run_crawl;
/// use dex_ripple::ReadyNotifier;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let outcome = run_crawl(&config, &ReadyNotifier::new()).await?;
/// println!("{} species", outcome.catalog.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, notifier: &ReadyNotifier) -> Result<CrawlOutcome> {
    let source = HttpSource::from_config(config)?;
    let endpoints = Endpoints::new(&config.source.base_url)?;
    let max_id = estimate_max_chain_id(&source, &endpoints).await?;

    let coordinator = Coordinator::new(
        source,
        endpoints,
        max_id,
        config.crawler.workers,
        notifier.clone(),
    )?;
    coordinator.run().await
}
