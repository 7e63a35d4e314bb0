//! Crawler module for rebuilding the catalog from the remote source
//!
//! This module contains the core crawling logic, including:
//! - The data source capability and its HTTP implementation
//! - Typed documents of the evolution-chain API
//! - Estimation of the chain identifier range
//! - Partitioning that range across workers
//! - Expanding chains into species record trees
//! - Overall crawl coordination

mod coordinator;
mod expander;
mod fetcher;
mod parser;
mod range;
mod scheduler;

#[cfg(test)]
pub(crate) mod fixture;

pub use coordinator::{crawl, run_crawl, Coordinator, CrawlOutcome, CrawlReport, WorkerReport};
pub use expander::ChainExpander;
pub use fetcher::{build_http_client, DataSource, Endpoints, HttpSource};
pub use parser::{derive_form_name, trailing_id, ChainLink};
pub use range::estimate_max_chain_id;
pub use scheduler::{Scheduler, WorkerAssignment};
