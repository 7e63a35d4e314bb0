//! Output module for exporting and describing a catalog
//!
//! This module handles:
//! - Exporting sprite images as PNG files
//! - Generating markdown summaries of the catalog
//! - Computing and printing catalog statistics

mod images;
mod markdown;
pub mod stats;

pub use images::{export_images, sprite_file_name, ExportReport};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, CatalogStatistics};
