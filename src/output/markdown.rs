//! Markdown summary generation
//!
//! This module generates a human-readable markdown listing of the catalog,
//! with overall statistics followed by one table row per species.

use crate::catalog::Catalog;
use crate::output::stats::CatalogStatistics;
use crate::species::{ElementalType, SpeciesRecord};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary of `catalog`
///
/// # Arguments
///
/// * `catalog` - The catalog to describe
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(std::io::Error)` - Failed to write summary
pub fn generate_markdown_summary(catalog: &Catalog, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(catalog);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote catalog summary to {}", output_path.display());
    Ok(())
}

fn types_cell(record: &SpeciesRecord) -> String {
    if record.type_b == ElementalType::None {
        record.type_a.to_string()
    } else {
        format!("{} / {}", record.type_a, record.type_b)
    }
}

fn forms_cell(record: &SpeciesRecord) -> String {
    if record.forms.is_empty() {
        "-".to_string()
    } else {
        record
            .forms
            .iter()
            .map(|f| f.form_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn evolutions_cell(record: &SpeciesRecord) -> String {
    if record.evolutions.is_empty() {
        "-".to_string()
    } else {
        record
            .evolutions
            .iter()
            .map(|e| format!("{} (#{})", e.name, e.id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Formats a catalog as markdown
///
/// Species are listed in identifier order.
pub fn format_markdown_summary(catalog: &Catalog) -> String {
    let stats = CatalogStatistics::from_catalog(catalog);
    let mut md = String::new();

    // Title
    md.push_str("# Dex-Ripple Catalog Summary\n\n");

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Species**: {}\n", stats.total_species));
    md.push_str(&format!("- **Forms**: {}\n", stats.total_forms));
    md.push_str(&format!("- **Evolution Chains**: {}\n", stats.chains));
    md.push_str(&format!("- **Basic Species**: {}\n\n", stats.basic_species));

    if !stats.by_arctype.is_empty() {
        md.push_str("## Arctype Breakdown\n\n");
        md.push_str("| Arctype | Count |\n");
        md.push_str("|---------|-------|\n");
        for (arctype, count) in &stats.by_arctype {
            md.push_str(&format!("| {} | {} |\n", arctype, count));
        }
        md.push('\n');
    }

    md.push_str("## Species\n\n");
    if catalog.is_empty() {
        md.push_str("*No species in the catalog.*\n");
        return md;
    }

    md.push_str("| # | Name | Gen | Types | Arctype | Forms | Evolves Into |\n");
    md.push_str("|---|------|-----|-------|---------|-------|--------------|\n");

    let mut records = catalog.all();
    records.sort_by_key(|r| r.id);
    for record in records {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            record.id,
            record.name,
            record.generation,
            types_cell(&record),
            record.arctype,
            forms_cell(&record),
            evolutions_cell(&record)
        ));
    }

    md
}
