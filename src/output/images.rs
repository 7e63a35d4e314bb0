//! Bulk sprite export
//!
//! Every present sprite of every registered record and its forms is written
//! as `<id>[-<form>]<variant>.png`, where the variant suffix is empty for the
//! default sprite and `-shiny`, `-female` or `-female-shiny` otherwise. A form
//! with a blank form name is written as `<id>-form<n>`, `n` being its
//! one-based position among the record's forms.

use crate::catalog::Catalog;
use crate::species::{SpeciesRecord, Sprite, SpriteKind};
use crate::Result;
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// Counts of a finished export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Files written
    pub written: usize,

    /// Files that could not be written
    pub failed: usize,
}

impl ExportReport {
    fn merge(self, other: Self) -> Self {
        Self {
            written: self.written + other.written,
            failed: self.failed + other.failed,
        }
    }
}

/// File name of one sprite of `record`
pub fn sprite_file_name(record: &SpeciesRecord, kind: SpriteKind) -> String {
    format!("{}{}.png", record.file_stem(), kind.file_suffix())
}

/// File stem of the form at `position`, distinct from its root's stem
fn form_stem(form: &SpeciesRecord, position: usize) -> String {
    if form.form_name.trim().is_empty() {
        format!("{}-form{}", form.id, position + 1)
    } else {
        form.file_stem()
    }
}

fn write_sprite(dir: &Path, stem: &str, kind: SpriteKind, sprite: &Sprite) -> ExportReport {
    let path = dir.join(format!("{}{}.png", stem, kind.file_suffix()));
    match fs::write(&path, &sprite.png) {
        Ok(()) => ExportReport {
            written: 1,
            failed: 0,
        },
        Err(e) => {
            tracing::warn!("Failed to write {}: {}", path.display(), e);
            ExportReport {
                written: 0,
                failed: 1,
            }
        }
    }
}

/// Writes every present sprite image in the catalog to `dir`
///
/// Missing sprites are skipped. A file that cannot be written is logged and
/// counted without stopping the export.
///
/// # Returns
///
/// * `Ok(ExportReport)` - Export ran; see the counts for individual failures
/// * `Err(DexError)` - `dir` could not be created
pub fn export_images(catalog: &Catalog, dir: &Path) -> Result<ExportReport> {
    fs::create_dir_all(dir)?;

    let report = catalog
        .par_records()
        .flat_map_iter(|record| {
            let forms = record
                .forms
                .iter()
                .enumerate()
                .map(|(position, form)| (form, form_stem(form, position)));
            std::iter::once((record.as_ref(), record.file_stem())).chain(forms)
        })
        .flat_map_iter(|(record, stem)| {
            record
                .sprites
                .iter()
                .filter_map(|(kind, entry)| entry.image.as_ref().map(|s| (kind, s)))
                .map(move |(kind, sprite)| (stem.clone(), kind, sprite))
        })
        .map(|(stem, kind, sprite)| write_sprite(dir, &stem, kind, sprite))
        .reduce(ExportReport::default, ExportReport::merge);

    tracing::info!(
        "Exported {} sprites to {} ({} failed)",
        report.written,
        dir.display(),
        report.failed
    );
    Ok(report)
}
