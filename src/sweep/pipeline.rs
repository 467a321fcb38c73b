/// The sweep pipeline
///
/// One run is an ordered list of named steps, each of which can be turned
/// off independently:
///
/// 1. `PercentPurge` - delete files with the reserved character in their name
/// 2. catalog load (always)
/// 3. `MissingImages` - drop entries whose image is not in the folder
/// 4. `Truncate` - keep the first N entries
/// 5. `Sanitize` - strip the forbidden character from text fields
/// 6. catalog save (only when 3-5 changed something)
/// 7. `Reap` - delete image files the final catalog no longer uses
///
/// The run returns a `SweepReport`; printing it is left to the caller.
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{filter, folder};
use crate::error::Result;
use crate::state::catalog;
use crate::state::config::SweepConfig;
use crate::state::data::{DeletionReport, MissingImagesReport, SanitizeReport, TruncateReport};

/// A named, toggleable pipeline step
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    PercentPurge,
    MissingImages,
    Truncate,
    Sanitize,
    Reap,
}

impl Step {
    /// All steps in execution order
    pub const ALL: [Step; 5] = [
        Step::PercentPurge,
        Step::MissingImages,
        Step::Truncate,
        Step::Sanitize,
        Step::Reap,
    ];

    fn enabled_in(self, config: &SweepConfig) -> bool {
        let steps = &config.steps;
        match self {
            Step::PercentPurge => steps.purge_percent,
            Step::MissingImages => steps.filter_missing,
            Step::Truncate => steps.truncate,
            Step::Sanitize => steps.sanitize,
            Step::Reap => steps.reap,
        }
    }
}

/// Result of one step, in the order the steps ran
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepReport {
    PercentPurge(DeletionReport),
    MissingImages(MissingImagesReport),
    Truncate(TruncateReport),
    Sanitize(SanitizeReport),
    Reap(DeletionReport),
}

impl StepReport {
    pub fn step(&self) -> Step {
        match self {
            StepReport::PercentPurge(_) => Step::PercentPurge,
            StepReport::MissingImages(_) => Step::MissingImages,
            StepReport::Truncate(_) => Step::Truncate,
            StepReport::Sanitize(_) => Step::Sanitize,
            StepReport::Reap(_) => Step::Reap,
        }
    }

    /// Whether this step modified the catalog
    pub fn changed_catalog(&self) -> bool {
        match self {
            StepReport::MissingImages(r) => !r.removed.is_empty(),
            StepReport::Truncate(r) => !r.removed.is_empty(),
            StepReport::Sanitize(r) => r.changed_fields > 0,
            StepReport::PercentPurge(_) | StepReport::Reap(_) => false,
        }
    }

    /// Whether this step changed anything at all (catalog or folder)
    pub fn changed_anything(&self) -> bool {
        match self {
            StepReport::PercentPurge(r) | StepReport::Reap(r) => !r.deleted.is_empty(),
            _ => self.changed_catalog(),
        }
    }
}

/// Everything a run did
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub catalog_path: PathBuf,
    pub images_dir: PathBuf,
    pub dry_run: bool,
    pub original_count: usize,
    /// Entries left after the existence filter
    pub filtered_count: usize,
    pub final_count: usize,
    pub removed_count: usize,
    /// The catalog changed and was (or in dry-run, would have been) saved
    pub would_write: bool,
    pub catalog_written: bool,
    pub steps: Vec<StepReport>,
}

impl SweepReport {
    /// Find the report of a given step, if it ran
    #[cfg(test)]
    pub fn step(&self, step: Step) -> Option<&StepReport> {
        self.steps.iter().find(|r| r.step() == step)
    }

    /// True if any step changed the catalog or the folder
    pub fn has_changes(&self) -> bool {
        self.steps.iter().any(StepReport::changed_anything)
    }
}

pub struct Pipeline {
    config: SweepConfig,
}

impl Pipeline {
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Steps that will run, in order
    pub fn enabled_steps(&self) -> Vec<Step> {
        Step::ALL
            .into_iter()
            .filter(|step| step.enabled_in(&self.config))
            .collect()
    }

    fn enabled(&self, step: Step) -> bool {
        step.enabled_in(&self.config)
    }

    /// Run the whole sweep.
    ///
    /// Fails only when the catalog cannot be loaded or a required save fails.
    /// The percent purge has already happened by the time a load fails.
    ///
    /// In a dry run the purge only pretends to delete, so its names are
    /// carried as `gone` and hidden from every later folder listing.
    pub fn run(&self) -> Result<SweepReport> {
        let config = &self.config;
        let started_at = Utc::now();
        let mut steps = Vec::new();
        let mut gone = HashSet::new();

        info!(
            catalog = %config.catalog_path.display(),
            images = %config.images_dir.display(),
            dry_run = config.dry_run,
            "starting sweep"
        );

        if self.enabled(Step::PercentPurge) {
            let purge = folder::purge_reserved_names(
                &config.images_dir,
                config.reserved_char,
                config.dry_run,
            );
            if config.dry_run {
                gone.extend(purge.deleted.iter().cloned());
            }
            record(&mut steps, StepReport::PercentPurge(purge));
        }

        let mut entries = catalog::load(&config.catalog_path)?;
        let original_count = entries.len();
        let mut filtered_count = original_count;

        if self.enabled(Step::MissingImages) {
            let missing = filter::filter_missing_images(&mut entries, &config.images_dir, &gone);
            filtered_count = entries.len();
            record(&mut steps, StepReport::MissingImages(missing));
        }
        if self.enabled(Step::Truncate) {
            let trimmed = filter::truncate(&mut entries, config.limit);
            record(&mut steps, StepReport::Truncate(trimmed));
        }
        if self.enabled(Step::Sanitize) {
            let sanitized =
                filter::sanitize(&mut entries, &config.sanitized_fields, config.forbidden_char);
            record(&mut steps, StepReport::Sanitize(sanitized));
        }

        let would_write = steps.iter().any(StepReport::changed_catalog);
        let catalog_written = if would_write && !config.dry_run {
            catalog::save(&config.catalog_path, &entries)?;
            true
        } else {
            debug!(would_write, "catalog left untouched");
            false
        };

        if self.enabled(Step::Reap) {
            let reaped = folder::reap_unused(
                &config.images_dir,
                &entries,
                &config.fallback_image,
                &config.image_extensions,
                &gone,
                config.dry_run,
            );
            record(&mut steps, StepReport::Reap(reaped));
        }

        let final_count = entries.len();
        Ok(SweepReport {
            started_at,
            finished_at: Utc::now(),
            catalog_path: config.catalog_path.clone(),
            images_dir: config.images_dir.clone(),
            dry_run: config.dry_run,
            original_count,
            filtered_count,
            final_count,
            removed_count: original_count - final_count,
            would_write,
            catalog_written,
            steps,
        })
    }
}

fn record(steps: &mut Vec<StepReport>, report: StepReport) {
    debug!(step = ?report.step(), changed = report.changed_anything(), "step done");
    steps.push(report);
}
