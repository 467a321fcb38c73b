/// Console presentation of a sweep report
///
/// Pure formatting: the pipeline hands over a `SweepReport` and this module
/// turns it into the human-readable step-by-step summary.
use std::fmt::Write;

use crate::state::data::DeletionReport;
use crate::sweep::pipeline::{StepReport, SweepReport};

const RULE: &str = "--------------------------------------------------";

/// Render the whole report as text
pub fn render(report: &SweepReport) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &SweepReport) -> std::fmt::Result {
    writeln!(out, "=== Content Sweep ===")?;
    writeln!(out, "Catalog: {}", report.catalog_path.display())?;
    writeln!(out, "Images:  {}", report.images_dir.display())?;
    if report.dry_run {
        writeln!(out, "🔍 Dry run: nothing will be deleted or saved")?;
    }
    writeln!(out, "{RULE}")?;

    for step in &report.steps {
        match step {
            StepReport::PercentPurge(r) => {
                writeln!(out, "\n=== Removing images with '%' in their name ===")?;
                write_deletions(out, r, "images with '%' in their name", report.dry_run)?;
            }
            StepReport::MissingImages(r) => {
                writeln!(out, "\n=== Checking for missing images ===")?;
                if r.folder_missing {
                    writeln!(out, "⚠️  Images folder not found, keeping every entry")?;
                } else if r.removed.is_empty() {
                    writeln!(out, "✅ All images are present!")?;
                } else {
                    writeln!(out, "Found {} entries with missing images", r.removed.len())?;
                    for (i, entry) in r.removed.iter().enumerate() {
                        writeln!(out, "{:2}. {}", i + 1, entry.title)?;
                        writeln!(out, "    Image: {}", entry.image)?;
                    }
                }
                writeln!(out, "Entries after image filtering: {}", report.filtered_count)?;
            }
            StepReport::Truncate(r) => {
                writeln!(out, "\n=== Limiting to top {} elements ===", r.limit)?;
                if r.removed.is_empty() {
                    writeln!(out, "Content is within the limit of {}", r.limit)?;
                } else {
                    writeln!(out, "Trimmed {} entries", r.removed.len())?;
                    for (i, entry) in r.removed.iter().enumerate() {
                        writeln!(out, "{:2}. {}", i + 1, entry.title)?;
                        writeln!(out, "    Position: {}", entry.position)?;
                    }
                }
            }
            StepReport::Sanitize(r) => {
                writeln!(out, "\n=== Sanitizing text fields ===")?;
                if r.changed_fields == 0 {
                    writeln!(out, "✅ No text fields needed sanitizing")?;
                } else {
                    writeln!(out, "Sanitized {} fields", r.changed_fields)?;
                }
            }
            StepReport::Reap(r) => {
                writeln!(out, "\n=== Removing unused images ===")?;
                write_deletions(out, r, "unused images", report.dry_run)?;
            }
        }
    }

    writeln!(out, "\n{RULE}")?;
    if !report.has_changes() {
        writeln!(out, "✅ No cleanup needed!")?;
    }
    if report.catalog_written {
        writeln!(out, "✅ Successfully updated {}", report.catalog_path.display())?;
    } else if report.would_write {
        writeln!(out, "🔍 Would update {}", report.catalog_path.display())?;
    } else {
        writeln!(out, "✅ No catalog changes needed")?;
    }
    writeln!(out, "Original entries: {}", report.original_count)?;
    writeln!(out, "Final entries: {}", report.final_count)?;
    writeln!(out, "Total removed: {}", report.removed_count)?;
    Ok(())
}

fn write_deletions(
    out: &mut String,
    report: &DeletionReport,
    what: &str,
    dry_run: bool,
) -> std::fmt::Result {
    if report.folder_missing {
        return writeln!(out, "⚠️  Images folder not found, skipped");
    }
    if report.deleted.is_empty() && report.failed.is_empty() {
        return writeln!(out, "✅ No {what} found");
    }

    let verb = if dry_run { "Would delete" } else { "Deleted" };
    writeln!(out, "{verb} {} {what}", report.deleted.len())?;
    for name in &report.deleted {
        writeln!(out, "  🗑️  {name}")?;
    }
    for failed in &report.failed {
        writeln!(out, "  ⚠️  {}: {}", failed.name, failed.error)?;
    }
    Ok(())
}
