/// Image folder scans and the two deleting passes
///
/// Every pass lists the folder afresh; nothing is cached between steps.
/// Only the top level is read, subdirectories are never entered.
///
/// A dry run deletes nothing, so later passes are handed the names it
/// pretended to delete and leave them out of their listings.
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::filename::entry_filename;
use crate::state::data::{CatalogEntry, DeletionReport, FailedDeletion};

/// One name in the image folder
#[derive(Debug, Clone, PartialEq)]
pub struct FolderEntry {
    /// Name as stored on disk (original casing)
    pub name: String,
    pub path: PathBuf,
    /// Regular file, or a symlink to one
    pub is_file: bool,
}

/// List the folder's direct children, sorted by name.
///
/// Returns `None` when the folder does not exist or cannot be read.
/// Unreadable individual entries are skipped.
pub fn scan(folder: &Path) -> Option<Vec<FolderEntry>> {
    scan_excluding(folder, &HashSet::new())
}

/// Like [`scan`], leaving out the names in `excluded` (exact on-disk names).
///
/// Symlinks are listed but not followed for the listing itself, so a
/// dangling link still shows up by name.
pub fn scan_excluding(folder: &Path, excluded: &HashSet<String>) -> Option<Vec<FolderEntry>> {
    if !folder.is_dir() {
        warn!(folder = %folder.display(), "images folder does not exist");
        return None;
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) => {
                let name = entry.file_name().to_string_lossy().to_string();
                if excluded.contains(&name) {
                    continue;
                }
                let file_type = entry.file_type();
                let is_file = file_type.is_file()
                    || (file_type.is_symlink()
                        && fs::metadata(entry.path()).is_ok_and(|m| m.is_file()));
                entries.push(FolderEntry {
                    name,
                    path: entry.path().to_path_buf(),
                    is_file,
                });
            }
            Err(e) if e.depth() == 0 => {
                warn!(folder = %folder.display(), error = %e, "error accessing images folder");
                return None;
            }
            Err(e) => {
                warn!(folder = %folder.display(), error = %e, "skipping unreadable entry");
            }
        }
    }

    Some(entries)
}

/// Lower-cased names of everything currently in the folder
pub fn lowercase_names(entries: &[FolderEntry]) -> HashSet<String> {
    entries.iter().map(|e| e.name.to_lowercase()).collect()
}

/// Delete files whose name contains the reserved character.
///
/// Runs before the catalog is read and does not look at it.
pub fn purge_reserved_names(folder: &Path, reserved: char, dry_run: bool) -> DeletionReport {
    let Some(entries) = scan(folder) else {
        return DeletionReport::folder_missing();
    };

    let doomed = entries
        .into_iter()
        .filter(|e| e.is_file && e.name.contains(reserved));

    delete_all(doomed, dry_run)
}

/// Names the surviving catalog still needs, lower-cased, plus the fallback.
pub fn used_names(entries: &[CatalogEntry], fallback_image: &str) -> HashSet<String> {
    let mut used: HashSet<String> = entries
        .iter()
        .filter_map(entry_filename)
        .map(|name| name.to_lowercase())
        .collect();
    used.insert(fallback_image.to_lowercase());
    used
}

/// True when the name's extension is one of `extensions` (case-insensitive)
pub fn has_image_extension(name: &str, extensions: &[String]) -> bool {
    let Some(ext) = Path::new(name).extension() else {
        return false;
    };
    let ext = ext.to_string_lossy().to_lowercase();
    extensions.iter().any(|known| known.eq_ignore_ascii_case(&ext))
}

/// Delete image files no surviving entry refers to.
///
/// `entries` must be the final catalog. The fallback image is always kept.
/// Names in `gone` are treated as already deleted.
pub fn reap_unused(
    folder: &Path,
    entries: &[CatalogEntry],
    fallback_image: &str,
    extensions: &[String],
    gone: &HashSet<String>,
    dry_run: bool,
) -> DeletionReport {
    let Some(listing) = scan_excluding(folder, gone) else {
        return DeletionReport::folder_missing();
    };

    let used = used_names(entries, fallback_image);
    let doomed = listing.into_iter().filter(|e| {
        e.is_file && has_image_extension(&e.name, extensions) && !used.contains(&e.name.to_lowercase())
    });

    delete_all(doomed, dry_run)
}

/// Remove each file, recording failures instead of stopping
fn delete_all(doomed: impl Iterator<Item = FolderEntry>, dry_run: bool) -> DeletionReport {
    let mut report = DeletionReport::default();

    for entry in doomed {
        if dry_run {
            info!(file = %entry.name, "would delete");
            report.deleted.push(entry.name);
            continue;
        }

        match fs::remove_file(&entry.path) {
            Ok(()) => {
                info!(file = %entry.name, "deleted");
                report.deleted.push(entry.name);
            }
            Err(e) => {
                warn!(file = %entry.name, error = %e, "failed to delete");
                report.failed.push(FailedDeletion {
                    name: entry.name,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}
