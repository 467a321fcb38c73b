/// Catalog passes: existence filter, top-N truncation, text sanitizer
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use super::filename::entry_filename;
use super::folder;
use crate::state::data::{
    CatalogEntry, MissingImageEntry, MissingImagesReport, SanitizeReport, TrimmedEntry,
    TruncateReport,
};

/// Drop entries whose image is not in the folder.
///
/// The folder is listed fresh, without the names in `gone`. If it cannot
/// be listed the catalog is left as it is (fail open).
pub fn filter_missing_images(
    entries: &mut Vec<CatalogEntry>,
    images_dir: &Path,
    gone: &HashSet<String>,
) -> MissingImagesReport {
    match folder::scan_excluding(images_dir, gone) {
        Some(listing) => MissingImagesReport {
            folder_missing: false,
            removed: retain_present(entries, &folder::lowercase_names(&listing)),
        },
        None => MissingImagesReport {
            folder_missing: true,
            removed: Vec::new(),
        },
    }
}

/// Keep entries whose resolved filename is in `present` (lower-cased names).
///
/// Entries without a resolvable filename are always kept.
pub fn retain_present(
    entries: &mut Vec<CatalogEntry>,
    present: &HashSet<String>,
) -> Vec<MissingImageEntry> {
    let mut removed = Vec::new();

    entries.retain(|entry| match entry_filename(entry) {
        Some(name) if !present.contains(&name.to_lowercase()) => {
            debug!(image = %name, "image missing, dropping entry");
            removed.push(MissingImageEntry {
                title: entry.display_title(),
                image: name,
            });
            false
        }
        _ => true,
    });

    removed
}

/// Keep only the first `limit` entries.
pub fn truncate(entries: &mut Vec<CatalogEntry>, limit: usize) -> TruncateReport {
    if entries.len() <= limit {
        return TruncateReport {
            limit,
            removed: Vec::new(),
        };
    }

    let removed = entries
        .split_off(limit)
        .iter()
        .enumerate()
        .map(|(offset, entry)| TrimmedEntry {
            position: limit + offset + 1,
            title: entry.display_title(),
            image: entry.display_image(),
        })
        .collect();

    TruncateReport { limit, removed }
}

/// Strip `forbidden` from the given text fields of every entry.
///
/// Counts changed (entry, field) pairs, not removed characters. Fields that
/// are absent or not strings are left alone.
pub fn sanitize(entries: &mut [CatalogEntry], fields: &[String], forbidden: char) -> SanitizeReport {
    let mut changed_fields = 0;

    for entry in entries.iter_mut() {
        for field in fields {
            if let Some(Value::String(text)) = entry.get_mut(field) {
                if text.contains(forbidden) {
                    text.retain(|c| c != forbidden);
                    changed_fields += 1;
                }
            }
        }
    }

    SanitizeReport { changed_fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn entries(value: Value) -> Vec<CatalogEntry> {
        serde_json::from_value(value).unwrap()
    }

    fn numbered(count: usize) -> Vec<CatalogEntry> {
        (1..=count)
            .map(|i| serde_json::from_value(json!({ "title": format!("#{i}"), "image": format!("http://x/{i}.png") })).unwrap())
            .collect()
    }

    fn fields() -> Vec<String> {
        vec!["title".to_string(), "description".to_string()]
    }

    #[test]
    fn test_case_insensitive_match() {
        let present: HashSet<String> = ["foo.png".to_string()].into();
        let mut catalog = entries(json!([
            { "title": "kept", "image": "http://x/Foo.PNG" },
            { "title": "gone", "image": "http://x/bar.png" },
        ]));

        let removed = retain_present(&mut catalog, &present);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].title(), Some("kept"));
        assert_eq!(
            removed,
            [MissingImageEntry { title: "gone".to_string(), image: "bar.png".to_string() }]
        );
    }

    #[test]
    fn test_entries_without_filename_are_kept() {
        let mut catalog = entries(json!([
            { "title": "no image key" },
            { "title": "empty path", "image": "http://x/" },
            { "title": "not text", "image": 7 },
            { "image": "http://x/missing.png" },
        ]));

        let removed = retain_present(&mut catalog, &HashSet::new());
        assert_eq!(catalog.len(), 3);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].title, "No title");
        assert_eq!(removed[0].image, "missing.png");
    }

    #[test]
    fn test_filter_reads_folder() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A.png"), b"img").unwrap();
        let mut catalog = entries(json!([
            { "title": "A", "image": "http://x/a.png" },
            { "title": "B", "image": "http://x/b.png" },
        ]));

        let report = filter_missing_images(&mut catalog, dir.path(), &HashSet::new());
        assert!(!report.folder_missing);
        assert_eq!(report.removed.len(), 1);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_filter_treats_gone_names_as_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a%20b.png"), b"img").unwrap();
        fs::write(dir.path().join("ok.png"), b"img").unwrap();
        let mut catalog = entries(json!([
            { "title": "pct", "image": "http://x/a%20b.png" },
            { "title": "ok", "image": "http://x/ok.png" },
        ]));
        let gone: HashSet<String> = ["a%20b.png".to_string()].into();

        let report = filter_missing_images(&mut catalog, dir.path(), &gone);
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.removed[0].image, "a%20b.png");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].title(), Some("ok"));
    }

    #[test]
    fn test_filter_fails_open_without_folder() {
        let dir = TempDir::new().unwrap();
        let mut catalog = numbered(3);
        let before = catalog.clone();

        let report = filter_missing_images(&mut catalog, &dir.path().join("images"), &HashSet::new());
        assert!(report.folder_missing);
        assert!(report.removed.is_empty());
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_truncate_within_limit() {
        let mut catalog = numbered(30);
        let report = truncate(&mut catalog, 30);
        assert_eq!(catalog.len(), 30);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_truncate_over_limit() {
        let mut catalog = numbered(34);
        let expected: Vec<CatalogEntry> = catalog[..30].to_vec();

        let report = truncate(&mut catalog, 30);
        assert_eq!(catalog, expected);
        let positions: Vec<usize> = report.removed.iter().map(|r| r.position).collect();
        assert_eq!(positions, [31, 32, 33, 34]);
        assert_eq!(report.removed[0].title, "#31");
        assert_eq!(report.removed[3].image, "http://x/34.png");
    }

    #[test]
    fn test_truncate_reports_placeholders() {
        let mut catalog = entries(json!([{ "title": "a" }, { "description": "b" }]));
        let report = truncate(&mut catalog, 1);
        assert_eq!(
            report.removed,
            [TrimmedEntry { position: 2, title: "No title".to_string(), image: "No image".to_string() }]
        );
    }

    #[test]
    fn test_sanitize_scope_and_count() {
        let mut catalog = entries(json!([
            { "title": "**A*", "description": "plain", "image": "http://x/a*.png", "tag": "*" },
            { "title": "B", "description": "d*e*s*c" },
            { "title": 5, "description": null },
        ]));

        let report = sanitize(&mut catalog, &fields(), '*');
        assert_eq!(report.changed_fields, 2);
        assert_eq!(catalog[0].title(), Some("A"));
        assert_eq!(catalog[0].get("image"), Some(&json!("http://x/a*.png")));
        assert_eq!(catalog[0].get("tag"), Some(&json!("*")));
        assert_eq!(catalog[1].get("description"), Some(&json!("desc")));
        assert_eq!(catalog[2].get("title"), Some(&json!(5)));

        assert_eq!(sanitize(&mut catalog, &fields(), '*').changed_fields, 0);
    }
}
