use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::Path;
use tracing::{debug, info};

use super::data::CatalogEntry;
use crate::error::{Result, SweepError};

/// Load and parse the catalog file.
///
/// The whole run depends on this: an absent file or a document that is not
/// an array of objects is an error, never a partial catalog.
pub fn load(path: &Path) -> Result<Vec<CatalogEntry>> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => SweepError::CatalogNotFound {
            path: path.to_path_buf(),
        },
        _ => SweepError::CatalogRead {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let entries: Vec<CatalogEntry> =
        serde_json::from_str(&text).map_err(|source| SweepError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), entries = entries.len(), "catalog loaded");
    Ok(entries)
}

/// Persist the catalog.
///
/// Output is pretty-printed with two-space indentation and non-ASCII text
/// written literally. The new content goes to a temp file that replaces the
/// catalog on commit, so a failed write leaves the previous file intact.
pub fn save(path: &Path, entries: &[CatalogEntry]) -> Result<()> {
    let save_err = |source: io::Error| SweepError::CatalogSave {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(entries).map_err(|e| save_err(e.into()))?;

    let mut file = AtomicWriteFile::options().open(path).map_err(save_err)?;
    file.write_all(json.as_bytes()).map_err(save_err)?;
    file.commit().map_err(save_err)?;

    info!(path = %path.display(), entries = entries.len(), "catalog saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("content.json")).unwrap_err();
        assert!(matches!(err, SweepError::CatalogNotFound { .. }));
        assert!(err.is_load_failure());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content.json");
        fs::write(&path, "[{\"title\": ").unwrap();
        assert!(matches!(load(&path), Err(SweepError::CatalogParse { .. })));

        fs::write(&path, "{\"title\": \"not an array\"}").unwrap();
        assert!(matches!(load(&path), Err(SweepError::CatalogParse { .. })));
    }

    #[test]
    fn test_save_is_pretty_and_keeps_unicode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content.json");
        fs::write(&path, r#"[{"title":"Café ☕","image":"http://x/a.png","n":1}]"#).unwrap();

        let entries = load(&path).unwrap();
        save(&path, &entries).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "[\n  {\n    \"title\": \"Café ☕\",\n    \"image\": \"http://x/a.png\",\n    \"n\": 1\n  }\n]"
        );
        assert_eq!(load(&path).unwrap(), entries);
    }

    #[test]
    fn test_numbers_are_written_back_exactly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content.json");
        fs::write(
            &path,
            r#"[{"title":"a","id":123456789012345678901234567890,"ratio":0.10000000000000000001,"n":-7}]"#,
        )
        .unwrap();

        let entries = load(&path).unwrap();
        save(&path, &entries).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"id\": 123456789012345678901234567890,"));
        assert!(written.contains("\"ratio\": 0.10000000000000000001,"));
        assert!(written.contains("\"n\": -7"));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("content.json");
        let err = save(&path, &[]).unwrap_err();
        assert!(matches!(err, SweepError::CatalogSave { .. }));
        assert!(!err.is_load_failure());
    }
}
