/// Shared data structures for the sweep
///
/// These structs represent the catalog as it is read from disk and the
/// records produced by each step for the report.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder shown in reports for entries without a title
pub const NO_TITLE: &str = "No title";

/// Placeholder shown in reports for entries without an image
pub const NO_IMAGE: &str = "No image";

/// A single catalog entry
///
/// Entries are open records: every key read from disk is kept in its
/// original order and written back unchanged. Only `title`, `description`
/// and `image` carry meaning for the sweep.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct CatalogEntry {
    fields: Map<String, Value>,
}

impl CatalogEntry {
    /// The entry's title, or `None` when absent or not text
    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    /// Title for reports, falling back to a placeholder
    pub fn display_title(&self) -> String {
        self.title().unwrap_or(NO_TITLE).to_string()
    }

    /// Raw `image` value, whatever its JSON type
    pub fn image(&self) -> Option<&Value> {
        self.get("image")
    }

    /// Image value for reports, falling back to a placeholder
    pub fn display_image(&self) -> String {
        match self.image() {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => NO_IMAGE.to_string(),
        }
    }

    /// Look up any field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Mutable access to a field, used by the sanitizer
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }
}

/// An entry dropped because its image is not in the folder
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MissingImageEntry {
    pub title: String,
    /// Filename resolved from the entry's image URL
    pub image: String,
}

/// An entry dropped by the top-N truncation
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TrimmedEntry {
    /// 1-based position in the filtered catalog
    pub position: usize,
    pub title: String,
    pub image: String,
}

/// A file that could not be deleted
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FailedDeletion {
    pub name: String,
    pub error: String,
}

/// Outcome of a pass that deletes files from the image folder
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct DeletionReport {
    /// The folder did not exist (or could not be listed); nothing was done
    pub folder_missing: bool,
    /// Deleted names, in their on-disk casing
    pub deleted: Vec<String>,
    pub failed: Vec<FailedDeletion>,
}

impl DeletionReport {
    pub fn folder_missing() -> Self {
        Self {
            folder_missing: true,
            ..Self::default()
        }
    }
}

/// Outcome of the image-existence filter
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct MissingImagesReport {
    /// The folder could not be listed, so every entry was kept
    pub folder_missing: bool,
    pub removed: Vec<MissingImageEntry>,
}

/// Outcome of the top-N truncation
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TruncateReport {
    pub limit: usize,
    pub removed: Vec<TrimmedEntry>,
}

/// Outcome of the text sanitizer
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct SanitizeReport {
    /// Number of (entry, field) pairs whose value changed
    pub changed_fields: usize,
}
