/// Catalog and image folder cleanup
///
/// This module handles:
/// - Resolving the filename an entry's image URL points to
/// - Listing the image folder and deleting files from it
/// - Filtering, truncating and sanitizing the catalog
/// - Running the steps in order and collecting the report

pub mod filename;
pub mod filter;
pub mod folder;
pub mod pipeline;

pub use pipeline::Pipeline;
