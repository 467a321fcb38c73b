/// State module
///
/// This module holds everything the sweep reads and writes:
/// - Catalog loading and saving (catalog.rs)
/// - Shared data structures (data.rs)
/// - Configuration defaults and the config file (config.rs)

pub mod catalog;
pub mod config;
pub mod data;
