// WasteWise - Core Library
// Exposes the catalogue, query engine and advice resolver for the CLI, TUI and web server

pub mod catalogue;  // Catalogue Loader - items.json from file or HTTP
pub mod query;      // Query Engine - search, category filter, curated subsets
pub mod advice;     // Disposal Advice - verdict rules per category
pub mod render;     // Presentation - HTML pages and labels
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use catalogue::{
    Catalogue, CatalogueSource, Category, Item, LoadError, NotFound,
    parse_item_id,
};
pub use query::{
    CategoryCounts, CategoryKey,
    query, category_counts, confusing_items, default_items,
    DEFAULT_NAMES, CONFUSING_NAMES,
};
pub use advice::{
    Advice, AdviceBook, AdviceError, CategoryAdvice, NameMatch, VerdictRule,
    resolve,
};
pub use config::CatalogueArgs;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
