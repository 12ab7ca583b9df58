//! Harvests craftable items and their recipes from game wiki markup into a
//! cross-referenced dataset.
//!
//! The wiki's tables have no stable grammar, so the extractors walk each page
//! line by line with a small lookahead cursor, and the indexer then numbers
//! the recipes and links every item to the recipes that produce or consume it.

pub mod builder;
pub mod config;
pub mod cursor;
pub mod error;
pub mod export;
pub mod extractors;
pub mod fetchers;
pub mod images;
pub mod indexer;
pub mod model;
pub mod pipelines;

// Re-export main types
pub use builder::{CraftDb, CraftDbBuilder};
pub use config::{load_config, CrawlConfig};
pub use error::{CraftError, ParseError};
pub use export::OutputFormat;
pub use fetchers::{PageSource, RequestFetcher};
pub use model::{Catalog, Dataset, Ingredient, Item, ItemId, Recipe, RecipeId, Workstation, NO_ITEM};
pub use pipelines::{Harvest, PageFailure};

/// Harvest a dataset over HTTP using the given configuration
///
/// # Example
/// ```no_run
/// # use craftdb::{harvest, CrawlConfig};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let result = harvest(CrawlConfig::load()?).await?;
/// println!("{} items", result.dataset.items.len());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: CrawlConfig) -> Result<Harvest, CraftError> {
    CraftDb::builder().config(config).build().await
}
