pub mod catalog;
pub mod recipes;

use crate::config::CrawlConfig;
use crate::error::CraftError;
use crate::extractors::Extraction;
use crate::fetchers::PageSource;
use crate::images::ImageCache;
use crate::indexer;
use crate::model::{Catalog, Dataset};
use log::{info, warn};
use std::sync::Arc;

/// Result of a harvest run
#[derive(Debug)]
pub struct Harvest {
    pub dataset: Dataset,
    /// Pages that failed and were left out (always empty in strict mode)
    pub skipped: Vec<PageFailure>,
}

/// A page whose contribution was dropped, fully or after a partial parse
#[derive(Debug)]
pub struct PageFailure {
    pub page: String,
    pub error: CraftError,
}

/// Page-scoped failure policy shared by the pipeline stages
pub(crate) struct Failures {
    strict: bool,
    skipped: Vec<PageFailure>,
}

impl Failures {
    pub(crate) fn new(strict: bool) -> Self {
        Self {
            strict,
            skipped: Vec::new(),
        }
    }

    /// Skip the page, or fail the run when strict or when the error is structural
    pub(crate) fn record(&mut self, page: &str, error: CraftError) -> Result<(), CraftError> {
        if self.strict || error.is_structural() {
            return Err(error);
        }
        warn!("Skipping {}: {}", page, error);
        self.skipped.push(PageFailure {
            page: page.to_string(),
            error,
        });
        Ok(())
    }

    /// Keep the records of a page, recording its parse error if there was one
    pub(crate) fn absorb<T>(&mut self, page: &str, extraction: Extraction<T>) -> Result<Vec<T>, CraftError> {
        if let Some(err) = extraction.error {
            self.record(page, err.into())?;
        }
        Ok(extraction.records)
    }
}

/// Run the full harvest: items, icons, recipes, index
pub async fn run(source: Arc<dyn PageSource>, config: &CrawlConfig) -> Result<Harvest, CraftError> {
    let mut failures = Failures::new(config.strict);

    info!("Retrieving item list");
    let mut items = catalog::collect(source.as_ref(), config, &mut failures).await?;

    if config.images.enabled {
        info!("Downloading item images into {}", config.images.dir.display());
        ImageCache::new(&config.images.dir)
            .localize(source.as_ref(), &mut items)
            .await?;
    }
    let catalog = Catalog::from_items(items);
    if catalog.is_empty() {
        warn!("No items were parsed; every recipe reference will be unresolved");
    }

    info!("Retrieving recipe list");
    let recipes = recipes::collect(source, &catalog, config, &mut failures).await?;

    info!("Indexing dataset");
    let dataset = indexer::index(recipes, &catalog);

    Ok(Harvest {
        dataset,
        skipped: failures.skipped,
    })
}
