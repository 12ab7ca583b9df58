use super::Failures;
use crate::config::CrawlConfig;
use crate::error::CraftError;
use crate::extractors::{parse_directory, Page, PageParser, RecipeTableParser};
use crate::fetchers::PageSource;
use crate::model::{Catalog, Recipe};
use log::debug;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Fetch the workstation directory and every recipe sub-page it links to
///
/// Sub-pages are fetched concurrently (at most `config.concurrency` at a time)
/// but parsed in directory order, so recipe order does not depend on which
/// fetch finishes first. Any failure on the directory page itself is fatal.
pub(crate) async fn collect(
    source: Arc<dyn PageSource>,
    catalog: &Catalog,
    config: &CrawlConfig,
    failures: &mut Failures,
) -> Result<Vec<Recipe>, CraftError> {
    debug!("Parsing workstation listing {}", config.recipes_path);
    let overview = source.fetch(&config.recipes_path).await?;
    let entries = parse_directory(&Page::new(config.recipes_path.as_str(), overview), catalog)?;

    let permits = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let handles: Vec<JoinHandle<Result<String, CraftError>>> = entries
        .iter()
        .map(|entry| {
            let source = Arc::clone(&source);
            let permits = Arc::clone(&permits);
            let path = entry.path.clone();
            tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| CraftError::TaskFailed(e.to_string()))?;
                source.fetch(&path).await
            })
        })
        .collect();
    let mut fetches = InFlight(handles);

    let mut recipes = Vec::new();
    for (entry, fetch) in entries.into_iter().zip(fetches.0.iter_mut()) {
        let fetched = fetch.await.map_err(|e| CraftError::TaskFailed(e.to_string()))?;
        match fetched {
            Ok(content) => {
                debug!("Parsing workstation recipes {}", entry.path);
                let parser = RecipeTableParser::new(catalog, entry.workstations)
                    .with_policy(config.unresolved_items);
                let extraction = parser.parse(&Page::new(entry.path.as_str(), content));
                recipes.extend(failures.absorb(&entry.path, extraction)?);
            }
            Err(err) => failures.record(&entry.path, err)?,
        }
    }

    Ok(recipes)
}

/// Sub-page fetches in directory order, aborted when dropped
///
/// A strict-mode early return drops this and cancels the fetches that have
/// not been awaited yet.
struct InFlight(Vec<JoinHandle<Result<String, CraftError>>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        for fetch in &self.0 {
            fetch.abort();
        }
    }
}
