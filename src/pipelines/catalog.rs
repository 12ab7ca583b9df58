use super::Failures;
use crate::config::CrawlConfig;
use crate::error::CraftError;
use crate::extractors::{CatalogParser, Page, PageParser};
use crate::fetchers::PageSource;
use crate::model::Item;
use log::debug;

/// Fetch and parse every item listing page, in page order
pub(crate) async fn collect(
    source: &dyn PageSource,
    config: &CrawlConfig,
    failures: &mut Failures,
) -> Result<Vec<Item>, CraftError> {
    let mut items = Vec::new();
    let paths = config.item_page_paths();
    let total = paths.len();

    for (index, path) in paths.into_iter().enumerate() {
        debug!("Parsing item listing {}/{}: {}", index + 1, total, path);
        match source.fetch(&path).await {
            Ok(content) => {
                let extraction = CatalogParser.parse(&Page::new(path.as_str(), content));
                items.extend(failures.absorb(&path, extraction)?);
            }
            Err(err) => failures.record(&path, err)?,
        }
    }

    Ok(items)
}
