//! Local cache of item icons.

use crate::error::CraftError;
use crate::fetchers::PageSource;
use crate::model::Item;
use log::{debug, warn};
use std::path::{Path, PathBuf};

pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Local file an image URL is cached under: its base name without the query
    pub fn local_path(&self, image: &str) -> Option<PathBuf> {
        let without_query = image.split(['?', '#']).next().unwrap_or(image);
        let name = without_query.rsplit('/').next().filter(|name| !name.is_empty())?;
        Some(self.dir.join(name))
    }

    /// Download missing icons and point every item at its local copy
    ///
    /// A failed download is logged and leaves the item's remote reference as is.
    pub async fn localize(&self, source: &dyn PageSource, items: &mut [Item]) -> Result<(), CraftError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let total = items.len();
        for (index, item) in items.iter_mut().enumerate() {
            let Some(path) = self.local_path(&item.image) else {
                warn!("Item '{}' has no usable image reference '{}'", item.name, item.image);
                continue;
            };

            if exists(&path).await {
                debug!("Skipping cached image {}/{} for '{}'", index + 1, total, item.name);
            } else {
                debug!("Downloading image {}/{} for '{}'", index + 1, total, item.name);
                match source.fetch_bytes(&item.image).await {
                    Ok(bytes) => tokio::fs::write(&path, bytes).await?,
                    Err(err) => {
                        warn!("Failed to download image for '{}': {}", item.name, err);
                        continue;
                    }
                }
            }
            item.image = path.to_string_lossy().into_owned();
        }
        Ok(())
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
