use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CrawlConfig;
use crate::fetchers::{PageSource, RequestFetcher};
use crate::pipelines::{self, Harvest};
use crate::CraftError;

/// Builder for configuring and running a harvest
#[derive(Default)]
pub struct CraftDbBuilder {
    config: Option<CrawlConfig>,
    source: Option<Arc<dyn PageSource>>,
    base_url: Option<String>,
    concurrency: Option<usize>,
    timeout: Option<Duration>,
    strict: Option<bool>,
    images: Option<bool>,
    image_dir: Option<PathBuf>,
}

impl CraftDbBuilder {
    /// Start from a loaded configuration instead of the defaults
    ///
    /// Individual setters called on the builder take precedence over it.
    pub fn config(mut self, config: CrawlConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom page source instead of fetching over HTTP
    ///
    /// # Example
    /// ```no_run
    /// use craftdb::{CraftDb, RequestFetcher};
    /// use std::sync::Arc;
    ///
    /// let fetcher = RequestFetcher::new("https://terraria.wiki.gg", None).unwrap();
    /// let builder = CraftDb::builder().source(Arc::new(fetcher));
    /// ```
    pub fn source(mut self, source: Arc<dyn PageSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the wiki origin pages are fetched from
    ///
    /// # Example
    /// ```
    /// use craftdb::CraftDb;
    ///
    /// let builder = CraftDb::builder().base_url("https://terraria.wiki.gg");
    /// ```
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set how many recipe sub-pages may be fetched at once
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = Some(workers);
        self
    }

    /// Set a timeout for HTTP requests
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Abort on the first failing page instead of skipping it
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Enable or disable item icon downloads
    pub fn images(mut self, enabled: bool) -> Self {
        self.images = Some(enabled);
        self
    }

    /// Set the item icon cache directory
    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    /// Build and execute the harvest
    ///
    /// # Errors
    /// Returns `CraftError` if:
    /// - The configuration is invalid (e.g. zero concurrency)
    /// - The recipes overview cannot be fetched or parsed
    /// - The overview's table of contents and section links disagree
    /// - Any page fails while strict mode is on
    ///
    /// # Example
    /// ```no_run
    /// # use craftdb::CraftDb;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let harvest = CraftDb::builder()
    ///     .base_url("https://terraria.wiki.gg")
    ///     .images(false)
    ///     .build()
    ///     .await?;
    /// println!("{} recipes", harvest.dataset.recipes.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<Harvest, CraftError> {
        let mut config = self.config.unwrap_or_default();
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout.as_secs();
        }
        if let Some(strict) = self.strict {
            config.strict = strict;
        }
        if let Some(enabled) = self.images {
            config.images.enabled = enabled;
        }
        if let Some(dir) = self.image_dir {
            config.images.dir = dir;
        }

        if config.concurrency == 0 {
            return Err(CraftError::Builder("Concurrency must be at least 1".to_string()));
        }

        let source = match self.source {
            Some(source) => source,
            None => {
                let timeout = self.timeout.unwrap_or_else(|| config.timeout());
                Arc::new(RequestFetcher::new(&config.base_url, Some(timeout))?)
            }
        };

        pipelines::run(source, &config).await
    }
}

/// Main entry point for the builder API
pub struct CraftDb;

impl CraftDb {
    /// Creates a new builder for harvesting a dataset
    ///
    /// # Example
    /// ```
    /// use craftdb::CraftDb;
    ///
    /// let builder = CraftDb::builder();
    /// ```
    pub fn builder() -> CraftDbBuilder {
        CraftDbBuilder::default()
    }
}
