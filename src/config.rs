use crate::export::OutputFormat;
use crate::extractors::UnresolvedPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main harvest configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CrawlConfig {
    /// Wiki origin every page path is joined to
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Number of item listing pages
    #[serde(default = "default_item_pages")]
    pub item_pages: u32,
    /// Listing page path; `{page}` is replaced by the 1-based page number
    #[serde(default = "default_item_page_path")]
    pub item_page_path: String,
    /// Path of the recipes overview page
    #[serde(default = "default_recipes_path")]
    pub recipes_path: String,
    /// Maximum number of recipe sub-pages fetched at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Abort on the first page that fails instead of skipping it
    #[serde(default)]
    pub strict: bool,
    /// Handling of recipe names missing from the item listing
    #[serde(default)]
    pub unresolved_items: UnresolvedPolicy,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Item icon download settings
#[derive(Debug, Deserialize, Clone)]
pub struct ImagesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Local cache directory; icons already present are not downloaded again
    #[serde(default = "default_image_dir")]
    pub dir: PathBuf,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_image_dir(),
        }
    }
}

/// Dataset export settings
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: OutputFormat::default(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://terraria.gamepedia.com".to_string()
}

fn default_item_pages() -> u32 {
    13
}

fn default_item_page_path() -> String {
    "/Item_IDs_Part{page}".to_string()
}

fn default_recipes_path() -> String {
    "/Recipes".to_string()
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("img")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data.json")
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            item_pages: default_item_pages(),
            item_page_path: default_item_page_path(),
            recipes_path: default_recipes_path(),
            concurrency: default_concurrency(),
            timeout: default_timeout(),
            strict: false,
            unresolved_items: UnresolvedPolicy::default(),
            images: ImagesConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl CrawlConfig {
    /// Load configuration from `craftdb.toml` and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        load_config(None)
    }

    /// Paths of all item listing pages, in order
    pub fn item_page_paths(&self) -> Vec<String> {
        (1..=self.item_pages)
            .map(|page| self.item_page_path.replace("{page}", &page.to_string()))
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Load configuration from file and environment variables
///
/// Configuration is loaded with the following priority (highest to lowest):
/// 1. Environment variables with CRAFTDB__ prefix
/// 2. The given file, or craftdb.toml in the current directory
/// 3. Default values
///
/// Environment variable format: CRAFTDB__IMAGES__DIR
pub fn load_config(path: Option<&Path>) -> Result<CrawlConfig, ConfigError> {
    let file = match path {
        // An explicitly requested file must exist
        Some(path) => File::from(path).required(true),
        None => File::with_name("craftdb").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        // Use double underscore for nested: CRAFTDB__OUTPUT__FORMAT
        .add_source(
            Environment::with_prefix("CRAFTDB")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
