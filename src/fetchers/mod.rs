mod request;

pub use request::RequestFetcher;

use crate::error::CraftError;
use async_trait::async_trait;

/// Where wiki pages and image assets come from
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch a page's markup; `path` is relative to the wiki root or absolute
    async fn fetch(&self, path: &str) -> Result<String, CraftError>;

    /// Fetch a binary asset such as an item icon
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, CraftError>;
}
