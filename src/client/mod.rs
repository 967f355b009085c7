pub mod radio_directory;
pub mod types;

use crate::Result;
use async_trait::async_trait;

pub use radio_directory::RadioDirectoryClient;
pub use types::{Item, ResultGroup, UpstreamSearchResponse};

/// One round trip against the directory's search API
#[async_trait]
pub trait RadioSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<UpstreamSearchResponse>;
}
