use crate::Result;
use async_trait::async_trait;
use futures::Stream;
use sift::ArticleRecord;
use std::pin::Pin;

/// A streaming source of indexable articles.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Estimated total article count, for progress reporting.
    async fn count_documents(&self) -> Result<u64>;

    /// Stream articles one at a time; the consumer pulls.
    fn stream_articles(&self) -> Pin<Box<dyn Stream<Item = Result<ArticleRecord>> + Send + '_>>;

    /// Human-readable source name.
    fn source_name(&self) -> &str;
}
