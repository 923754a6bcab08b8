//! sift-importer: stream articles from a Wikipedia dump into the index.
//!
//! A [`sources::ArticleSource`] yields [`sift::ArticleRecord`]s one at
//! a time; [`import_into`] drives the index's `build_from` with
//! progress reporting, skipping pages the parser rejects.

pub mod classify;
pub mod error;
pub mod progress;
pub mod sources;

pub use classify::classify;
pub use error::{ImportError, Result};
pub use progress::ImportProgress;
pub use sources::{ArticleSource, WikipediaDump};

use futures::StreamExt;
use sift::{BuildOptions, FtsIndex};

/// Outcome of one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: u64,
}

/// Clear `index` and rebuild it from every article `source` yields.
/// Source errors are logged and counted, not fatal.
pub async fn import_into(index: &mut FtsIndex, source: &dyn ArticleSource) -> Result<ImportSummary> {
    let total = source.count_documents().await.unwrap_or(0);
    tracing::info!(source = source.source_name(), estimated = total, "starting import");
    let progress = ImportProgress::new(total);

    let progress_ref = &progress;
    let articles = source.stream_articles().filter_map(|result| async move {
        match result {
            Ok(article) => {
                progress_ref.inc_imported(1);
                Some(article)
            }
            Err(e) => {
                tracing::warn!("skipping unreadable record: {}", e);
                progress_ref.inc_failed(1);
                None
            }
        }
    });

    let imported = index.build_from(articles, BuildOptions::default()).await?;
    progress.finish();
    tracing::info!(imported, failed = progress.failed(), "import finished");

    Ok(ImportSummary {
        imported,
        failed: progress.failed(),
    })
}
