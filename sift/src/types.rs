//! Records exchanged with article sources and search callers.

use serde::{Deserialize, Serialize};

/// Coarse article classification used for result filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleType {
    Person,
    Place,
    Org,
    Work,
    Event,
    Other,
}

impl Default for ArticleType {
    fn default() -> Self {
        ArticleType::Other
    }
}

/// One indexable article, as produced by the parser or any equivalent
/// source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    /// Short summary, typically the intro paragraph.
    pub description: String,
    /// Full plain text.
    pub content: String,
    #[serde(rename = "type", default)]
    pub article_type: ArticleType,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub doc_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub article_type: ArticleType,
    pub score: f64,
    pub matched_terms: Vec<String>,
}

/// Aggregate index statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub document_count: usize,
    pub vocabulary_size: usize,
    pub avg_doc_length: f64,
    pub total_postings: usize,
}
