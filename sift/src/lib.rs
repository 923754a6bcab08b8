//! sift: in-memory weighted-field full-text index with BM25 scoring.
//!
//! Articles carry three indexed fields (title, description, content)
//! with configurable weights. Terms are stemmed and stopword-filtered
//! at indexing time; queries keep stopwords. Scores are Okapi BM25 over
//! weighted document lengths, with cross-field term frequencies summed
//! and the maximum matched field weight applied.
//!
//! ```
//! use sift::{ArticleRecord, ArticleType, FtsIndex, SearchOptions};
//!
//! let mut index = FtsIndex::default();
//! index.add(ArticleRecord {
//!     id: "1".into(),
//!     title: "Toronto".into(),
//!     description: "city in Canada".into(),
//!     content: "Toronto is the capital of Ontario.".into(),
//!     article_type: ArticleType::Place,
//! });
//! let hits = index.search("toronto", &SearchOptions::default()).unwrap();
//! assert_eq!(hits[0].doc_id, "1");
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod scoring;
pub mod tokenizer;
pub mod types;

pub use config::{Bm25Config, FieldWeights, IndexConfig, SearchOptions};
pub use error::{Error, Result};
pub use index::{BuildOptions, DocumentStats, Field, FtsIndex, Posting};
pub use types::{ArticleRecord, ArticleType, IndexStats, SearchResult};
