//! Version-1 JSON persistence for the index.
//!
//! The on-disk shape is stable and sorted so equal indexes serialise to
//! equal bytes. Deserialisation rejects unknown versions and
//! inconsistent counts with `MalformedInput`.

use super::{CorpusStats, DocumentStats, FtsIndex, Posting};
use crate::config::IndexConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    index: Vec<(String, Vec<Posting>)>,
    #[serde(rename = "docStats")]
    doc_stats: Vec<DocumentStats>,
    #[serde(rename = "corpusStats")]
    corpus_stats: CorpusStatsFile,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CorpusStatsFile {
    document_count: usize,
    avg_doc_length: f64,
    document_frequency: Vec<(String, usize)>,
}

impl FtsIndex {
    /// Serialise to the version-1 JSON shape.
    pub fn to_json(&self) -> Result<String> {
        let (index, doc_stats, corpus) = self.parts();

        let mut terms: Vec<(String, Vec<Posting>)> = index
            .iter()
            .map(|(term, postings)| (term.clone(), postings.clone()))
            .collect();
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let mut stats: Vec<DocumentStats> = doc_stats.values().cloned().collect();
        stats.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));

        let mut frequencies: Vec<(String, usize)> = corpus
            .document_frequency
            .iter()
            .map(|(term, count)| (term.clone(), *count))
            .collect();
        frequencies.sort_by(|a, b| a.0.cmp(&b.0));

        let file = IndexFile {
            version: FORMAT_VERSION,
            index: terms,
            doc_stats: stats,
            corpus_stats: CorpusStatsFile {
                document_count: corpus.document_count,
                avg_doc_length: corpus.avg_doc_length,
                document_frequency: frequencies,
            },
        };
        Ok(serde_json::to_string(&file)?)
    }

    /// Rebuild an index from its JSON form, using `config` for scoring.
    pub fn from_json(raw: &str, config: IndexConfig) -> Result<FtsIndex> {
        config.validate()?;
        let file: IndexFile =
            serde_json::from_str(raw).map_err(|e| Error::MalformedInput(e.to_string()))?;
        if file.version != FORMAT_VERSION {
            return Err(Error::MalformedInput(format!(
                "unsupported index version {}, expected {}",
                file.version, FORMAT_VERSION
            )));
        }
        if file.corpus_stats.document_count != file.doc_stats.len() {
            return Err(Error::MalformedInput(format!(
                "documentCount {} does not match {} docStats entries",
                file.corpus_stats.document_count,
                file.doc_stats.len()
            )));
        }

        let index: HashMap<String, Vec<Posting>> = file.index.into_iter().collect();
        let doc_stats: HashMap<String, DocumentStats> = file
            .doc_stats
            .into_iter()
            .map(|stats| (stats.doc_id.clone(), stats))
            .collect();
        let corpus = CorpusStats {
            document_count: file.corpus_stats.document_count,
            avg_doc_length: file.corpus_stats.avg_doc_length,
            document_frequency: file.corpus_stats.document_frequency.into_iter().collect(),
        };

        Ok(FtsIndex::from_parts(index, doc_stats, corpus, config))
    }

    /// Write the serialised index to a file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read an index back from a file written by [`FtsIndex::write_to`].
    pub fn read_from(path: &Path, config: IndexConfig) -> Result<FtsIndex> {
        let raw = std::fs::read_to_string(path)?;
        FtsIndex::from_json(&raw, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchOptions;
    use crate::types::{ArticleRecord, ArticleType};

    fn sample_index() -> FtsIndex {
        let mut index = FtsIndex::default();
        index.add(ArticleRecord {
            id: "d1".into(),
            title: "cat".into(),
            description: "small animal".into(),
            content: "cats are pets".into(),
            article_type: ArticleType::Other,
        });
        index.add(ArticleRecord {
            id: "d2".into(),
            title: "dog".into(),
            description: "loyal animal".into(),
            content: "dogs are pets".into(),
            article_type: ArticleType::Other,
        });
        index
    }

    #[test]
    fn test_round_trip_preserves_search_and_stats() {
        let index = sample_index();
        let json = index.to_json().unwrap();
        let restored = FtsIndex::from_json(&json, IndexConfig::default()).unwrap();

        assert_eq!(index.stats(), restored.stats());
        for query in ["cat", "animal", "cat pets", "missing"] {
            assert_eq!(
                index.search(query, &SearchOptions::default()).unwrap(),
                restored.search(query, &SearchOptions::default()).unwrap(),
                "query {:?} differs after round trip",
                query
            );
        }
        assert_eq!(
            index.document_frequency("animal"),
            restored.document_frequency("animal")
        );
    }

    #[test]
    fn test_serialisation_is_deterministic() {
        let index = sample_index();
        assert_eq!(index.to_json().unwrap(), index.to_json().unwrap());
    }

    #[test]
    fn test_shape_has_expected_keys() {
        let json = sample_index().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["index"].is_array());
        assert!(value["docStats"].is_array());
        assert!(value["corpusStats"]["documentFrequency"].is_array());
        let stats = &value["docStats"][0];
        assert!(stats["docId"].is_string());
        assert!(stats["fieldLengths"].is_array());
        assert!(stats["totalLength"].is_number());
        assert!(stats["type"].is_string());
    }

    #[test]
    fn test_wrong_version_rejected() {
        let json = sample_index().to_json().unwrap().replace(
            "\"version\":1",
            "\"version\":2",
        );
        let err = FtsIndex::from_json(&json, IndexConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_garbage_rejected() {
        let err = FtsIndex::from_json("not json", IndexConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_restored_index_is_mutable() {
        let json = sample_index().to_json().unwrap();
        let mut restored = FtsIndex::from_json(&json, IndexConfig::default()).unwrap();
        assert!(restored.remove("d1"));
        assert_eq!(restored.stats().document_count, 1);
        restored.add(ArticleRecord {
            id: "d3".into(),
            title: "bird".into(),
            description: String::new(),
            content: "birds sing".into(),
            article_type: ArticleType::Other,
        });
        assert_eq!(restored.stats().document_count, 2);
        assert_eq!(restored.document_frequency("bird"), 1);
    }
}
