//! The weighted-field inverted index.
//!
//! State is three structures updated together per operation: the term →
//! postings map, per-document stats, and corpus stats. A term occurring
//! in K fields of one document holds K postings but counts once in that
//! term's document frequency.

mod serialize;

pub use serialize::FORMAT_VERSION;

use crate::config::{IndexConfig, SearchOptions};
use crate::error::{Error, Result};
use crate::scoring;
use crate::tokenizer::{self, Token};
use crate::types::{ArticleRecord, ArticleType, IndexStats, SearchResult};
use futures::{pin_mut, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Indexed fields, in weight order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Description,
    Content,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Title, Field::Description, Field::Content];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Content => "content",
        }
    }
}

/// One (term, document, field) entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    pub doc_id: String,
    pub field: Field,
    pub weight: f64,
    pub frequency: u32,
    pub positions: Vec<u32>,
}

/// Per-document bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub doc_id: String,
    pub field_lengths: Vec<(Field, usize)>,
    /// Weighted length: Σ field tokens × field weight.
    pub total_length: f64,
    pub title: String,
    #[serde(rename = "type")]
    pub article_type: ArticleType,
}

impl DocumentStats {
    pub fn field_length(&self, field: Field) -> usize {
        self.field_lengths
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, len)| *len)
            .unwrap_or(0)
    }
}

/// Corpus-wide bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusStats {
    pub document_count: usize,
    pub avg_doc_length: f64,
    pub document_frequency: HashMap<String, usize>,
}

/// Options for [`FtsIndex::build_from`].
#[derive(Default)]
pub struct BuildOptions {
    /// Overrides the configured progress cadence.
    pub progress_every: Option<usize>,
    /// Invoked on the index's task every `progress_every` documents.
    pub on_progress: Option<Box<dyn FnMut(usize) + Send>>,
    /// Checked at each record boundary; the in-flight record completes
    /// before the build acknowledges cancellation.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// In-memory weighted-field full-text index with BM25 scoring.
#[derive(Debug, Clone)]
pub struct FtsIndex {
    index: HashMap<String, Vec<Posting>>,
    doc_stats: HashMap<String, DocumentStats>,
    corpus: CorpusStats,
    config: IndexConfig,
    total_length_sum: f64,
}

impl Default for FtsIndex {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            doc_stats: HashMap::new(),
            corpus: CorpusStats::default(),
            config: IndexConfig::default(),
            total_length_sum: 0.0,
        }
    }
}

impl FtsIndex {
    /// Create an index, rejecting out-of-range configuration.
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Index one article. Adding an id that is already present replaces
    /// the previous version.
    pub fn add(&mut self, article: ArticleRecord) {
        if self.doc_stats.contains_key(&article.id) {
            self.remove(&article.id);
        }

        let weights = self.config.field_weights;
        let fields: [(Field, &str, f64); 3] = [
            (Field::Title, &article.title, weights.title),
            (Field::Description, &article.description, weights.description),
            (Field::Content, &article.content, weights.content),
        ];

        let mut field_lengths = Vec::with_capacity(3);
        let mut total_length = 0.0;
        let mut doc_terms: HashSet<String> = HashSet::new();

        for (field, text, weight) in fields {
            let tokens = tokenizer::tokenize_field(text);
            field_lengths.push((field, tokens.len()));
            total_length += tokens.len() as f64 * weight;

            for (term, frequency, positions) in count_terms(tokens) {
                doc_terms.insert(term.clone());
                self.index.entry(term).or_default().push(Posting {
                    doc_id: article.id.clone(),
                    field,
                    weight,
                    frequency,
                    positions,
                });
            }
        }

        for term in doc_terms {
            *self.corpus.document_frequency.entry(term).or_insert(0) += 1;
        }

        self.doc_stats.insert(
            article.id.clone(),
            DocumentStats {
                doc_id: article.id,
                field_lengths,
                total_length,
                title: article.title,
                article_type: article.article_type,
            },
        );
        self.corpus.document_count += 1;
        self.total_length_sum += total_length;
        self.recompute_avg();
    }

    /// Drop a document. Returns false (with no side effects) for an
    /// unknown id.
    pub fn remove(&mut self, doc_id: &str) -> bool {
        let Some(stats) = self.doc_stats.remove(doc_id) else {
            return false;
        };

        let corpus = &mut self.corpus;
        self.index.retain(|term, postings| {
            let before = postings.len();
            postings.retain(|p| p.doc_id != doc_id);
            if postings.len() < before {
                match corpus.document_frequency.get_mut(term) {
                    Some(df) if *df > 1 => *df -= 1,
                    _ => {
                        corpus.document_frequency.remove(term);
                    }
                }
            }
            !postings.is_empty()
        });

        self.corpus.document_count -= 1;
        self.total_length_sum -= stats.total_length;
        self.recompute_avg();
        true
    }

    /// Reset to empty, keeping the configuration.
    pub fn clear(&mut self) {
        self.index.clear();
        self.doc_stats.clear();
        self.corpus = CorpusStats::default();
        self.total_length_sum = 0.0;
    }

    /// Clear, then pull every record from `source`. Suspends only at
    /// record boundaries; no partial update is ever observable.
    pub async fn build_from<S>(&mut self, source: S, mut options: BuildOptions) -> Result<usize>
    where
        S: Stream<Item = ArticleRecord>,
    {
        self.clear();
        let every = options
            .progress_every
            .unwrap_or(self.config.progress_every.0)
            .max(1);

        pin_mut!(source);
        let mut count = 0usize;
        while let Some(article) = source.next().await {
            if let Some(cancel) = &options.cancel {
                if cancel.load(Ordering::Relaxed) {
                    tracing::info!(indexed = count, "build cancelled");
                    return Err(Error::Cancelled(count));
                }
            }
            self.add(article);
            count += 1;
            if count % every == 0 {
                if let Some(on_progress) = &mut options.on_progress {
                    on_progress(count);
                }
            }
        }
        tracing::debug!(indexed = count, "build complete");
        Ok(count)
    }

    /// Execute a query. A query with no usable terms, or an empty
    /// corpus, yields an empty result list.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        options.validate()?;

        let mut terms: Vec<String> = Vec::new();
        for term in tokenizer::tokenize_query(query) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        if terms.is_empty() || self.corpus.document_count == 0 {
            return Ok(Vec::new());
        }

        // Per (doc, query term): summed tf, max field weight.
        let mut candidates: HashMap<&str, HashMap<usize, (f64, f64)>> = HashMap::new();
        let mut idfs = Vec::with_capacity(terms.len());
        for (term_idx, term) in terms.iter().enumerate() {
            let doc_freq = self.corpus.document_frequency.get(term).copied().unwrap_or(0);
            idfs.push(scoring::idf(doc_freq, self.corpus.document_count));
            let Some(postings) = self.index.get(term) else {
                continue;
            };
            for posting in postings {
                let entry = candidates
                    .entry(posting.doc_id.as_str())
                    .or_default()
                    .entry(term_idx)
                    .or_insert((0.0, 0.0));
                entry.0 += posting.frequency as f64;
                entry.1 = entry.1.max(posting.weight);
            }
        }

        let mut results: Vec<SearchResult> = Vec::with_capacity(candidates.len());
        for (doc_id, matches) in candidates {
            let Some(stats) = self.doc_stats.get(doc_id) else {
                continue;
            };
            if let Some(types) = &options.types {
                if !types.contains(&stats.article_type) {
                    continue;
                }
            }

            let mut score = 0.0;
            let mut matched_terms: Vec<String> = Vec::with_capacity(matches.len());
            let mut term_idxs: Vec<usize> = matches.keys().copied().collect();
            term_idxs.sort_unstable();
            for term_idx in term_idxs {
                let (tf, weight) = matches[&term_idx];
                score += scoring::term_score(
                    tf,
                    stats.total_length,
                    self.corpus.avg_doc_length,
                    idfs[term_idx],
                    weight,
                    &self.config.bm25,
                );
                matched_terms.push(terms[term_idx].clone());
            }
            if score < options.min_score {
                continue;
            }
            results.push(SearchResult {
                doc_id: stats.doc_id.clone(),
                title: stats.title.clone(),
                article_type: stats.article_type,
                score,
                matched_terms,
            });
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        results.truncate(options.effective_limit());
        Ok(results)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            document_count: self.corpus.document_count,
            vocabulary_size: self.index.len(),
            avg_doc_length: self.corpus.avg_doc_length,
            total_postings: self.index.values().map(Vec::len).sum(),
        }
    }

    /// Documents containing `term` in any field. The input is run
    /// through query normalisation first.
    pub fn document_frequency(&self, term: &str) -> usize {
        let mut normalized = tokenizer::tokenize_query(term);
        let Some(first) = normalized.drain(..).next() else {
            return 0;
        };
        self.corpus
            .document_frequency
            .get(&first)
            .copied()
            .unwrap_or(0)
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.doc_stats.contains_key(doc_id)
    }

    pub(crate) fn parts(
        &self,
    ) -> (
        &HashMap<String, Vec<Posting>>,
        &HashMap<String, DocumentStats>,
        &CorpusStats,
    ) {
        (&self.index, &self.doc_stats, &self.corpus)
    }

    pub(crate) fn from_parts(
        index: HashMap<String, Vec<Posting>>,
        doc_stats: HashMap<String, DocumentStats>,
        corpus: CorpusStats,
        config: IndexConfig,
    ) -> Self {
        let total_length_sum = doc_stats.values().map(|s| s.total_length).sum();
        Self {
            index,
            doc_stats,
            corpus,
            config,
            total_length_sum,
        }
    }

    fn recompute_avg(&mut self) {
        self.corpus.avg_doc_length = if self.corpus.document_count > 0 {
            self.total_length_sum / self.corpus.document_count as f64
        } else {
            0.0
        };
    }
}

/// Frequency and position list per term, in deterministic term order.
fn count_terms(tokens: Vec<Token>) -> Vec<(String, u32, Vec<u32>)> {
    let mut counts: BTreeMap<String, (u32, Vec<u32>)> = BTreeMap::new();
    for token in tokens {
        let entry = counts.entry(token.term).or_insert((0, Vec::new()));
        entry.0 += 1;
        entry.1.push(token.position);
    }
    counts
        .into_iter()
        .map(|(term, (frequency, positions))| (term, frequency, positions))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, title: &str, description: &str, content: &str) -> ArticleRecord {
        ArticleRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            content: content.to_string(),
            article_type: ArticleType::Other,
        }
    }

    fn two_doc_index() -> FtsIndex {
        let mut index = FtsIndex::default();
        index.add(article("d1", "cat", "small animal", "cats are pets"));
        index.add(article("d2", "dog", "loyal animal", "dogs are pets"));
        index
    }

    #[test]
    fn test_add_updates_stats() {
        let index = two_doc_index();
        let stats = index.stats();
        assert_eq!(stats.document_count, 2);
        assert!(stats.vocabulary_size > 0);
        assert!(stats.avg_doc_length > 0.0);
    }

    #[test]
    fn test_df_counts_documents_not_postings() {
        let mut index = FtsIndex::default();
        // "cat" in all three fields: 3 postings, df 1.
        index.add(article("d1", "cat", "cat things", "a cat story"));
        assert_eq!(index.document_frequency("cat"), 1);
        let (terms, _, _) = index.parts();
        assert_eq!(terms.get("cat").map(Vec::len), Some(3));
    }

    #[test]
    fn test_search_ranks_title_match_first() {
        let index = two_doc_index();
        let results = index.search("cat", &SearchOptions::default()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].doc_id, "d1");
        assert!(results[0].score > 0.0);

        let results = index.search("animal", &SearchOptions::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.score > 0.0));

        let results = index.search("cat pets", &SearchOptions::default()).unwrap();
        assert_eq!(results[0].doc_id, "d1");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_remove_unknown_is_false_without_side_effects() {
        let mut index = two_doc_index();
        let before = index.stats();
        assert!(!index.remove("nope"));
        assert_eq!(index.stats(), before);
    }

    #[test]
    fn test_remove_drops_postings_and_df() {
        let mut index = two_doc_index();
        assert!(index.remove("d1"));
        assert_eq!(index.stats().document_count, 1);
        assert_eq!(index.document_frequency("cat"), 0);
        assert!(index.search("cat", &SearchOptions::default()).unwrap().is_empty());
        // Shared terms survive with decremented df.
        assert_eq!(index.document_frequency("animal"), 1);
    }

    #[test]
    fn test_re_add_equals_single_add() {
        let mut once = FtsIndex::default();
        once.add(article("d1", "cat", "small animal", "cats are pets"));

        let mut twice = FtsIndex::default();
        twice.add(article("d1", "old title", "old", "old content"));
        twice.add(article("d1", "cat", "small animal", "cats are pets"));

        assert_eq!(once.stats(), twice.stats());
        assert_eq!(
            once.search("cat", &SearchOptions::default()).unwrap(),
            twice.search("cat", &SearchOptions::default()).unwrap()
        );
    }

    #[test]
    fn test_add_remove_add_is_idempotent() {
        let mut index = two_doc_index();
        let baseline = index.search("pets", &SearchOptions::default()).unwrap();
        index.remove("d1");
        index.add(article("d1", "cat", "small animal", "cats are pets"));
        assert_eq!(
            index.search("pets", &SearchOptions::default()).unwrap(),
            baseline
        );
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut index = two_doc_index();
        index.clear();
        index.clear();
        let stats = index.stats();
        assert_eq!(stats.document_count, 0);
        assert_eq!(stats.vocabulary_size, 0);
        assert_eq!(stats.avg_doc_length, 0.0);
        assert_eq!(stats.total_postings, 0);
    }

    #[test]
    fn test_empty_query_and_empty_corpus() {
        let index = two_doc_index();
        assert!(index.search("", &SearchOptions::default()).unwrap().is_empty());
        assert!(index.search("!!!", &SearchOptions::default()).unwrap().is_empty());

        let empty = FtsIndex::default();
        assert!(empty.search("cat", &SearchOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_tie_break_by_doc_id() {
        let mut index = FtsIndex::default();
        index.add(article("b", "same words", "", ""));
        index.add(article("a", "same words", "", ""));
        let results = index.search("same", &SearchOptions::default()).unwrap();
        assert_eq!(results[0].doc_id, "a");
        assert_eq!(results[1].doc_id, "b");
    }

    #[test]
    fn test_type_filter() {
        let mut index = FtsIndex::default();
        let mut person = article("p", "Ada Lovelace", "mathematician", "wrote programs");
        person.article_type = ArticleType::Person;
        index.add(person);
        let mut place = article("q", "Ada, Oklahoma", "city", "a small city");
        place.article_type = ArticleType::Place;
        index.add(place);

        let options = SearchOptions {
            types: Some([ArticleType::Person].into_iter().collect()),
            ..SearchOptions::default()
        };
        let results = index.search("ada", &options).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].doc_id, "p");
    }

    #[test]
    fn test_limit_truncates() {
        let mut index = FtsIndex::default();
        for i in 0..30 {
            index.add(article(&format!("d{i:02}"), "common term", "", ""));
        }
        let results = index.search("common", &SearchOptions::default()).unwrap();
        assert_eq!(results.len(), 20);
        let results = index
            .search(
                "common",
                &SearchOptions {
                    limit: Some(5),
                    ..SearchOptions::default()
                },
            )
            .unwrap();
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn test_matched_terms_reported() {
        let index = two_doc_index();
        let results = index.search("cat pets", &SearchOptions::default()).unwrap();
        let top = &results[0];
        assert!(top.matched_terms.contains(&"cat".to_string()));
        assert!(top.matched_terms.contains(&"pet".to_string()));
    }

    #[test]
    fn test_field_token_sum_matches_posting_frequencies() {
        let mut index = FtsIndex::default();
        index.add(article("d1", "alpha beta", "beta gamma", "gamma gamma delta"));
        let (terms, docs, _) = index.parts();
        let stats = &docs["d1"];
        let token_sum: usize = stats.field_lengths.iter().map(|(_, len)| len).sum();
        let freq_sum: usize = terms
            .values()
            .flatten()
            .filter(|p| p.doc_id == "d1")
            .map(|p| p.frequency as usize)
            .sum();
        assert_eq!(token_sum, freq_sum);
    }

    #[test]
    fn test_avg_doc_length_invariant() {
        let index = two_doc_index();
        let (_, docs, corpus) = index.parts();
        let total: f64 = docs.values().map(|s| s.total_length).sum();
        assert!((corpus.avg_doc_length * corpus.document_count as f64 - total).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_build_from_with_progress() {
        let mut index = FtsIndex::default();
        let articles: Vec<ArticleRecord> = (0..25)
            .map(|i| article(&format!("d{i}"), "title words", "", "content here"))
            .collect();
        let progress = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = progress.clone();
        let count = index
            .build_from(
                futures::stream::iter(articles),
                BuildOptions {
                    progress_every: Some(10),
                    on_progress: Some(Box::new(move |n| seen.lock().unwrap().push(n))),
                    cancel: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(count, 25);
        assert_eq!(index.stats().document_count, 25);
        assert_eq!(*progress.lock().unwrap(), vec![10, 20]);
    }

    #[tokio::test]
    async fn test_build_from_cancellation() {
        let mut index = FtsIndex::default();
        let cancel = Arc::new(AtomicBool::new(true));
        let articles = vec![article("d1", "t", "", "c")];
        let err = index
            .build_from(
                futures::stream::iter(articles),
                BuildOptions {
                    cancel: Some(cancel),
                    ..BuildOptions::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled(0)));
    }
}
