//! ragline-retrieval
//!
//! The retrieval coordinator: dispatches a `SearchQuery` to the scoring
//! algorithms, applies ranking, assembles token-budgeted context and caches
//! complete result lists. Store failures degrade to empty results so callers
//! can fall back to a no-context path.

pub mod cache;
pub mod context;
pub mod fuzzy;
pub mod store;
pub mod tools;

use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::Arc;
use std::time::Duration;

use ragline_core::config::RetrievalSettings;
use ragline_core::error::{Error, Result};
use ragline_core::traits::{Cache, DocumentStore};
use ragline_core::types::{
    coerce_top_k, ChunkId, Document, Meta, SearchAlgorithm, SearchQuery, SearchResult,
};
use ragline_score::{rank, rank_results, semantic_scores, tfidf_scores};

pub use cache::MemoryCache;
pub use store::MemoryStore;

/// Fusion weights for the coordinator-level hybrid merge.
const HYBRID_SEMANTIC_WEIGHT: f32 = 0.7;
/// Score multiplier applied by contextual expansion.
const CONTEXT_BOOST: f32 = 1.1;

pub struct Retriever {
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn Cache>,
    settings: RetrievalSettings,
}

impl Retriever {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn Cache>,
        settings: RetrievalSettings,
    ) -> Self {
        Self { store, cache, settings }
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    /// Run one retrieval. Results never include a score below the query
    /// threshold and are bounded by the (coerced) top_k.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let top_k = coerce_top_k(query.top_k as i64) as i64;
        let threshold = query.similarity_threshold.clamp(0.0, 1.0);

        let normalized = normalize_query(&query.text);
        let key = cache_key(&normalized, query.algorithm, top_k, threshold, &query.filters);
        if let Some(cached) = self.cache.get(&key).await {
            if let Ok(results) = serde_json::from_str::<Vec<SearchResult>>(&cached) {
                tracing::debug!(algorithm = %query.algorithm, "cache hit");
                return Ok(results);
            }
        }

        let documents = match self.fetch_documents().await? {
            Some(docs) => docs,
            None => return Ok(vec![]),
        };
        let documents = apply_filters(documents, &query.filters);
        if documents.is_empty() {
            return Ok(vec![]);
        }

        let results = match query.algorithm {
            SearchAlgorithm::Semantic => {
                let scores = semantic_scores(&query.text, &documents);
                rank(zip_scores(documents, scores), top_k, threshold, SearchAlgorithm::Semantic)
            }
            SearchAlgorithm::Keyword => {
                let scores = tfidf_scores(&query.text, &documents);
                rank(zip_scores(documents, scores), top_k, threshold, SearchAlgorithm::Keyword)
            }
            SearchAlgorithm::Fuzzy => self.fuzzy_search(&query.text, &documents, top_k, threshold),
            SearchAlgorithm::Hybrid => self.hybrid_merge(
                &query.text,
                &documents,
                top_k,
                threshold,
                HYBRID_SEMANTIC_WEIGHT,
            ),
            SearchAlgorithm::Contextual => {
                self.contextual_search(&query.text, &documents, top_k, threshold)
            }
        };

        if let Ok(encoded) = serde_json::to_string(&results) {
            self.cache.set(&key, encoded, self.settings.cache_ttl_secs).await;
        }
        tracing::info!(
            algorithm = %query.algorithm,
            results = results.len(),
            "search complete"
        );
        Ok(results)
    }

    /// Hybrid search with a caller-supplied semantic weight; the keyword side
    /// gets the complement. Exposed for the `hybrid_search` tool.
    pub async fn hybrid_search_weighted(
        &self,
        query_text: &str,
        top_k: i64,
        semantic_weight: f32,
    ) -> Result<Vec<SearchResult>> {
        let documents = match self.fetch_documents().await? {
            Some(docs) => docs,
            None => return Ok(vec![]),
        };
        if documents.is_empty() {
            return Ok(vec![]);
        }
        let weight = semantic_weight.clamp(0.0, 1.0);
        Ok(self.hybrid_merge(query_text, &documents, top_k, self.settings.default_threshold, weight))
    }

    /// Bounded store fetch. A timeout is surfaced as a distinct error so the
    /// caller can retry; plain unavailability degrades to `None` (empty).
    async fn fetch_documents(&self) -> Result<Option<Vec<Document>>> {
        let deadline = Duration::from_secs(self.settings.store_timeout_secs);
        match tokio::time::timeout(deadline, self.store.get_all_documents()).await {
            Err(_) => Err(Error::Timeout("document store fetch".to_string())),
            Ok(Err(e)) => {
                tracing::warn!("document store unavailable, returning no results: {}", e);
                Ok(None)
            }
            Ok(Ok(docs)) => Ok(Some(docs)),
        }
    }

    fn fuzzy_search(
        &self,
        query_text: &str,
        documents: &[Document],
        top_k: i64,
        threshold: f32,
    ) -> Vec<SearchResult> {
        let scored: Vec<(Document, f32)> = documents
            .iter()
            .filter_map(|doc| {
                let score = fuzzy::similarity(query_text, &doc.content)
                    .max(fuzzy::similarity(query_text, &doc.title));
                if score > self.settings.fuzzy_threshold {
                    Some((doc.clone(), score))
                } else {
                    None
                }
            })
            .collect();
        rank(scored, top_k, threshold, SearchAlgorithm::Fuzzy)
    }

    /// Semantic and keyword runs over the same collection, fused per chunk
    /// id. A chunk missing from one side contributes 0.0 from that side, it
    /// is not excluded.
    fn hybrid_merge(
        &self,
        query_text: &str,
        documents: &[Document],
        top_k: i64,
        threshold: f32,
        semantic_weight: f32,
    ) -> Vec<SearchResult> {
        let expanded = top_k.saturating_mul(2);
        let semantic = rank(
            zip_scores(documents.to_vec(), semantic_scores(query_text, documents)),
            expanded,
            threshold,
            SearchAlgorithm::Semantic,
        );
        let keyword = rank(
            zip_scores(documents.to_vec(), tfidf_scores(query_text, documents)),
            expanded,
            threshold,
            SearchAlgorithm::Keyword,
        );

        let keyword_weight = 1.0 - semantic_weight;
        let mut by_id: HashMap<ChunkId, (SearchResult, f32, f32)> = HashMap::new();
        for result in semantic {
            let score = result.similarity_score;
            by_id.insert(result.chunk_id.clone(), (result, score, 0.0));
        }
        for result in keyword {
            match by_id.get_mut(&result.chunk_id) {
                Some(entry) => entry.2 = result.similarity_score,
                None => {
                    let score = result.similarity_score;
                    by_id.insert(result.chunk_id.clone(), (result, 0.0, score));
                }
            }
        }

        let fused: Vec<SearchResult> = by_id
            .into_values()
            .map(|(mut result, sem, kw)| {
                let combined = semantic_weight * sem + keyword_weight * kw;
                result.similarity_score = combined;
                result.confidence = combined;
                result.search_algorithm = SearchAlgorithm::Hybrid;
                result
            })
            .collect();

        // The fused score can fall below the threshold even when both inputs
        // passed it, so the full filter/dedup/truncate pass runs again.
        rank_results(fused, top_k, threshold)
    }

    /// Semantic pass, then neighbour-chunk text appended to each result's
    /// metadata and the score boosted. The boosted score is clamped to 1.0.
    fn contextual_search(
        &self,
        query_text: &str,
        documents: &[Document],
        top_k: i64,
        threshold: f32,
    ) -> Vec<SearchResult> {
        let semantic = rank(
            zip_scores(documents.to_vec(), semantic_scores(query_text, documents)),
            top_k,
            threshold,
            SearchAlgorithm::Semantic,
        );

        semantic
            .into_iter()
            .map(|mut result| {
                let window = self.context_window_text(documents, &result);
                if !window.is_empty() {
                    result.metadata.insert("context_window".to_string(), window);
                }
                result
                    .metadata
                    .insert("context_enhanced".to_string(), "true".to_string());
                result.similarity_score = (result.similarity_score * CONTEXT_BOOST).min(1.0);
                result.confidence = (result.confidence * CONTEXT_BOOST).min(1.0);
                result.search_algorithm = SearchAlgorithm::Contextual;
                result
            })
            .collect()
    }

    /// Text of the chunks within `context_window` positions of the result,
    /// inside the same parent document, in position order.
    fn context_window_text(&self, documents: &[Document], result: &SearchResult) -> String {
        let radius = self.settings.context_window;
        let mut neighbours: Vec<&Document> = documents
            .iter()
            .filter(|doc| {
                doc.doc_id == result.document_id
                    && doc.id != result.chunk_id
                    && doc.position.abs_diff(result.position) <= radius
            })
            .collect();
        neighbours.sort_by_key(|doc| doc.position);
        neighbours
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn zip_scores(documents: Vec<Document>, scores: Vec<f32>) -> Vec<(Document, f32)> {
    documents.into_iter().zip(scores).collect()
}

/// Filters are equality constraints against document metadata.
fn apply_filters(documents: Vec<Document>, filters: &Meta) -> Vec<Document> {
    if filters.is_empty() {
        return documents;
    }
    documents
        .into_iter()
        .filter(|doc| {
            filters
                .iter()
                .all(|(k, v)| doc.metadata.get(k).map(String::as_str) == Some(v.as_str()))
        })
        .collect()
}

fn normalize_query(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keyed by (normalized query, algorithm, top_k); threshold and filters are
/// folded into the hash so a hit can never return results ranked under a
/// different cut-off.
fn cache_key(
    normalized_query: &str,
    algorithm: SearchAlgorithm,
    top_k: i64,
    threshold: f32,
    filters: &Meta,
) -> String {
    let mut hasher = twox_hash::XxHash64::with_seed(0);
    hasher.write(normalized_query.as_bytes());
    hasher.write(&threshold.to_bits().to_le_bytes());
    let mut filter_pairs: Vec<(&String, &String)> = filters.iter().collect();
    filter_pairs.sort();
    for (k, v) in filter_pairs {
        hasher.write(k.as_bytes());
        hasher.write(v.as_bytes());
    }
    format!("search:{}:{}:{:016x}", algorithm.as_str(), top_k, hasher.finish())
}
