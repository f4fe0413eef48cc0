//! Filters, deduplicates, sorts and truncates scored documents into the
//! bounded `SearchResult` list every algorithm returns.
//!
//! Order matters: threshold filter and deduplication always run before
//! top-k truncation.

use ragline_core::types::{coerce_top_k, Document, SearchAlgorithm, SearchResult};

use crate::text::{jaccard, raw_token_set};

/// Two results are duplicates when their content token sets overlap more
/// than this.
pub const DEDUP_THRESHOLD: f32 = 0.8;

pub fn rank(
    scored: Vec<(Document, f32)>,
    top_k: i64,
    similarity_threshold: f32,
    algorithm: SearchAlgorithm,
) -> Vec<SearchResult> {
    let wrapped = scored
        .into_iter()
        .map(|(doc, score)| to_result(doc, score, algorithm))
        .collect();
    rank_results(wrapped, top_k, similarity_threshold)
}

/// Same filter → sort → dedup → truncate pass over already-wrapped results.
/// Used directly when a stage (hybrid fusion, fuzzy matching) produces
/// `SearchResult`s whose scores were adjusted after wrapping.
pub fn rank_results(
    results: Vec<SearchResult>,
    top_k: i64,
    similarity_threshold: f32,
) -> Vec<SearchResult> {
    let top_k = coerce_top_k(top_k);
    let threshold = similarity_threshold.clamp(0.0, 1.0);

    let mut kept: Vec<SearchResult> = results
        .into_iter()
        .filter(|r| r.similarity_score >= threshold)
        .collect();

    // Stable sort keeps equal-score results in collection order.
    kept.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut accepted: Vec<SearchResult> = Vec::new();
    let mut accepted_tokens: Vec<std::collections::HashSet<String>> = Vec::new();
    for result in kept {
        let tokens = raw_token_set(&result.content);
        let duplicate = accepted_tokens
            .iter()
            .any(|existing| jaccard(existing, &tokens) > DEDUP_THRESHOLD);
        if !duplicate {
            accepted.push(result);
            accepted_tokens.push(tokens);
        }
        if accepted.len() >= top_k {
            break;
        }
    }

    accepted
}

fn to_result(doc: Document, score: f32, algorithm: SearchAlgorithm) -> SearchResult {
    SearchResult {
        content: doc.content,
        title: doc.title,
        source: doc.source,
        similarity_score: score,
        confidence: score,
        chunk_id: doc.id,
        document_id: doc.doc_id,
        position: doc.position,
        search_algorithm: algorithm,
        metadata: doc.metadata,
    }
}
