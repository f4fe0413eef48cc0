//! Similarity scorers. Each returns one score in [0, 1] per input document,
//! parallel to the input slice. Degenerate inputs (empty query, empty
//! collection, empty documents) score 0.0 instead of erroring.

use std::collections::{HashMap, HashSet};

use ragline_core::types::Document;

use crate::text::{jaccard, token_set, tokenize};

const HYBRID_TFIDF_WEIGHT: f32 = 0.4;
const HYBRID_JACCARD_WEIGHT: f32 = 0.2;
const HYBRID_SEMANTIC_WEIGHT: f32 = 0.4;

const TITLE_WEIGHT: f32 = 0.4;
const CONTENT_WEIGHT: f32 = 0.4;
const KEYWORD_WEIGHT: f32 = 0.2;

/// Text a document is scored on: body plus title.
fn scored_text(doc: &Document) -> String {
    format!("{} {}", doc.content, doc.title)
}

/// Token-set overlap between the query and each document.
pub fn jaccard_scores(query: &str, documents: &[Document]) -> Vec<f32> {
    let query_set = token_set(query);
    if query_set.is_empty() {
        return vec![0.0; documents.len()];
    }
    documents
        .iter()
        .map(|doc| {
            let doc_set = token_set(&scored_text(doc));
            jaccard(&query_set, &doc_set)
        })
        .collect()
}

/// TF-IDF cosine over a vocabulary shared between the query and the whole
/// collection. idf = ln(N / (1 + docs_containing_term)); zero vectors score
/// 0.0, never NaN.
pub fn tfidf_scores(query: &str, documents: &[Document]) -> Vec<f32> {
    if documents.is_empty() {
        return vec![];
    }
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        return vec![0.0; documents.len()];
    }

    let doc_tokens: Vec<Vec<String>> = documents
        .iter()
        .map(|doc| tokenize(&scored_text(doc)))
        .collect();

    let mut vocabulary: HashSet<&str> = query_tokens.iter().map(String::as_str).collect();
    for tokens in &doc_tokens {
        vocabulary.extend(tokens.iter().map(String::as_str));
    }

    let doc_count = documents.len() as f32;
    let mut idf: HashMap<&str, f32> = HashMap::with_capacity(vocabulary.len());
    for &word in &vocabulary {
        let docs_with_word = doc_tokens
            .iter()
            .filter(|tokens| tokens.iter().any(|t| t == word))
            .count();
        idf.insert(word, (doc_count / (1.0 + docs_with_word as f32)).ln());
    }

    let query_vector = term_vector(&query_tokens, &vocabulary, &idf);

    doc_tokens
        .iter()
        .map(|tokens| {
            let doc_vector = term_vector(tokens, &vocabulary, &idf);
            cosine(&query_vector, &doc_vector).clamp(0.0, 1.0)
        })
        .collect()
}

fn term_vector<'a>(
    tokens: &[String],
    vocabulary: &HashSet<&'a str>,
    idf: &HashMap<&'a str, f32>,
) -> HashMap<&'a str, f32> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    let len = tokens.len() as f32;
    let mut vector = HashMap::with_capacity(vocabulary.len());
    for &word in vocabulary {
        let tf = if len > 0.0 {
            counts.get(word).copied().unwrap_or(0) as f32 / len
        } else {
            0.0
        };
        vector.insert(word, tf * idf.get(word).copied().unwrap_or(0.0));
    }
    vector
}

fn cosine(a: &HashMap<&str, f32>, b: &HashMap<&str, f32>) -> f32 {
    let mut dot = 0.0f32;
    let mut mag_a = 0.0f32;
    let mut mag_b = 0.0f32;
    for (&key, &va) in a {
        dot += va * b.get(key).copied().unwrap_or(0.0);
        mag_a += va * va;
    }
    for &vb in b.values() {
        mag_b += vb * vb;
    }
    let mag_a = mag_a.sqrt();
    let mag_b = mag_b.sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

/// Heuristic semantic score: weighted title / content / keyword components.
pub fn semantic_scores(query: &str, documents: &[Document]) -> Vec<f32> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        return vec![0.0; documents.len()];
    }
    documents
        .iter()
        .map(|doc| {
            let title = title_similarity(query, &doc.title);
            let content = content_similarity(&query_tokens, &doc.content);
            let keyword = keyword_similarity(&query_tokens, &doc.content);
            TITLE_WEIGHT * title + CONTENT_WEIGHT * content + KEYWORD_WEIGHT * keyword
        })
        .collect()
}

/// 1.0 on substring containment, otherwise query-token overlap ratio.
fn title_similarity(query: &str, title: &str) -> f32 {
    if title.is_empty() {
        return 0.0;
    }
    let query_lower = query.to_lowercase();
    let title_lower = title.to_lowercase();
    if title_lower.contains(query_lower.trim()) {
        return 1.0;
    }
    let query_set = token_set(query);
    let title_set = token_set(title);
    if query_set.is_empty() || title_set.is_empty() {
        return 0.0;
    }
    let overlap = query_set.intersection(&title_set).count();
    overlap as f32 / query_set.len() as f32
}

/// Occurrence count of query tokens in the content, normalised by the square
/// root of the content length and capped at 1.0.
fn content_similarity(query_tokens: &[String], content: &str) -> f32 {
    if content.is_empty() || query_tokens.is_empty() {
        return 0.0;
    }
    let content_tokens = tokenize(content);
    if content_tokens.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in &content_tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    let matches: usize = query_tokens
        .iter()
        .map(|t| counts.get(t.as_str()).copied().unwrap_or(0))
        .sum();
    let normalized = matches as f32 / (content_tokens.len() as f32).sqrt();
    normalized.min(1.0)
}

/// 1.0 on exact phrase containment, otherwise per-token occurrence counts
/// with diminishing returns, capped at 1.0 per token.
fn keyword_similarity(query_tokens: &[String], content: &str) -> f32 {
    if content.is_empty() || query_tokens.is_empty() {
        return 0.0;
    }
    let content_lower = content.to_lowercase();
    let phrase = query_tokens.join(" ");
    if content_lower.contains(&phrase) {
        return 1.0;
    }
    let mut matches = 0.0f32;
    for token in query_tokens {
        let count = content_lower.matches(token.as_str()).count();
        if count > 0 {
            matches += (count as f32 * 0.3).min(1.0);
        }
    }
    matches / query_tokens.len() as f32
}

/// Weighted fusion of tf-idf, Jaccard and heuristic-semantic scores. All
/// three scorers run over the same slice and are combined per document.
pub fn hybrid_scores(query: &str, documents: &[Document]) -> Vec<f32> {
    if documents.is_empty() {
        return vec![];
    }
    let tfidf = tfidf_scores(query, documents);
    let jaccard = jaccard_scores(query, documents);
    let semantic = semantic_scores(query, documents);
    (0..documents.len())
        .map(|i| {
            HYBRID_TFIDF_WEIGHT * tfidf[i]
                + HYBRID_JACCARD_WEIGHT * jaccard[i]
                + HYBRID_SEMANTIC_WEIGHT * semantic[i]
        })
        .collect()
}
