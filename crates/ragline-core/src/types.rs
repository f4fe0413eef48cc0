//! Domain types shared by the scoring, retrieval and orchestration crates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub type ChunkId = String;
pub type DocId = String;
pub type Meta = HashMap<String, String>;

/// A chunk of a source document as held by the document store.
///
/// - `id`: globally unique chunk identifier
/// - `doc_id`: stable parent-document identity (file stem or external id)
/// - `position`/`total_chunks`: ordinal within the parent document
/// - `embedding`/`similarity_score`: optional precomputed values; read-only
///   to the pipeline, never mutated within a retrieval call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: ChunkId,
    pub doc_id: DocId,
    pub title: String,
    pub content: String,
    pub source: String,
    pub position: usize,
    pub total_chunks: usize,
    #[serde(default)]
    pub metadata: Meta,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub similarity_score: Option<f32>,
}

/// The closed set of scoring strategies. Unknown names are a validation
/// error surfaced to the caller, not silently defaulted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SearchAlgorithm {
    Semantic,
    Keyword,
    Hybrid,
    Fuzzy,
    Contextual,
}

impl SearchAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchAlgorithm::Semantic => "semantic",
            SearchAlgorithm::Keyword => "keyword",
            SearchAlgorithm::Hybrid => "hybrid",
            SearchAlgorithm::Fuzzy => "fuzzy",
            SearchAlgorithm::Contextual => "contextual",
        }
    }
}

impl FromStr for SearchAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "semantic" => Ok(SearchAlgorithm::Semantic),
            "keyword" => Ok(SearchAlgorithm::Keyword),
            "hybrid" => Ok(SearchAlgorithm::Hybrid),
            "fuzzy" => Ok(SearchAlgorithm::Fuzzy),
            "contextual" => Ok(SearchAlgorithm::Contextual),
            other => Err(Error::InvalidAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked hit. `similarity_score` and `confidence` are always in [0, 1];
/// `confidence` mirrors the score unless a later stage adjusts it (e.g. the
/// contextual boost). Value object, created fresh per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub content: String,
    pub title: String,
    pub source: String,
    pub similarity_score: f32,
    pub confidence: f32,
    pub chunk_id: ChunkId,
    pub document_id: DocId,
    pub position: usize,
    pub search_algorithm: SearchAlgorithm,
    #[serde(default)]
    pub metadata: Meta,
}

/// A retrieval request. Constructed per call, never persisted.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub algorithm: SearchAlgorithm,
    pub top_k: usize,
    pub similarity_threshold: f32,
    pub filters: Meta,
}

pub const DEFAULT_TOP_K: usize = 5;
pub const MAX_TOP_K: usize = 50;

/// Coerce a caller-supplied top_k to a safe value: non-positive falls back
/// to the default, oversized requests are capped.
pub fn coerce_top_k(raw: i64) -> usize {
    if raw <= 0 {
        DEFAULT_TOP_K
    } else {
        (raw as usize).min(MAX_TOP_K)
    }
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, algorithm: SearchAlgorithm) -> Self {
        Self {
            text: text.into(),
            algorithm,
            top_k: DEFAULT_TOP_K,
            similarity_threshold: 0.1,
            filters: Meta::new(),
        }
    }

    pub fn with_top_k(mut self, top_k: i64) -> Self {
        self.top_k = coerce_top_k(top_k);
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}
