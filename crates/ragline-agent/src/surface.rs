//! The transport-agnostic query surface: the request shape the pipeline
//! accepts and the response shape it returns, regardless of how they arrive.

use std::collections::HashMap;

use ragline_core::error::Result;
use ragline_core::types::{coerce_top_k, Meta, SearchAlgorithm, SearchQuery, SearchResult};
use serde::{Deserialize, Serialize};

use crate::strategy::StrategyKind;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub top_k: Option<i64>,
    #[serde(default)]
    pub similarity_threshold: Option<f32>,
    #[serde(default)]
    pub filters: Meta,
    #[serde(default)]
    pub force_strategy: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Default::default() }
    }

    /// Validate into a concrete search query plus optional strategy
    /// override. Out-of-range numbers are corrected to safe values; a bad
    /// enum name is surfaced to the caller as a validation error.
    pub fn validate(&self) -> Result<(SearchQuery, Option<StrategyKind>)> {
        let algorithm = match &self.algorithm {
            Some(name) => name.parse::<SearchAlgorithm>()?,
            None => SearchAlgorithm::Hybrid,
        };
        let mut search = SearchQuery::new(self.query.clone(), algorithm);
        if let Some(top_k) = self.top_k {
            search.top_k = coerce_top_k(top_k);
        }
        if let Some(threshold) = self.similarity_threshold {
            search.similarity_threshold = threshold.clamp(0.0, 1.0);
        }
        search.filters = self.filters.clone();

        let force = match &self.force_strategy {
            Some(name) => Some(name.parse::<StrategyKind>()?),
            None => None,
        };
        Ok((search, force))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    /// A fallback tier produced the answer.
    Degraded,
    Error,
}

/// Per-strategy result entry in a coordinated response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StrategyOutcome {
    Success { response: String, response_time_ms: u64 },
    Error { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub response: String,
    pub context: Vec<SearchResult>,
    pub algorithm: String,
    pub strategy_used: String,
    pub complexity: String,
    pub confidence: f32,
    pub status: ResponseStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_strategy_results: Option<HashMap<String, StrategyOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
