//! Servicing for the tool calls strategies declare to the generation
//! provider. Each returns a structured JSON result the provider can consume;
//! an unknown function name yields an error payload rather than an `Err`, so
//! the provider sees what went wrong.

use ragline_core::error::Result;
use ragline_core::types::{SearchAlgorithm, SearchQuery};
use serde_json::{json, Value};

use crate::Retriever;

pub const SEARCH_KNOWLEDGE_BASE: &str = "search_knowledge_base";
pub const HYBRID_SEARCH: &str = "hybrid_search";

pub async fn service_tool_call(retriever: &Retriever, name: &str, args: &Value) -> Result<Value> {
    match name {
        SEARCH_KNOWLEDGE_BASE => search_knowledge_base(retriever, args).await,
        HYBRID_SEARCH => hybrid_search(retriever, args).await,
        other => Ok(json!({ "error": format!("Unknown function: {}", other) })),
    }
}

async fn search_knowledge_base(retriever: &Retriever, args: &Value) -> Result<Value> {
    let query_text = match args.get("query").and_then(Value::as_str) {
        Some(q) => q,
        None => return Ok(json!({ "error": "missing required argument: query" })),
    };
    let top_k = args.get("top_k").and_then(Value::as_i64).unwrap_or(5);

    let query = SearchQuery::new(query_text, SearchAlgorithm::Hybrid).with_top_k(top_k);
    let results = retriever.search(&query).await?;

    let formatted: Vec<Value> = results
        .iter()
        .map(|r| {
            json!({
                "content": r.content,
                "title": r.title,
                "source": r.source,
                "similarity_score": r.similarity_score,
            })
        })
        .collect();

    Ok(json!({
        "results": formatted,
        "query": query_text,
        "num_results": formatted.len(),
    }))
}

async fn hybrid_search(retriever: &Retriever, args: &Value) -> Result<Value> {
    let query_text = match args.get("query").and_then(Value::as_str) {
        Some(q) => q,
        None => return Ok(json!({ "error": "missing required argument: query" })),
    };
    let semantic_weight = args
        .get("semantic_weight")
        .and_then(Value::as_f64)
        .unwrap_or(0.7) as f32;

    let results = retriever
        .hybrid_search_weighted(query_text, 5, semantic_weight)
        .await?;

    let formatted: Vec<Value> = results
        .iter()
        .map(|r| {
            json!({
                "content": r.content,
                "title": r.title,
                "source": r.source,
                "combined_score": r.similarity_score,
            })
        })
        .collect();

    Ok(json!({
        "results": formatted,
        "query": query_text,
        "num_results": formatted.len(),
        "search_type": "hybrid",
    }))
}
