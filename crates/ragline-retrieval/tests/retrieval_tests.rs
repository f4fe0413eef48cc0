use std::sync::Arc;

use async_trait::async_trait;
use ragline_core::config::RetrievalSettings;
use ragline_core::error::{Error, Result};
use ragline_core::tokens::estimate_tokens;
use ragline_core::traits::DocumentStore;
use ragline_core::types::{Document, Meta, SearchAlgorithm, SearchQuery, SearchResult};
use ragline_retrieval::context::build_context;
use ragline_retrieval::{MemoryCache, MemoryStore, Retriever};

fn doc(id: &str, title: &str, content: &str) -> Document {
    Document {
        id: id.to_string(),
        doc_id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        source: "test".to_string(),
        position: 0,
        total_chunks: 1,
        metadata: Meta::new(),
        embedding: None,
        similarity_score: None,
    }
}

fn retriever_with(docs: Vec<Document>) -> Retriever {
    Retriever::new(
        Arc::new(MemoryStore::new(docs)),
        Arc::new(MemoryCache::new(100)),
        RetrievalSettings::default(),
    )
}

fn ml_corpus() -> Vec<Document> {
    vec![
        doc("ml", "ML Basics", "Machine learning is a subset of AI"),
        doc("cook", "Cooking", "How to bake bread"),
    ]
}

#[tokio::test]
async fn hybrid_ranks_relevant_document_first() {
    let retriever = retriever_with(ml_corpus());
    let query = SearchQuery::new("machine learning", SearchAlgorithm::Hybrid)
        .with_top_k(5)
        .with_threshold(0.1);
    let results = retriever.search(&query).await.expect("search");

    assert!(!results.is_empty());
    assert_eq!(results[0].title, "ML Basics");
    if let Some(cooking) = results.iter().find(|r| r.title == "Cooking") {
        assert!(results[0].similarity_score > cooking.similarity_score);
    }
}

#[tokio::test]
async fn empty_collection_returns_empty_for_every_algorithm() {
    let retriever = retriever_with(vec![]);
    for algorithm in [
        SearchAlgorithm::Semantic,
        SearchAlgorithm::Keyword,
        SearchAlgorithm::Hybrid,
        SearchAlgorithm::Fuzzy,
        SearchAlgorithm::Contextual,
    ] {
        let query = SearchQuery::new("anything", algorithm);
        let results = retriever.search(&query).await.expect("search");
        assert!(results.is_empty(), "{} should return no results", algorithm);
    }
}

#[tokio::test]
async fn no_result_falls_below_the_threshold() {
    let retriever = retriever_with(ml_corpus());
    for algorithm in [
        SearchAlgorithm::Semantic,
        SearchAlgorithm::Keyword,
        SearchAlgorithm::Hybrid,
        SearchAlgorithm::Fuzzy,
        SearchAlgorithm::Contextual,
    ] {
        let query = SearchQuery::new("machine learning", algorithm).with_threshold(0.2);
        let results = retriever.search(&query).await.expect("search");
        for r in &results {
            assert!(r.similarity_score >= 0.2, "{}: {}", algorithm, r.similarity_score);
            assert!(r.similarity_score <= 1.0);
            assert!(r.confidence <= 1.0);
        }
    }
}

#[tokio::test]
async fn repeated_query_is_served_from_cache_identically() {
    let cache = Arc::new(MemoryCache::new(100));
    let retriever = Retriever::new(
        Arc::new(MemoryStore::new(ml_corpus())),
        cache.clone(),
        RetrievalSettings::default(),
    );
    let query = SearchQuery::new("machine learning", SearchAlgorithm::Hybrid);

    let first = retriever.search(&query).await.expect("first search");
    let second = retriever.search(&query).await.expect("second search");

    assert!(cache.stats().hits >= 1, "second call should hit the cache");
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.chunk_id, b.chunk_id);
        assert_eq!(a.similarity_score, b.similarity_score);
    }
}

struct DownStore;

#[async_trait]
impl DocumentStore for DownStore {
    async fn get_all_documents(&self) -> Result<Vec<Document>> {
        Err(Error::Store("connection refused".to_string()))
    }
}

#[tokio::test]
async fn unavailable_store_degrades_to_empty_results() {
    let retriever = Retriever::new(
        Arc::new(DownStore),
        Arc::new(MemoryCache::new(100)),
        RetrievalSettings::default(),
    );
    let query = SearchQuery::new("machine learning", SearchAlgorithm::Semantic);
    let results = retriever.search(&query).await.expect("should not error");
    assert!(results.is_empty());
}

struct SlowStore;

#[async_trait]
impl DocumentStore for SlowStore {
    async fn get_all_documents(&self) -> Result<Vec<Document>> {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        Ok(vec![])
    }
}

#[tokio::test(start_paused = true)]
async fn slow_store_surfaces_a_timeout_error() {
    let retriever = Retriever::new(
        Arc::new(SlowStore),
        Arc::new(MemoryCache::new(100)),
        RetrievalSettings::default(),
    );
    let query = SearchQuery::new("machine learning", SearchAlgorithm::Semantic);
    let err = retriever.search(&query).await.expect_err("should time out");
    assert!(err.is_timeout(), "got {:?}", err);
}

#[tokio::test]
async fn contextual_search_attaches_neighbour_window_and_boosts() {
    let mut chunks = Vec::new();
    for (i, text) in [
        "machine learning introduction and overview",
        "machine learning is a subset of AI",
        "training data quality matters for models",
    ]
    .iter()
    .enumerate()
    {
        let mut d = doc(&format!("guide:{}", i), "ML Guide", text);
        d.doc_id = "guide".to_string();
        d.position = i;
        d.total_chunks = 3;
        chunks.push(d);
    }
    let retriever = retriever_with(chunks);

    let plain = retriever
        .search(&SearchQuery::new("machine learning", SearchAlgorithm::Semantic))
        .await
        .expect("semantic");
    let contextual = retriever
        .search(&SearchQuery::new("machine learning", SearchAlgorithm::Contextual))
        .await
        .expect("contextual");

    assert!(!contextual.is_empty());
    let top = &contextual[0];
    assert_eq!(top.metadata.get("context_enhanced").map(String::as_str), Some("true"));
    let window = top.metadata.get("context_window").expect("window text");
    assert!(!window.is_empty());
    assert!(!window.contains(&top.content), "window holds neighbours, not the chunk itself");

    let plain_top = plain
        .iter()
        .find(|r| r.chunk_id == top.chunk_id)
        .expect("same chunk in semantic results");
    assert!(top.similarity_score >= plain_top.similarity_score);
    assert!(top.similarity_score <= 1.0);
}

#[tokio::test]
async fn fuzzy_matches_near_duplicate_text_only() {
    let docs = vec![
        doc("near", "Note", "machine learning basics"),
        doc("far", "Note", "completely unrelated gardening advice"),
    ];
    let retriever = retriever_with(docs);
    let query = SearchQuery::new("machine learning basic", SearchAlgorithm::Fuzzy)
        .with_threshold(0.0);
    let results = retriever.search(&query).await.expect("fuzzy");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk_id, "near");
}

#[tokio::test]
async fn metadata_filters_restrict_the_collection() {
    let mut tagged = doc("a", "Tagged", "machine learning content here");
    tagged.metadata.insert("lang".to_string(), "en".to_string());
    let untagged = doc("b", "Untagged", "machine learning content here as well");
    let retriever = retriever_with(vec![tagged, untagged]);

    let mut query = SearchQuery::new("machine learning", SearchAlgorithm::Semantic);
    query.filters.insert("lang".to_string(), "en".to_string());
    let results = retriever.search(&query).await.expect("filtered search");

    assert!(results.iter().all(|r| r.chunk_id == "a"));
}

#[tokio::test]
async fn search_knowledge_base_tool_returns_structured_json() {
    let retriever = retriever_with(ml_corpus());
    let args = serde_json::json!({"query": "machine learning", "top_k": 3});
    let output = ragline_retrieval::tools::service_tool_call(&retriever, "search_knowledge_base", &args)
        .await
        .expect("tool call");

    assert_eq!(output["query"], "machine learning");
    let results = output["results"].as_array().expect("results array");
    assert_eq!(output["num_results"].as_u64().expect("count") as usize, results.len());
    assert!(!results.is_empty());
    assert!(results[0]["similarity_score"].is_number());
}

#[tokio::test]
async fn hybrid_search_tool_honours_the_semantic_weight() {
    let retriever = retriever_with(ml_corpus());
    let args = serde_json::json!({"query": "machine learning", "semantic_weight": 0.9});
    let output = ragline_retrieval::tools::service_tool_call(&retriever, "hybrid_search", &args)
        .await
        .expect("tool call");

    assert_eq!(output["search_type"], "hybrid");
    assert!(output["results"].as_array().is_some());
}

#[tokio::test]
async fn unknown_tool_yields_an_error_payload_not_an_err() {
    let retriever = retriever_with(ml_corpus());
    let output = ragline_retrieval::tools::service_tool_call(
        &retriever,
        "levitate",
        &serde_json::json!({}),
    )
    .await
    .expect("payload, not Err");
    assert!(output["error"].as_str().expect("error message").contains("levitate"));
}

#[tokio::test]
async fn tool_call_without_a_query_reports_the_missing_argument() {
    let retriever = retriever_with(ml_corpus());
    let output = ragline_retrieval::tools::service_tool_call(
        &retriever,
        "search_knowledge_base",
        &serde_json::json!({"top_k": 2}),
    )
    .await
    .expect("payload, not Err");
    assert!(output["error"].as_str().expect("error message").contains("query"));
}

fn result(title: &str, content: &str) -> SearchResult {
    SearchResult {
        content: content.to_string(),
        title: title.to_string(),
        source: "test".to_string(),
        similarity_score: 0.9,
        confidence: 0.9,
        chunk_id: title.to_string(),
        document_id: title.to_string(),
        position: 0,
        search_algorithm: SearchAlgorithm::Semantic,
        metadata: Meta::new(),
    }
}

#[test]
fn context_assembly_never_exceeds_the_budget() {
    let long_body = vec!["word"; 400].join(" ");
    let results: Vec<SearchResult> = (0..10)
        .map(|i| result(&format!("Doc {}", i), &long_body))
        .collect();

    let budget = 2000;
    let context = build_context(&results, budget);
    assert!(
        estimate_tokens(&context) <= budget,
        "context used {} tokens for a budget of {}",
        estimate_tokens(&context),
        budget
    );
    // Entries past the boundary never appear.
    assert!(!context.contains("Doc 9"));
}

#[test]
fn context_assembly_truncates_only_the_final_entry() {
    let results = vec![
        result("First", &vec!["alpha"; 100].join(" ")),
        result("Second", &vec!["bravo"; 2000].join(" ")),
        result("Third", &vec!["charlie"; 100].join(" ")),
    ];
    let context = build_context(&results, 1000);
    assert!(context.contains("First"));
    assert!(context.contains("Second"));
    assert!(context.contains("..."), "overflowing entry is truncated");
    assert!(!context.contains("Third"), "nothing after the truncated entry");
}

#[test]
fn empty_results_produce_the_no_context_sentinel() {
    assert_eq!(build_context(&[], 1000), "No relevant context found.");
}
