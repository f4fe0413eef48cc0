use std::sync::Arc;

use async_trait::async_trait;
use ragline_agent::classify::analyze;
use ragline_agent::orchestrator::Orchestrator;
use ragline_agent::strategy::StrategyKind;
use ragline_agent::stream::StreamEvent;
use ragline_agent::surface::{QueryRequest, ResponseStatus, StrategyOutcome};
use ragline_core::config::{OrchestratorSettings, RetrievalSettings};
use ragline_core::error::{Error, Result};
use ragline_core::traits::Generator;
use ragline_core::types::{Document, Meta, SearchAlgorithm, SearchQuery};
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

fn corpus() -> Vec<Document> {
    vec![
        doc("ml", "ML Basics", "Machine learning is a subset of AI"),
        doc("nn", "Neural Networks", "Deep learning uses neural networks for machine learning"),
    ]
}

/// Succeeds unless the strategy's system prompt contains a failure marker.
struct ScriptedGenerator {
    fail_markers: Vec<&'static str>,
}

impl ScriptedGenerator {
    fn ok() -> Arc<Self> {
        Arc::new(Self { fail_markers: vec![] })
    }

    fn failing_on(markers: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self { fail_markers: markers })
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String> {
        if self.fail_markers.iter().any(|m| system_prompt.contains(m)) {
            return Err(Error::Generation("scripted failure".to_string()));
        }
        Ok("a generated answer grounded in the supplied context".to_string())
    }
}

struct NeverGenerator;

#[async_trait]
impl Generator for NeverGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        Ok(String::new())
    }
}

fn orchestrator_with(generator: Arc<dyn Generator>) -> Orchestrator {
    let retriever = Arc::new(Retriever::new(
        Arc::new(MemoryStore::new(corpus())),
        Arc::new(MemoryCache::new(100)),
        RetrievalSettings::default(),
    ));
    Orchestrator::new(retriever, generator, OrchestratorSettings::default())
}

#[tokio::test]
async fn single_strategy_execution_attaches_routing_metadata() {
    let orchestrator = orchestrator_with(ScriptedGenerator::ok());
    let request = QueryRequest::new("what is machine learning?");
    let response = orchestrator.execute_query(&request).await.expect("execute");

    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.strategy_used, "general");
    assert_eq!(response.complexity, "simple");
    assert_eq!(response.algorithm, "hybrid");
    assert!(!response.response.is_empty());
    assert!(!response.context.is_empty(), "retrieved context rides along");
}

#[tokio::test]
async fn forced_strategy_overrides_classification() {
    let orchestrator = orchestrator_with(ScriptedGenerator::ok());
    let mut request = QueryRequest::new("what is machine learning?");
    request.force_strategy = Some("summary".to_string());
    let response = orchestrator.execute_query(&request).await.expect("execute");
    assert_eq!(response.strategy_used, "summary");
}

#[tokio::test]
async fn bad_algorithm_name_is_a_validation_error() {
    let orchestrator = orchestrator_with(ScriptedGenerator::ok());
    let mut request = QueryRequest::new("anything");
    request.algorithm = Some("cosine".to_string());
    let err = orchestrator.execute_query(&request).await.expect_err("must reject");
    assert!(matches!(err, Error::InvalidAlgorithm(_)));
}

#[tokio::test]
async fn bad_strategy_name_is_a_validation_error() {
    let orchestrator = orchestrator_with(ScriptedGenerator::ok());
    let mut request = QueryRequest::new("anything");
    request.force_strategy = Some("psychic".to_string());
    assert!(orchestrator.execute_query(&request).await.is_err());
}

#[tokio::test]
async fn failed_primary_falls_back_to_general() {
    let orchestrator =
        orchestrator_with(ScriptedGenerator::failing_on(vec!["technical AI assistant"]));
    let mut request = QueryRequest::new("what is machine learning?");
    request.force_strategy = Some("technical".to_string());
    let response = orchestrator.execute_query(&request).await.expect("execute");

    assert_eq!(response.status, ResponseStatus::Degraded);
    assert_eq!(response.strategy_used, "general");
    let note = response.note.expect("note explains the fallback");
    assert!(note.contains("technical"), "note was: {}", note);
}

#[tokio::test]
async fn fully_failed_chain_ends_in_a_context_only_response() {
    let orchestrator = orchestrator_with(ScriptedGenerator::failing_on(vec!["AI assistant"]));
    let request = QueryRequest::new("what is machine learning?");
    let response = orchestrator.execute_query(&request).await.expect("never an error");

    assert_eq!(response.status, ResponseStatus::Degraded);
    assert!(response.response.starts_with("Based on the available information"));
    let note = response.note.expect("note present");
    assert!(note.contains("no generation step ran"), "note was: {}", note);
}

#[tokio::test(start_paused = true)]
async fn generation_overrun_surfaces_as_timeout_in_the_note() {
    let orchestrator = orchestrator_with(Arc::new(NeverGenerator));
    let request = QueryRequest::new("what is machine learning?");
    let response = orchestrator.execute_query(&request).await.expect("degrades, not errors");

    assert_eq!(response.status, ResponseStatus::Degraded);
    let note = response.note.expect("note present");
    assert!(note.contains("Timed out"), "note was: {}", note);
}

#[tokio::test]
async fn coordination_synthesises_the_survivors() {
    let orchestrator =
        orchestrator_with(ScriptedGenerator::failing_on(vec!["analytical AI assistant"]));
    let request = QueryRequest::new("what is machine learning?");
    let kinds = vec![StrategyKind::Research, StrategyKind::Analytical, StrategyKind::General];
    let response = orchestrator
        .coordinate(&request, Some(kinds))
        .await
        .expect("coordinate");

    assert_eq!(response.status, ResponseStatus::Success);
    assert!(response.response.contains("**RESEARCH PERSPECTIVE:**"));
    assert!(response.response.contains("**GENERAL PERSPECTIVE:**"));
    assert!(!response.response.contains("**ANALYTICAL PERSPECTIVE:**"));

    let per_strategy = response.per_strategy_results.expect("per-strategy map");
    assert_eq!(per_strategy.len(), 3);
    assert!(matches!(per_strategy.get("analytical"), Some(StrategyOutcome::Error { .. })));
    assert!(matches!(per_strategy.get("research"), Some(StrategyOutcome::Success { .. })));
}

#[tokio::test]
async fn coordination_with_every_strategy_failing_is_a_structured_error() {
    let orchestrator = orchestrator_with(ScriptedGenerator::failing_on(vec!["AI assistant"]));
    let request = QueryRequest::new("what is machine learning?");
    let kinds = vec![StrategyKind::Research, StrategyKind::Analytical, StrategyKind::General];
    let response = orchestrator
        .coordinate(&request, Some(kinds))
        .await
        .expect("structured result, not an Err");

    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(response.response, "All strategies failed to process the query.");
    let per_strategy = response.per_strategy_results.expect("per-strategy map");
    assert_eq!(per_strategy.len(), 3);
    assert!(per_strategy
        .values()
        .all(|o| matches!(o, StrategyOutcome::Error { .. })));
}

#[tokio::test]
async fn complex_queries_auto_select_the_coordination_trio() {
    let orchestrator = orchestrator_with(ScriptedGenerator::ok());
    let request = QueryRequest::new("evaluate the architectural trade-offs of both approaches");
    let response = orchestrator.coordinate(&request, None).await.expect("coordinate");

    let per_strategy = response.per_strategy_results.expect("per-strategy map");
    let mut kinds: Vec<&str> = per_strategy.keys().map(String::as_str).collect();
    kinds.sort_unstable();
    assert_eq!(kinds, vec!["analytical", "general", "research"]);
}

#[tokio::test]
async fn simple_queries_coordinate_with_a_single_strategy() {
    let orchestrator = orchestrator_with(ScriptedGenerator::ok());
    let request = QueryRequest::new("what is machine learning?");
    let response = orchestrator.coordinate(&request, None).await.expect("coordinate");

    let per_strategy = response.per_strategy_results.expect("per-strategy map");
    assert_eq!(per_strategy.len(), 1);
}

#[tokio::test]
async fn streaming_emits_start_then_terminal_complete() {
    let orchestrator = orchestrator_with(ScriptedGenerator::ok());
    let executor = orchestrator.registry().get_or_create(StrategyKind::General);
    let search = SearchQuery::new("what is machine learning?", SearchAlgorithm::Hybrid);
    let analysis = analyze("what is machine learning?");

    let mut rx = executor.execute_stream(search, analysis);
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(StreamEvent::Start { .. })));
    assert!(matches!(events.last(), Some(StreamEvent::Complete { .. })));
    assert!(events.iter().any(|e| matches!(e, StreamEvent::Chunk { .. })));
}

#[tokio::test]
async fn streaming_failures_end_with_an_error_event() {
    let orchestrator = orchestrator_with(ScriptedGenerator::failing_on(vec!["AI assistant"]));
    let executor = orchestrator.registry().get_or_create(StrategyKind::General);
    let search = SearchQuery::new("what is machine learning?", SearchAlgorithm::Hybrid);
    let analysis = analyze("what is machine learning?");

    let mut rx = executor.execute_stream(search, analysis);
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert!(matches!(events.last(), Some(StreamEvent::Error { .. })));
}

#[tokio::test]
async fn health_check_reports_instantiated_strategies() {
    let orchestrator = orchestrator_with(ScriptedGenerator::ok());
    let request = QueryRequest::new("what is machine learning?");
    orchestrator.execute_query(&request).await.expect("execute");

    let report = orchestrator.health_check();
    assert_eq!(report.overall_status, "healthy");
    assert!(report.total_strategies >= 1);
    let general = report.strategies.get("general").expect("general instantiated");
    assert_eq!(general.status, "healthy");
    assert!(general.tools_count >= 1);
}
