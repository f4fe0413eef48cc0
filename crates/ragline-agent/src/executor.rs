//! Strategy execution: retrieval-backed prompt assembly around the opaque
//! generation provider, with bounded calls and a context-only rendering used
//! by the fallback chain.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ragline_core::config::OrchestratorSettings;
use ragline_core::error::{Error, Result};
use ragline_core::traits::Generator;
use ragline_core::types::{SearchQuery, SearchResult};
use ragline_retrieval::context::{build_context, NO_CONTEXT};
use ragline_retrieval::{tools, Retriever};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::classify::QueryAnalysis;
use crate::strategy::{StrategyConfig, StrategyKind};
use crate::stream::StreamEvent;

const CONTEXT_SNIPPET_CHARS: usize = 200;
const STREAM_CHUNK_WORDS: usize = 24;

pub struct StrategyExecutor {
    config: StrategyConfig,
    retriever: Arc<Retriever>,
    generator: Arc<dyn Generator>,
    settings: OrchestratorSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyResponse {
    pub response: String,
    pub strategy: StrategyKind,
    pub context: Vec<SearchResult>,
    /// "generator" for provider-backed answers, "context_only" for the
    /// deterministic tier.
    pub source: String,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StrategyExecutor {
    pub fn new(
        config: StrategyConfig,
        retriever: Arc<Retriever>,
        generator: Arc<dyn Generator>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self { config, retriever, generator, settings }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Retrieve context, assemble the prompt and run the bounded generation
    /// call. A generation overrun surfaces as `Error::Timeout`.
    pub async fn execute(&self, search: &SearchQuery) -> Result<StrategyResponse> {
        let started = Instant::now();
        let (context_text, results) = self.retrieve_context(search).await;
        let prompt = build_prompt(&search.text, &context_text);

        let deadline = Duration::from_secs(self.settings.generation_timeout_secs);
        let generated = tokio::time::timeout(
            deadline,
            self.generator.generate(
                &self.config.system_prompt,
                &prompt,
                self.config.max_tokens,
                self.config.temperature,
            ),
        )
        .await;

        match generated {
            Err(_) => Err(Error::Timeout(format!("{} strategy generation", self.config.kind))),
            Ok(Err(e)) => Err(e),
            Ok(Ok(text)) => Ok(StrategyResponse {
                response: text,
                strategy: self.config.kind,
                context: results,
                source: "generator".to_string(),
                response_time_ms: started.elapsed().as_millis() as u64,
                note: None,
            }),
        }
    }

    /// Deterministic response rendered directly from retrieved context. The
    /// terminal tier of the fallback chain; never fails.
    pub async fn respond_from_context(&self, search: &SearchQuery) -> StrategyResponse {
        let started = Instant::now();
        let (_, results) = self.retrieve_context(search).await;
        let response = render_context_answer(&search.text, &results);
        StrategyResponse {
            response,
            strategy: self.config.kind,
            context: results,
            source: "context_only".to_string(),
            response_time_ms: started.elapsed().as_millis() as u64,
            note: Some("no generation step ran".to_string()),
        }
    }

    /// Context retrieval degrades rather than failing the strategy: a store
    /// timeout or outage yields the no-context sentinel.
    async fn retrieve_context(&self, search: &SearchQuery) -> (String, Vec<SearchResult>) {
        match self.retriever.search(search).await {
            Ok(results) => {
                let budget = self.retriever.settings().max_context_tokens;
                let text = build_context(&results, budget);
                (text, results)
            }
            Err(e) => {
                tracing::warn!(strategy = %self.config.kind, "context retrieval failed: {}", e);
                (NO_CONTEXT.to_string(), vec![])
            }
        }
    }

    /// Service a provider tool call against the retrieval coordinator.
    pub async fn service_tool(&self, name: &str, arguments: &Value) -> Result<Value> {
        tools::service_tool_call(&self.retriever, name, arguments).await
    }

    /// Streaming execution: a Start event with routing metadata, the answer
    /// re-chunked into increments, then a terminal Complete or Error. The
    /// heartbeat task is aborted before the channel closes; it never
    /// outlives the operation.
    pub fn execute_stream(
        self: Arc<Self>,
        search: SearchQuery,
        analysis: QueryAnalysis,
    ) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(32);
        let heartbeat_secs = self.settings.heartbeat_interval_secs.max(1);

        tokio::spawn(async move {
            let _ = tx
                .send(StreamEvent::Start {
                    strategy: self.config.kind.to_string(),
                    complexity: analysis.complexity.as_str().to_string(),
                    confidence: analysis.confidence,
                })
                .await;

            let heartbeat = tokio::spawn({
                let tx = tx.clone();
                async move {
                    let mut interval =
                        tokio::time::interval(Duration::from_secs(heartbeat_secs));
                    interval.tick().await; // the first tick fires immediately
                    loop {
                        interval.tick().await;
                        if tx.send(StreamEvent::Heartbeat).await.is_err() {
                            break;
                        }
                    }
                }
            });

            match self.execute(&search).await {
                Ok(resp) => {
                    for chunk in rechunk(&resp.response) {
                        if tx.send(StreamEvent::Chunk { content: chunk }).await.is_err() {
                            break;
                        }
                    }
                    let _ = tx
                        .send(StreamEvent::Complete {
                            response: resp.response,
                            response_time_ms: resp.response_time_ms,
                        })
                        .await;
                }
                Err(e) => {
                    let _ = tx.send(StreamEvent::Error { message: e.to_string() }).await;
                }
            }
            heartbeat.abort();
        });

        rx
    }
}

fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "Context from knowledge base:\n{}\n\nQuestion: {}\n\nPlease provide a comprehensive answer based on the context above.",
        context, query
    )
}

fn render_context_answer(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!(
            "I don't have enough information to answer '{}'. Please add relevant documents to the knowledge base.",
            query
        );
    }
    let mut response = format!("Based on the available information regarding '{}':\n\n", query);
    for (i, result) in results.iter().take(3).enumerate() {
        let snippet: String = result.content.chars().take(CONTEXT_SNIPPET_CHARS).collect();
        let ellipsis = if result.content.chars().count() > CONTEXT_SNIPPET_CHARS {
            "..."
        } else {
            ""
        };
        response.push_str(&format!(
            "{}. **{}** (relevance: {:.2})\n   {}{}\n\n",
            i + 1,
            result.title,
            result.similarity_score,
            snippet,
            ellipsis
        ));
    }
    response.trim_end().to_string()
}

/// Split a full answer into word-bounded increments for the stream path.
fn rechunk(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(STREAM_CHUNK_WORDS)
        .map(|chunk| chunk.join(" "))
        .collect()
}
