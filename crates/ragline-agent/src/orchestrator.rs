//! Routing and coordination: classify a query, run one strategy (with a
//! fallback chain that always terminates in a response) or fan several out
//! concurrently and synthesise the survivors.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use ragline_core::config::OrchestratorSettings;
use ragline_core::error::{Error, Result};
use ragline_core::traits::Generator;
use ragline_core::types::{SearchQuery, SearchResult};
use ragline_retrieval::Retriever;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::classify::{analyze, QueryAnalysis};
use crate::executor::StrategyResponse;
use crate::optimize::optimize_query;
use crate::registry::StrategyRegistry;
use crate::strategy::StrategyKind;
use crate::surface::{QueryRequest, QueryResponse, ResponseStatus, StrategyOutcome};

pub struct Orchestrator {
    registry: Arc<StrategyRegistry>,
    settings: OrchestratorSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyHealth {
    pub status: String,
    pub model: String,
    pub tools_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub overall_status: String,
    pub strategies: HashMap<String, StrategyHealth>,
    pub total_strategies: usize,
}

impl Orchestrator {
    pub fn new(
        retriever: Arc<Retriever>,
        generator: Arc<dyn Generator>,
        settings: OrchestratorSettings,
    ) -> Self {
        let registry = StrategyRegistry::new(retriever, generator, settings.clone());
        Self { registry: Arc::new(registry), settings }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Single-strategy path. Validation errors surface; execution failures
    /// walk the fallback chain (primary → general → context-only), so a
    /// valid request always gets a response.
    pub async fn execute_query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let started = Instant::now();
        let (mut search, force) = request.validate()?;
        search.text = optimize_query(&search.text);
        let analysis = analyze(&search.text);
        let kind = force.unwrap_or(analysis.strategy);

        let executor = self.registry.get_or_create(kind);
        match executor.execute(&search).await {
            Ok(resp) => Ok(compose(resp, &analysis, &search, ResponseStatus::Success, None, started)),
            Err(primary) => {
                tracing::warn!("{} strategy failed: {}", kind, primary);
                let chain_note = format!("primary strategy {} failed: {}", kind, primary);

                if kind != StrategyKind::General {
                    let general = self.registry.get_or_create(StrategyKind::General);
                    match general.execute(&search).await {
                        Ok(resp) => {
                            return Ok(compose(
                                resp,
                                &analysis,
                                &search,
                                ResponseStatus::Degraded,
                                Some(chain_note),
                                started,
                            ));
                        }
                        Err(e) => tracing::warn!("general fallback failed: {}", e),
                    }
                }

                let resp = executor.respond_from_context(&search).await;
                Ok(compose(
                    resp,
                    &analysis,
                    &search,
                    ResponseStatus::Degraded,
                    Some(chain_note),
                    started,
                ))
            }
        }
    }

    /// Multi-strategy coordination. Every selected strategy runs as its own
    /// task under the concurrency cap; a failing strategy contributes an
    /// error entry instead of aborting the others. Dropping the returned
    /// future aborts all in-flight strategy tasks.
    pub async fn coordinate(
        &self,
        request: &QueryRequest,
        strategy_kinds: Option<Vec<StrategyKind>>,
    ) -> Result<QueryResponse> {
        let started = Instant::now();
        let (mut search, force) = request.validate()?;
        search.text = optimize_query(&search.text);
        let analysis = analyze(&search.text);

        let selected = match strategy_kinds {
            Some(kinds) if !kinds.is_empty() => kinds,
            _ => {
                if analysis.complexity.warrants_coordination() {
                    vec![StrategyKind::Research, StrategyKind::Analytical, StrategyKind::General]
                } else {
                    vec![force.unwrap_or(analysis.strategy)]
                }
            }
        };

        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrent_strategies.max(1)));
        let mut join_set: JoinSet<(StrategyKind, Result<StrategyResponse>)> = JoinSet::new();
        for kind in selected.iter().copied() {
            let executor = self.registry.get_or_create(kind);
            let semaphore = semaphore.clone();
            let search = search.clone();
            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (kind, Err(Error::Operation("coordination cancelled".to_string()))),
                };
                (kind, executor.execute(&search).await)
            });
        }

        let mut outcomes: HashMap<StrategyKind, StrategyOutcome> = HashMap::new();
        let mut context: Vec<SearchResult> = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((kind, Ok(resp))) => {
                    if context.is_empty() {
                        context = resp.context.clone();
                    }
                    outcomes.insert(
                        kind,
                        StrategyOutcome::Success {
                            response: resp.response,
                            response_time_ms: resp.response_time_ms,
                        },
                    );
                }
                Ok((kind, Err(e))) => {
                    tracing::warn!("{} strategy failed during coordination: {}", kind, e);
                    outcomes.insert(kind, StrategyOutcome::Error { error: e.to_string() });
                }
                Err(e) => {
                    tracing::warn!("strategy task did not complete: {}", e);
                }
            }
        }

        // Synthesis walks the selection order so the output is deterministic.
        let mut sections: Vec<String> = Vec::new();
        for kind in &selected {
            if let Some(StrategyOutcome::Success { response, .. }) = outcomes.get(kind) {
                sections.push(format!(
                    "**{} PERSPECTIVE:**\n{}",
                    kind.as_str().to_uppercase(),
                    response
                ));
            }
        }

        let per_strategy: HashMap<String, StrategyOutcome> = outcomes
            .into_iter()
            .map(|(kind, outcome)| (kind.as_str().to_string(), outcome))
            .collect();

        if sections.is_empty() {
            let error = Error::AllStrategiesFailed(format!("{} strategies attempted", selected.len()));
            return Ok(QueryResponse {
                response: "All strategies failed to process the query.".to_string(),
                context: vec![],
                algorithm: search.algorithm.as_str().to_string(),
                strategy_used: "coordinated".to_string(),
                complexity: analysis.complexity.as_str().to_string(),
                confidence: analysis.confidence,
                status: ResponseStatus::Error,
                response_time_ms: started.elapsed().as_millis() as u64,
                per_strategy_results: Some(per_strategy),
                note: Some(error.to_string()),
            });
        }

        Ok(QueryResponse {
            response: sections.join("\n\n"),
            context,
            algorithm: search.algorithm.as_str().to_string(),
            strategy_used: "coordinated".to_string(),
            complexity: analysis.complexity.as_str().to_string(),
            confidence: analysis.confidence,
            status: ResponseStatus::Success,
            response_time_ms: started.elapsed().as_millis() as u64,
            per_strategy_results: Some(per_strategy),
            note: None,
        })
    }

    /// Structural health of the instantiated strategies.
    pub fn health_check(&self) -> HealthReport {
        let mut strategies = HashMap::new();
        for kind in self.registry.instantiated() {
            if let Some(config) = self.registry.config_for(kind) {
                strategies.insert(
                    kind.as_str().to_string(),
                    StrategyHealth {
                        status: "healthy".to_string(),
                        model: config.model.clone(),
                        tools_count: config.tools.len(),
                    },
                );
            }
        }
        let overall = if strategies.values().all(|s| s.status == "healthy") {
            "healthy"
        } else {
            "degraded"
        };
        HealthReport {
            overall_status: overall.to_string(),
            total_strategies: strategies.len(),
            strategies,
        }
    }
}

fn compose(
    resp: StrategyResponse,
    analysis: &QueryAnalysis,
    search: &SearchQuery,
    status: ResponseStatus,
    chain_note: Option<String>,
    started: Instant,
) -> QueryResponse {
    let note = match (chain_note, resp.note) {
        (Some(a), Some(b)) => Some(format!("{}; {}", a, b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    };
    QueryResponse {
        response: resp.response,
        context: resp.context,
        algorithm: search.algorithm.as_str().to_string(),
        strategy_used: resp.strategy.as_str().to_string(),
        complexity: analysis.complexity.as_str().to_string(),
        confidence: analysis.confidence,
        status,
        response_time_ms: started.elapsed().as_millis() as u64,
        per_strategy_results: None,
        note,
    }
}
