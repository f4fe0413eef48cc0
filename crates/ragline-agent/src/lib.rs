//! ragline-agent
//!
//! Query classification, strategy configuration and orchestration. A query is
//! classified, routed to one specialised execution strategy (or fanned out to
//! several concurrently), and the answers are synthesised with a fallback
//! chain that always terminates in a response.

pub mod classify;
pub mod executor;
pub mod optimize;
pub mod orchestrator;
pub mod registry;
pub mod strategy;
pub mod stream;
pub mod surface;

pub use classify::{analyze, QueryAnalysis, QueryComplexity};
pub use executor::{StrategyExecutor, StrategyResponse};
pub use orchestrator::Orchestrator;
pub use registry::StrategyRegistry;
pub use strategy::{builtin_configs, StrategyConfig, StrategyKind};
pub use stream::StreamEvent;
pub use surface::{QueryRequest, QueryResponse, ResponseStatus, StrategyOutcome};
