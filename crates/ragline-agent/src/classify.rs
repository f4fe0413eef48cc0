//! Deterministic keyword-based query classification. Same input always
//! yields the same analysis; no state, no side effects.

use serde::{Deserialize, Serialize};

use crate::strategy::StrategyKind;

/// Ordered complexity levels. The keyword classifier assigns Simple,
/// Moderate, Complex and Expert; Medium and VeryComplex sit between them for
/// callers that grade complexity by other signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryComplexity {
    Simple,
    Medium,
    Moderate,
    Complex,
    VeryComplex,
    Expert,
}

impl QueryComplexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryComplexity::Simple => "simple",
            QueryComplexity::Medium => "medium",
            QueryComplexity::Moderate => "moderate",
            QueryComplexity::Complex => "complex",
            QueryComplexity::VeryComplex => "very_complex",
            QueryComplexity::Expert => "expert",
        }
    }

    /// Complex and above are candidates for multi-strategy coordination.
    pub fn warrants_coordination(&self) -> bool {
        *self >= QueryComplexity::Complex
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub complexity: QueryComplexity,
    pub strategy: StrategyKind,
    pub confidence: f32,
    pub reasoning: String,
    pub estimated_tokens: usize,
}

const SIMPLE_INDICATORS: &[&str] = &["what", "when", "where", "who", "how", "define", "explain"];
const MODERATE_INDICATORS: &[&str] = &["compare", "describe", "list", "outline", "summarize"];
const COMPLEX_INDICATORS: &[&str] = &["analyze", "evaluate", "investigate", "examine", "assess"];
const EXPERT_INDICATORS: &[&str] = &["design", "optimize", "implement", "architect", "strategize"];

const STRATEGY_INDICATORS: &[(StrategyKind, &[&str])] = &[
    (StrategyKind::Analytical, &["analyze", "compare", "evaluate", "calculate", "statistics", "data"]),
    (StrategyKind::Creative, &["creative", "innovative", "brainstorm", "ideas", "design", "concept"]),
    (StrategyKind::Technical, &["code", "programming", "technical", "system", "architecture", "implementation"]),
    (StrategyKind::Research, &["research", "investigate", "study", "comprehensive", "thorough"]),
    (StrategyKind::Summary, &["summarize", "summary", "brief", "overview", "executive"]),
];

/// Classify a query: complexity by the first matching keyword family in
/// priority order, strategy by the family with the most indicator hits
/// (general on zero hits or a tie).
pub fn analyze(query: &str) -> QueryAnalysis {
    let query_lower = query.to_lowercase();

    let families: [(QueryComplexity, &[&str]); 4] = [
        (QueryComplexity::Simple, SIMPLE_INDICATORS),
        (QueryComplexity::Moderate, MODERATE_INDICATORS),
        (QueryComplexity::Complex, COMPLEX_INDICATORS),
        (QueryComplexity::Expert, EXPERT_INDICATORS),
    ];
    let complexity = families
        .iter()
        .find(|(_, indicators)| indicators.iter().any(|i| query_lower.contains(i)))
        .map(|(c, _)| *c)
        .unwrap_or(QueryComplexity::Simple);

    let mut strategy = StrategyKind::General;
    let mut max_hits = 0usize;
    for (kind, indicators) in STRATEGY_INDICATORS {
        let hits = indicators.iter().filter(|i| query_lower.contains(*i)).count();
        if hits > max_hits {
            max_hits = hits;
            strategy = *kind;
        }
    }

    let estimated_tokens = (query.split_whitespace().count() as f32 * 1.5) as usize;

    QueryAnalysis {
        complexity,
        strategy,
        confidence: (max_hits as f32 / 3.0 + 0.3).min(0.9),
        reasoning: format!(
            "Query complexity: {}, strategy type: {}",
            complexity.as_str(),
            strategy.as_str()
        ),
        estimated_tokens,
    }
}
