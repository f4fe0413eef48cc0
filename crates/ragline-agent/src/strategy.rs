//! Strategy profiles: one fixed configuration per strategy type, defined at
//! process start and immutable thereafter.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use ragline_core::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    General,
    Analytical,
    Creative,
    Technical,
    Research,
    Summary,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::General,
        StrategyKind::Analytical,
        StrategyKind::Creative,
        StrategyKind::Technical,
        StrategyKind::Research,
        StrategyKind::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::General => "general",
            StrategyKind::Analytical => "analytical",
            StrategyKind::Creative => "creative",
            StrategyKind::Technical => "technical",
            StrategyKind::Research => "research",
            StrategyKind::Summary => "summary",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(StrategyKind::General),
            "analytical" => Ok(StrategyKind::Analytical),
            "creative" => Ok(StrategyKind::Creative),
            "technical" => Ok(StrategyKind::Technical),
            "research" => Ok(StrategyKind::Research),
            "summary" => Ok(StrategyKind::Summary),
            other => Err(Error::Operation(format!("unknown strategy type: {}", other))),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One profile per strategy type: model, prompt, budgets and the tool schema
/// list declared to the generation provider.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub tools: Vec<Value>,
    pub priority: u8,
}

const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

fn function_tool(name: &str, description: &str, properties: Value, required: Value) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": name,
            "description": description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        }
    })
}

pub fn search_knowledge_base_tool() -> Value {
    function_tool(
        "search_knowledge_base",
        "Search the knowledge base for relevant information",
        json!({
            "query": {"type": "string", "description": "Search query"},
            "top_k": {"type": "integer", "description": "Number of results"}
        }),
        json!(["query"]),
    )
}

pub fn hybrid_search_tool() -> Value {
    function_tool(
        "hybrid_search",
        "Perform hybrid search combining semantic and keyword search",
        json!({
            "query": {"type": "string", "description": "The search query"},
            "semantic_weight": {"type": "number", "description": "Weight for semantic search (0.0 to 1.0, default: 0.7)"}
        }),
        json!(["query"]),
    )
}

fn analytical_tools() -> Vec<Value> {
    vec![
        search_knowledge_base_tool(),
        function_tool(
            "compare_information",
            "Compare multiple pieces of information",
            json!({
                "items": {"type": "array", "items": {"type": "string"}},
                "criteria": {"type": "string", "description": "Comparison criteria"}
            }),
            json!(["items"]),
        ),
    ]
}

fn creative_tools() -> Vec<Value> {
    vec![
        search_knowledge_base_tool(),
        function_tool(
            "brainstorm_ideas",
            "Generate creative ideas based on input",
            json!({
                "topic": {"type": "string", "description": "Topic for brainstorming"},
                "num_ideas": {"type": "integer", "description": "Number of ideas to generate"}
            }),
            json!(["topic"]),
        ),
    ]
}

fn technical_tools() -> Vec<Value> {
    vec![
        search_knowledge_base_tool(),
        function_tool(
            "analyze_code",
            "Analyze and explain code",
            json!({
                "code": {"type": "string", "description": "Code to analyze"},
                "language": {"type": "string", "description": "Programming language"}
            }),
            json!(["code"]),
        ),
    ]
}

fn research_tools() -> Vec<Value> {
    vec![
        search_knowledge_base_tool(),
        function_tool(
            "synthesize_information",
            "Synthesize information from multiple sources",
            json!({
                "sources": {"type": "array", "items": {"type": "string"}},
                "focus": {"type": "string", "description": "Focus area for synthesis"}
            }),
            json!(["sources"]),
        ),
    ]
}

fn summary_tools() -> Vec<Value> {
    vec![
        search_knowledge_base_tool(),
        function_tool(
            "create_summary",
            "Create a summary of provided content",
            json!({
                "content": {"type": "string", "description": "Content to summarize"},
                "summary_type": {"type": "string", "description": "Type of summary (brief, detailed, executive)"}
            }),
            json!(["content"]),
        ),
    ]
}

/// The fixed strategy profiles. Prompts describe the specialisation; budgets
/// and temperatures differ per profile.
pub fn builtin_configs() -> HashMap<StrategyKind, StrategyConfig> {
    let mut configs = HashMap::new();

    configs.insert(
        StrategyKind::General,
        StrategyConfig {
            kind: StrategyKind::General,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: "You are a helpful AI assistant with access to a knowledge base. \
                Provide accurate, contextual responses based on retrieved information. \
                Search the knowledge base first, cite sources when using retrieved \
                information, be concise but comprehensive, and maintain a helpful and \
                professional tone."
                .to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            tools: vec![search_knowledge_base_tool(), hybrid_search_tool()],
            priority: 1,
        },
    );

    configs.insert(
        StrategyKind::Analytical,
        StrategyConfig {
            kind: StrategyKind::Analytical,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: "You are an analytical AI assistant specialized in data analysis, \
                comparisons, and logical reasoning. Break down complex problems into \
                components, provide step-by-step analysis, use quantitative reasoning when \
                possible, identify patterns and relationships, and present findings in a \
                structured manner."
                .to_string(),
            max_tokens: 3000,
            temperature: 0.3,
            tools: analytical_tools(),
            priority: 2,
        },
    );

    configs.insert(
        StrategyKind::Creative,
        StrategyConfig {
            kind: StrategyKind::Creative,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: "You are a creative AI assistant specialized in brainstorming, \
                ideation, and creative problem-solving. Generate multiple innovative ideas, \
                think outside conventional boundaries, combine concepts in novel ways, and \
                provide imaginative solutions."
                .to_string(),
            max_tokens: 2500,
            temperature: 0.9,
            tools: creative_tools(),
            priority: 3,
        },
    );

    configs.insert(
        StrategyKind::Technical,
        StrategyConfig {
            kind: StrategyKind::Technical,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: "You are a technical AI assistant specialized in technical \
                explanations, code analysis, and system design. Provide detailed technical \
                explanations with precise terminology, include relevant code examples when \
                appropriate, explain complex concepts step-by-step, and focus on accuracy."
                .to_string(),
            max_tokens: 3000,
            temperature: 0.2,
            tools: technical_tools(),
            priority: 2,
        },
    );

    configs.insert(
        StrategyKind::Research,
        StrategyConfig {
            kind: StrategyKind::Research,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: "You are a research AI assistant specialized in comprehensive \
                research and information gathering. Perform thorough information searches, \
                evaluate source credibility, synthesize information from multiple sources, \
                and present findings in an organized manner with citations."
                .to_string(),
            max_tokens: 4000,
            temperature: 0.4,
            tools: research_tools(),
            priority: 2,
        },
    );

    configs.insert(
        StrategyKind::Summary,
        StrategyConfig {
            kind: StrategyKind::Summary,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: "You are a summary AI assistant specialized in creating concise, \
                accurate summaries. Extract key points and main ideas, maintain accuracy and \
                completeness, use clear language, organize information logically, and \
                highlight important details."
                .to_string(),
            max_tokens: 1500,
            temperature: 0.3,
            tools: summary_tools(),
            priority: 1,
        },
    );

    configs
}
