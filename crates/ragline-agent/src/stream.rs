//! Streaming event vocabulary. Generation is modelled as a channel of
//! incremental chunks with a terminal completion or error event, so single-
//! and multi-strategy paths consume the same shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Start {
        strategy: String,
        complexity: String,
        confidence: f32,
    },
    Chunk {
        content: String,
    },
    ToolCall {
        name: String,
        arguments: serde_json::Value,
    },
    ToolResult {
        name: String,
        output: serde_json::Value,
    },
    Complete {
        response: String,
        response_time_ms: u64,
    },
    Error {
        message: String,
    },
    Heartbeat,
}
