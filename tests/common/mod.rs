//! Shared test helpers and mock backend.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use agentkit::backend::{Backend, BackendRequest, BackendTurn, RawToolCall};
use agentkit::error::AgentError;
use agentkit::executor::ExecutorConfig;
use agentkit::tools::{Tool, ToolDescriptor, ToolSchema};
use agentkit::types::*;

/// What the backend was shown on one call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub turns: Vec<Turn>,
    pub tool_names: Vec<String>,
    pub sampling: SamplingParams,
}

/// A mock backend that replays queued replies and records every request.
#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<Vec<Result<BackendTurn, AgentError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue(&self, turn: BackendTurn) {
        self.replies.lock().unwrap().push(Ok(turn));
    }

    /// Queue a text reply.
    pub fn queue_text(&self, text: &str) {
        self.queue(BackendTurn::text(text).with_usage(UsageStats::new(10, 20)));
    }

    /// Queue a single-call tool reply.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: &str) {
        self.queue_tool_calls(&[(id, name, args)]);
    }

    pub fn queue_tool_calls(&self, calls: &[(&str, &str, &str)]) {
        let raw = calls
            .iter()
            .map(|(id, name, args)| RawToolCall::function(*id, *name, *args))
            .collect();
        self.queue(BackendTurn::tool_calls(raw).with_usage(UsageStats::new(10, 5)));
    }

    pub fn queue_error(&self, error: AgentError) {
        self.replies.lock().unwrap().push(Err(error));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: BackendRequest<'_>) -> Result<BackendTurn, AgentError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            turns: request.turns.to_vec(),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
            sampling: request.sampling.clone(),
        });

        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(AgentError::backend("mock", "no reply queued"));
        }
        replies.remove(0)
    }
}

/// Config with a fixed system prompt so histories are predictable.
pub fn test_config() -> ExecutorConfig {
    ExecutorConfig::builder()
        .system_message("You are a test assistant.".to_string())
        .stamp_datetime(false)
        .build()
}

pub fn weather_tool() -> Arc<dyn Tool> {
    ToolDescriptor::new(
        "get_weather",
        "Current weather for a city",
        ToolSchema::object().string("city", "City name", true).build(),
        |args| Ok(format!("18C sunny in {}", args.get_str("city")?).into()),
    )
    .shared()
}

pub fn add_tool() -> Arc<dyn Tool> {
    ToolDescriptor::new(
        "add",
        "Add two integers",
        ToolSchema::object()
            .integer("a", "Left operand", true)
            .integer("b", "Right operand", true)
            .build(),
        |args| Ok(serde_json::json!(args.get_i64("a")? + args.get_i64("b")?)),
    )
    .shared()
}

pub fn roles(turns: &[Turn]) -> Vec<Role> {
    turns.iter().map(|t| t.role).collect()
}
