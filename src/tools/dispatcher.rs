//! Turn backend tool-call requests into tool results.
//!
//! Dispatch never fails as a whole: unknown tools, undecodable arguments,
//! schema violations, handler errors and handler panics all become error
//! results, one per request, in request order.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::{Deserialize, Serialize};

use super::arguments::ToolArguments;
use super::registry::ToolRegistry;
use super::validation::validate_arguments;
use crate::backend::{BackendTurn, RawToolCall};
use crate::error::{AgentError, Result};
use crate::types::{ToolCallRequest, ToolCallResult};

/// How the calls of one round are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// One after another, in request order.
    #[default]
    Sequential,
    /// Each call runs as its own tokio task; results are still reported in
    /// request order. Synchronous handlers only overlap on a multi-threaded
    /// runtime. Calls already spawned keep running if the dispatch is dropped.
    Concurrent,
}

/// Results of dispatching one round of calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub results: Vec<ToolCallResult>,
    /// Notification extracted from each call's arguments, aligned with `results`.
    pub notifications: Vec<Option<serde_json::Value>>,
}

impl DispatchReport {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }
}

/// Dispatches tool calls against a registry.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    mode: DispatchMode,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, mode: DispatchMode) -> Self {
        Self { registry, mode }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Swap the registry used for subsequent dispatches.
    pub fn rebind(&mut self, registry: Arc<ToolRegistry>) {
        self.registry = registry;
    }

    /// Normalize the raw calls of a backend turn.
    ///
    /// A call without an id or a name, or an id used twice in the same turn,
    /// means the reply is malformed.
    pub fn parse_calls(turn: &BackendTurn) -> Result<Vec<ToolCallRequest>> {
        let mut seen = HashSet::with_capacity(turn.tool_calls_raw.len());
        turn.tool_calls_raw
            .iter()
            .enumerate()
            .map(|(position, raw)| {
                let request = normalize(position, raw)?;
                if !seen.insert(request.id.clone()) {
                    return Err(AgentError::MalformedReply(format!(
                        "tool call id '{}' appears more than once",
                        request.id
                    )));
                }
                Ok(request)
            })
            .collect()
    }

    /// Run every request and collect results in request order.
    pub async fn dispatch(&self, requests: &[ToolCallRequest]) -> DispatchReport {
        let outcomes: Vec<(ToolCallResult, Option<serde_json::Value>)> = match self.mode {
            DispatchMode::Sequential => {
                let mut outcomes = Vec::with_capacity(requests.len());
                for request in requests {
                    outcomes.push(dispatch_call(Arc::clone(&self.registry), request.clone()).await);
                }
                outcomes
            }
            DispatchMode::Concurrent => {
                let handles = requests.iter().map(|request| {
                    tokio::spawn(dispatch_call(Arc::clone(&self.registry), request.clone()))
                });
                let joined = futures::future::join_all(handles).await;
                joined
                    .into_iter()
                    .zip(requests)
                    .map(|(outcome, request)| {
                        outcome.unwrap_or_else(|e| {
                            tracing::warn!(tool = %request.name, call_id = %request.id, error = %e, "tool task failed");
                            let message = format!("tool task failed: {e}");
                            (ToolCallResult::failure(request, message), None)
                        })
                    })
                    .collect()
            }
        };

        let (results, notifications) = outcomes.into_iter().unzip();
        DispatchReport {
            results,
            notifications,
        }
    }
}

/// Dispatch a single call. The notification is extracted before the tool is
/// looked up, so it is reported even for unknown tools.
async fn dispatch_call(
    registry: Arc<ToolRegistry>,
    request: ToolCallRequest,
) -> (ToolCallResult, Option<serde_json::Value>) {
    let decoded = ToolArguments::decode(&request.raw_arguments);
    let notification = decoded
        .as_ref()
        .ok()
        .and_then(|decoded| decoded.notification.clone());

    let Some(tool) = registry.get(&request.name) else {
        tracing::warn!(tool = %request.name, call_id = %request.id, "unknown tool requested");
        return (ToolCallResult::failure(&request, "unknown tool"), notification);
    };

    let args = match decoded {
        Ok(decoded) => decoded.arguments,
        Err(e) => {
            tracing::warn!(tool = %request.name, call_id = %request.id, error = %e, "tool arguments rejected");
            return (ToolCallResult::failure(&request, invalid_message(e)), None);
        }
    };

    if let Err(message) = validate_arguments(args.raw(), &tool.schema().schema) {
        tracing::warn!(tool = %request.name, call_id = %request.id, error = %message, "tool arguments failed validation");
        return (
            ToolCallResult::failure(&request, format!("invalid arguments: {message}")),
            notification,
        );
    }

    let outcome = AssertUnwindSafe(tool.call(&args)).catch_unwind().await;
    let result = match outcome {
        Ok(Ok(value)) => ToolCallResult::success(&request, value),
        Ok(Err(e)) => {
            tracing::warn!(tool = %request.name, call_id = %request.id, error = %e, "tool failed");
            ToolCallResult::failure(&request, handler_message(e))
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::warn!(tool = %request.name, call_id = %request.id, panic = %message, "tool panicked");
            ToolCallResult::failure(&request, format!("tool panicked: {message}"))
        }
    };
    (result, notification)
}

fn normalize(position: usize, raw: &RawToolCall) -> Result<ToolCallRequest> {
    let id = raw
        .id()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AgentError::MalformedReply(format!("tool call {position} has no id")))?;
    let name = raw
        .name()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AgentError::MalformedReply(format!("tool call '{id}' has no name")))?;

    let raw_arguments = match raw.arguments() {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(encoded) => encoded.clone(),
        value => value.to_string(),
    };
    Ok(ToolCallRequest::new(id, name, raw_arguments))
}

fn invalid_message(error: AgentError) -> String {
    match error {
        AgentError::InvalidArgument(message) => message,
        other => other.to_string(),
    }
}

fn handler_message(error: AgentError) -> String {
    match error {
        AgentError::ToolExecution { message, .. } => message,
        AgentError::InvalidArgument(message) => message,
        other => other.to_string(),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
