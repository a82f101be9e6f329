//! The agent executor: generate, dispatch, append, repeat.

use std::sync::Arc;

use chrono::Local;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::ExecutorConfig;
use super::overrides::ExecuteOverrides;
use super::state::ExecutorState;
use crate::backend::{Backend, BackendRequest, BackendTurn, ToolDefinition};
use crate::context::Context;
use crate::error::{AgentError, Result};
use crate::tools::{Tool, ToolDispatcher, ToolRegistry};
use crate::types::{ResponseEvent, Role, SamplingParams, ToolCallRequest, Turn, UsageStats};
use crate::util::{with_timeout, UsageTracker};

/// Drives one conversation session against a backend and a tool registry.
///
/// The executor owns its [`Context`]. Every call to [`execute`](Self::execute)
/// appends the user turns, then alternates backend calls and tool dispatch
/// until the backend answers without requesting tools.
pub struct AgentExecutor {
    session_id: Uuid,
    backend: Arc<dyn Backend>,
    dispatcher: ToolDispatcher,
    tool_definitions: Vec<ToolDefinition>,
    context: Context,
    config: ExecutorConfig,
    state: ExecutorState,
    usage: UsageTracker,
}

impl AgentExecutor {
    /// Build an executor, validating the tool list.
    pub fn new(
        backend: Arc<dyn Backend>,
        tools: Vec<Arc<dyn Tool>>,
        config: ExecutorConfig,
    ) -> Result<Self> {
        let registry = Arc::new(ToolRegistry::new(tools)?);
        Ok(Self::with_registry(backend, registry, config))
    }

    /// Build an executor around an already validated registry.
    pub fn with_registry(
        backend: Arc<dyn Backend>,
        registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        let context = Context::new(config.render_system_prompt(Local::now()));
        Self::assemble(backend, registry, config, context)
    }

    /// Resume a session from an exported turn log.
    ///
    /// The first turn must be the system turn; it becomes the prompt that
    /// [`clear_history`](Self::clear_history) restores.
    pub fn resume(
        backend: Arc<dyn Backend>,
        registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
        turns: Vec<Turn>,
    ) -> Result<Self> {
        let context = Context::from_turns(turns)?;
        Ok(Self::assemble(backend, registry, config, context))
    }

    fn assemble(
        backend: Arc<dyn Backend>,
        registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
        context: Context,
    ) -> Self {
        let tool_definitions = registry.definitions();
        let dispatcher = ToolDispatcher::new(registry, config.dispatch_mode);
        let session_id = Uuid::new_v4();
        debug!(
            %session_id,
            backend = backend.name(),
            tools = tool_definitions.len(),
            "executor created"
        );
        Self {
            session_id,
            backend,
            dispatcher,
            tool_definitions,
            context,
            config,
            state: ExecutorState::AwaitingUser,
            usage: UsageTracker::new(),
        }
    }

    /// Run the loop for `user_turns`, yielding events as they happen.
    ///
    /// The stream is lazy: nothing happens until it is polled. Turns are
    /// committed to the context as the loop progresses, so dropping the
    /// stream early keeps everything appended so far. A backend failure is
    /// yielded as the last item. Only user turns are accepted; anything else
    /// fails with [`AgentError::InvalidArgument`] before the context changes.
    pub fn execute(&mut self, user_turns: Vec<Turn>) -> BoxStream<'_, Result<ResponseEvent>> {
        self.execute_with(user_turns, ExecuteOverrides::default())
    }

    /// [`execute`](Self::execute) with sampling or tools replaced for this
    /// call only.
    pub fn execute_with(
        &mut self,
        user_turns: Vec<Turn>,
        overrides: ExecuteOverrides,
    ) -> BoxStream<'_, Result<ResponseEvent>> {
        let this = self;
        Box::pin(async_stream::stream! {
            if !this.state.is_idle() {
                debug!(session_id = %this.session_id, state = %this.state, "previous execution was abandoned");
                this.state = ExecutorState::AwaitingUser;
            }
            if let Some(turn) = user_turns.iter().find(|turn| turn.role != Role::User) {
                let e = AgentError::InvalidArgument(format!(
                    "execute accepts only user turns, got role '{}'",
                    turn.role
                ));
                warn!(session_id = %this.session_id, error = %e, "input rejected");
                yield Err(e);
                return;
            }

            let sampling = this.config.sampling.merged_with(&overrides.sampling);
            let (dispatcher, tool_definitions) = match overrides.tools {
                Some(registry) => {
                    let definitions = registry.definitions();
                    (ToolDispatcher::new(registry, this.config.dispatch_mode), definitions)
                }
                None => (this.dispatcher.clone(), this.tool_definitions.clone()),
            };
            this.context.extend(user_turns);

            let mut round = 0;
            loop {
                round += 1;

                let turn = match this.generate_round(round, &sampling, &tool_definitions).await {
                    Ok(turn) => turn,
                    Err(e) => {
                        this.abort(round, &e);
                        yield Err(e);
                        return;
                    }
                };
                let calls = match ToolDispatcher::parse_calls(&turn) {
                    Ok(calls) => calls,
                    Err(e) => {
                        this.abort(round, &e);
                        yield Err(e);
                        return;
                    }
                };

                if calls.is_empty() {
                    yield Ok(this.finish(round, turn));
                    return;
                }

                yield Ok(this.record_tool_request(round, turn, calls.clone()));

                this.transition(ExecutorState::Dispatching);
                let report = dispatcher.dispatch(&calls).await;
                if report.failures() > 0 {
                    warn!(
                        session_id = %this.session_id,
                        round,
                        failures = report.failures(),
                        "tool calls reported errors"
                    );
                }

                this.transition(ExecutorState::AppendingResults);
                let tool_turns: Vec<Turn> = report
                    .results
                    .iter()
                    .map(|result| Turn::tool_result(result.tool_call_id.clone(), result.content_string()))
                    .collect();
                yield Ok(ResponseEvent::tool_results(round, report.results, report.notifications));
                this.context.extend(tool_turns);
            }
        })
    }

    /// Send one user message and wait for the final reply.
    pub async fn run(&mut self, user_text: impl Into<String>) -> Result<ResponseEvent> {
        let mut events = self.execute(vec![Turn::user(user_text)]);
        let mut last = None;
        while let Some(event) = events.next().await {
            let event = event?;
            if event.is_final {
                last = Some(event);
            }
        }
        last.ok_or_else(|| AgentError::MalformedReply("no final reply was produced".to_string()))
    }

    async fn generate_round(
        &mut self,
        round: usize,
        sampling: &SamplingParams,
        tools: &[ToolDefinition],
    ) -> Result<BackendTurn> {
        if let Some(max_rounds) = self.config.round_limit() {
            if round > max_rounds {
                return Err(AgentError::MaxRoundsExceeded { max_rounds });
            }
        }
        self.transition(ExecutorState::Generating);

        debug!(
            session_id = %self.session_id,
            round,
            turns = self.context.len(),
            "calling backend"
        );

        let backend: &dyn Backend = self.backend.as_ref();
        let request = BackendRequest {
            turns: self.context.snapshot(),
            tools,
            sampling,
        };
        let timeout = self.config.backend_timeout;
        let attempt = move || async move {
            match timeout {
                Some(duration) => with_timeout(duration, backend.generate(request)).await,
                None => backend.generate(request).await,
            }
        };
        let turn = match &self.config.retry {
            Some(policy) => policy.execute(attempt).await?,
            None => attempt().await?,
        };

        if turn.role != Role::Assistant {
            return Err(AgentError::MalformedReply(format!(
                "expected an assistant turn, got role '{}'",
                turn.role
            )));
        }
        if let Some(usage) = &turn.usage {
            self.usage.record(usage);
        }
        Ok(turn)
    }

    fn record_tool_request(
        &mut self,
        round: usize,
        turn: BackendTurn,
        calls: Vec<ToolCallRequest>,
    ) -> ResponseEvent {
        debug!(
            session_id = %self.session_id,
            round,
            tool_calls = calls.len(),
            "backend requested tools"
        );
        if turn.content.is_some() {
            self.context.append(Turn::assistant_content(turn.content.clone()));
        }
        self.context.append(Turn::assistant_tool_calls(calls.clone()));
        ResponseEvent::tool_calls(round, turn.content, calls, turn.usage)
    }

    fn finish(&mut self, round: usize, turn: BackendTurn) -> ResponseEvent {
        self.context.append(Turn::assistant_content(turn.content.clone()));
        self.transition(ExecutorState::Final);
        info!(
            session_id = %self.session_id,
            rounds = round,
            total_tokens = self.usage.total_usage().total_tokens,
            "final reply"
        );
        ResponseEvent::final_reply(round, turn.content, turn.usage, turn.refusal)
    }

    fn abort(&mut self, round: usize, error: &AgentError) {
        warn!(
            session_id = %self.session_id,
            round,
            error = %error,
            "execution aborted"
        );
        self.state = ExecutorState::AwaitingUser;
    }

    fn transition(&mut self, next: ExecutorState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }

    /// The full conversation, system turn first.
    pub fn history(&self) -> &[Turn] {
        self.context.snapshot()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Export the conversation as a JSON turn log for [`resume`](Self::resume).
    pub fn export_history(&self) -> Result<String> {
        self.context.export_json()
    }

    /// Drop everything but the system turn and reset usage totals.
    pub fn clear_history(&mut self) {
        self.context.reset();
        self.usage.reset();
        self.state = ExecutorState::AwaitingUser;
    }

    /// Replace the tools used from the next round on.
    ///
    /// On error the current tools stay in place.
    pub fn rebind_tools(&mut self, tools: Vec<Arc<dyn Tool>>) -> Result<()> {
        let registry = ToolRegistry::new(tools)?;
        self.rebind_registry(Arc::new(registry));
        Ok(())
    }

    pub fn rebind_registry(&mut self, registry: Arc<ToolRegistry>) {
        self.tool_definitions = registry.definitions();
        self.dispatcher.rebind(registry);
        debug!(
            session_id = %self.session_id,
            tools = self.tool_definitions.len(),
            "tools rebound"
        );
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    /// Usage summed over every backend call since creation or the last clear.
    pub fn total_usage(&self) -> UsageStats {
        self.usage.total_usage()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn tool_definitions(&self) -> &[ToolDefinition] {
        &self.tool_definitions
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        self.dispatcher.registry()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}

impl std::fmt::Debug for AgentExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentExecutor")
            .field("session_id", &self.session_id)
            .field("backend", &self.backend.name())
            .field("state", &self.state)
            .field("turns", &self.context.len())
            .finish()
    }
}
