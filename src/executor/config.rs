//! Executor configuration (code > env).

use std::time::Duration;

use bon::Builder;
use chrono::{DateTime, Local};

use crate::error::{AgentError, Result};
use crate::tools::DispatchMode;
use crate::types::SamplingParams;
use crate::util::RetryPolicy;

/// Generate rounds allowed per `execute` call unless configured otherwise.
pub const DEFAULT_MAX_ROUNDS: usize = 20;

/// System prompt used when none is configured.
pub const DEFAULT_SYSTEM_MESSAGE: &str =
    "You are a helpful assistant. Try to assist the user in everything.";

/// Configuration for an [`AgentExecutor`](super::AgentExecutor).
///
/// ```
/// use agentkit::executor::ExecutorConfig;
/// use agentkit::tools::DispatchMode;
///
/// let config = ExecutorConfig::builder()
///     .system_message("You answer in one word.".to_string())
///     .stamp_datetime(false)
///     .max_rounds(5)
///     .dispatch_mode(DispatchMode::Concurrent)
///     .build();
/// assert_eq!(config.system_prompt(), "You answer in one word.");
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ExecutorConfig {
    /// Falls back to [`DEFAULT_SYSTEM_MESSAGE`].
    pub system_message: Option<String>,
    /// Append the current local date and time to the system prompt.
    #[builder(default = true)]
    pub stamp_datetime: bool,
    #[builder(default)]
    pub sampling: SamplingParams,
    /// Generate rounds per `execute` call; `0` means unbounded.
    #[builder(default = DEFAULT_MAX_ROUNDS)]
    pub max_rounds: usize,
    #[builder(default)]
    pub dispatch_mode: DispatchMode,
    /// Upper bound on a single backend call.
    pub backend_timeout: Option<Duration>,
    /// Retry policy for retryable backend failures.
    pub retry: Option<RetryPolicy>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ExecutorConfig {
    /// Load from environment variables, reading `.env` first if present.
    ///
    /// Recognized: `AGENTKIT_SYSTEM_MESSAGE`, `AGENTKIT_MODEL`,
    /// `AGENTKIT_TEMPERATURE`, `AGENTKIT_MAX_TOKENS`, `AGENTKIT_TOP_P`,
    /// `AGENTKIT_MAX_ROUNDS`, `AGENTKIT_BACKEND_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        config.system_message = get("AGENTKIT_SYSTEM_MESSAGE");
        config.sampling = SamplingParams {
            model: get("AGENTKIT_MODEL"),
            temperature: parse_opt(&get, "AGENTKIT_TEMPERATURE")?,
            max_tokens: parse_opt(&get, "AGENTKIT_MAX_TOKENS")?,
            top_p: parse_opt(&get, "AGENTKIT_TOP_P")?,
            response_format: None,
        };
        if let Some(max_rounds) = parse_opt(&get, "AGENTKIT_MAX_ROUNDS")? {
            config.max_rounds = max_rounds;
        }
        config.backend_timeout =
            parse_opt::<u64>(&get, "AGENTKIT_BACKEND_TIMEOUT_MS")?.map(Duration::from_millis);
        Ok(config)
    }

    /// `None` when the round budget is unbounded.
    pub fn round_limit(&self) -> Option<usize> {
        (self.max_rounds > 0).then_some(self.max_rounds)
    }

    /// The system prompt without any date stamp.
    pub fn system_prompt(&self) -> &str {
        self.system_message
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_MESSAGE)
    }

    /// The system prompt the conversation starts with, stamped at `now`.
    pub fn render_system_prompt(&self, now: DateTime<Local>) -> String {
        if !self.stamp_datetime {
            return self.system_prompt().to_string();
        }
        format!(
            "{}\nCurrent date and time: {}",
            self.system_prompt(),
            now.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

fn parse_opt<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                AgentError::Configuration(format!("{key} has invalid value '{raw}': {e}"))
            })
        })
        .transpose()
}
