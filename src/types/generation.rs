//! Sampling parameters and finish reasons.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sampling parameters passed through to the backend untouched.
///
/// ```
/// use agentkit::types::SamplingParams;
///
/// let sampling = SamplingParams::builder()
///     .model("gpt-4o-mini".to_string())
///     .temperature(0.3)
///     .build();
/// assert_eq!(sampling.max_tokens, None);
/// ```
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default, PartialEq)]
pub struct SamplingParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Structured-output request such as `{"type": "json_object"}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
}

impl SamplingParams {
    /// Layer `overrides` on top of `self`; fields set in `overrides` win.
    pub fn merged_with(&self, overrides: &SamplingParams) -> SamplingParams {
        SamplingParams {
            model: overrides.model.clone().or_else(|| self.model.clone()),
            temperature: overrides.temperature.or(self.temperature),
            max_tokens: overrides.max_tokens.or(self.max_tokens),
            top_p: overrides.top_p.or(self.top_p),
            response_format: overrides
                .response_format
                .clone()
                .or_else(|| self.response_format.clone()),
        }
    }
}

/// Why the backend stopped producing its turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
}
