//! Token usage reported by a backend call.

use serde::{Deserialize, Serialize};

/// Token usage for one backend call (or an accumulation of several).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UsageStats {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    #[serde(default)]
    pub breakdown: UsageBreakdown,
}

/// Per-side token details.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UsageBreakdown {
    #[serde(default)]
    pub prompt: PromptTokensDetails,
    #[serde(default)]
    pub completion: CompletionTokensDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PromptTokensDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CompletionTokensDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_prediction_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_prediction_tokens: Option<u32>,
}

fn add_opt(acc: &mut Option<u32>, other: Option<u32>) {
    if let Some(v) = other {
        *acc.get_or_insert(0) += v;
    }
}

impl UsageStats {
    /// Usage with only the top-level counters filled in.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            breakdown: UsageBreakdown::default(),
        }
    }

    /// Merge another usage into this one (accumulate).
    pub fn merge(&mut self, other: &UsageStats) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;

        let prompt = &mut self.breakdown.prompt;
        add_opt(&mut prompt.cached_tokens, other.breakdown.prompt.cached_tokens);
        add_opt(&mut prompt.audio_tokens, other.breakdown.prompt.audio_tokens);

        let completion = &mut self.breakdown.completion;
        let theirs = &other.breakdown.completion;
        add_opt(&mut completion.reasoning_tokens, theirs.reasoning_tokens);
        add_opt(&mut completion.audio_tokens, theirs.audio_tokens);
        add_opt(
            &mut completion.accepted_prediction_tokens,
            theirs.accepted_prediction_tokens,
        );
        add_opt(
            &mut completion.rejected_prediction_tokens,
            theirs.rejected_prediction_tokens,
        );
    }
}
