//! Ordered, append-only turn log for one session.

use crate::error::{AgentError, Result};
use crate::types::{Role, Turn};

/// The conversation context owned by a single executor.
///
/// The first turn is always the system turn captured at construction.
/// Turns are only ever appended; [`Context::reset`] drops everything after
/// the system turn and restores its original text verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    system_prompt: String,
    turns: Vec<Turn>,
}

impl Context {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        Self {
            turns: vec![Turn::system(system_prompt.clone())],
            system_prompt,
        }
    }

    /// Rebuild a context from a previously exported turn log.
    ///
    /// The log must start with a system turn carrying text; that text becomes
    /// the prompt restored by later resets.
    pub fn from_turns(turns: Vec<Turn>) -> Result<Self> {
        let first = turns.first().ok_or_else(|| {
            AgentError::InvalidArgument("turn log is empty; expected a system turn first".into())
        })?;
        if first.role != Role::System {
            return Err(AgentError::InvalidArgument(format!(
                "turn log must start with a system turn, found {}",
                first.role
            )));
        }
        let system_prompt = first
            .content
            .as_ref()
            .map(|content| content.to_text())
            .unwrap_or_default();
        Ok(Self {
            system_prompt,
            turns,
        })
    }

    /// Parse a JSON array of turns (the persisted session format).
    pub fn from_json(json: &str) -> Result<Self> {
        let turns: Vec<Turn> = serde_json::from_str(json)?;
        Self::from_turns(turns)
    }

    /// Serialize the full ordered log as a JSON array.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.turns)?)
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn extend(&mut self, turns: impl IntoIterator<Item = Turn>) {
        self.turns.extend(turns);
    }

    /// Discard every turn except the original system turn.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.turns.push(Turn::system(self.system_prompt.clone()));
    }

    /// Read view of the full ordered sequence.
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false: the system turn is never removed.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
