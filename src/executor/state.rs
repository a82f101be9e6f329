//! Executor state machine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Where the executor is in its generate/dispatch cycle.
///
/// `AwaitingUser -> Generating -> Final`, or
/// `Generating -> Dispatching -> AppendingResults -> Generating` while the
/// backend keeps requesting tools.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutorState {
    #[default]
    AwaitingUser,
    Generating,
    Dispatching,
    AppendingResults,
    Final,
}

impl ExecutorState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: ExecutorState) -> bool {
        use ExecutorState::*;
        matches!(
            (self, next),
            (AwaitingUser | Final, Generating)
                | (Generating, Dispatching | Final)
                | (Dispatching, AppendingResults)
                | (AppendingResults, Generating)
                | (_, AwaitingUser)
        )
    }

    /// A new `execute` call may start.
    pub fn is_idle(self) -> bool {
        matches!(self, Self::AwaitingUser | Self::Final)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ExecutorState::*;

    #[test]
    fn tool_round_cycle_is_legal() {
        let path = [AwaitingUser, Generating, Dispatching, AppendingResults, Generating, Final];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn skipping_steps_is_illegal() {
        assert!(!AwaitingUser.can_transition_to(Dispatching));
        assert!(!Dispatching.can_transition_to(Generating));
        assert!(!Final.can_transition_to(AppendingResults));
    }

    #[test]
    fn any_state_can_fall_back_to_awaiting_user() {
        for state in [Generating, Dispatching, AppendingResults, Final] {
            assert!(state.can_transition_to(AwaitingUser));
        }
        assert!(Final.is_idle());
        assert!(!Generating.is_idle());
    }

    #[test]
    fn displays_snake_case() {
        assert_eq!(AppendingResults.to_string(), "appending_results");
        assert_eq!("final".parse::<ExecutorState>().unwrap(), Final);
    }
}
