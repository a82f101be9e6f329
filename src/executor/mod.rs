//! Agent executor: the generate/dispatch loop and session plumbing.

pub mod agent;
pub mod config;
pub mod factory;
pub mod overrides;
pub mod session;
pub mod state;

pub use config::{ExecutorConfig, DEFAULT_MAX_ROUNDS, DEFAULT_SYSTEM_MESSAGE};
pub use agent::AgentExecutor;
pub use factory::ExecutorFactory;
pub use overrides::ExecuteOverrides;
pub use session::SessionManager;
pub use state::ExecutorState;
