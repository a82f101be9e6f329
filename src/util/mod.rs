//! Utility modules: retry, usage tracking, timeout.

pub mod retry;
pub mod timeout;
pub mod usage;

pub use retry::RetryPolicy;
pub use timeout::with_timeout;
pub use usage::UsageTracker;
