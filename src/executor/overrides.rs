//! Per-call adjustments for a single `execute_with` call.

use std::sync::Arc;

use bon::Builder;

use crate::tools::ToolRegistry;
use crate::types::SamplingParams;

/// Settings that apply to one execution only.
///
/// Sampling fields set here replace the configured ones; unset fields fall
/// back to the executor's configuration. Nothing is kept for later calls.
///
/// ```
/// use agentkit::executor::ExecuteOverrides;
/// use agentkit::types::SamplingParams;
///
/// let overrides = ExecuteOverrides::builder()
///     .sampling(SamplingParams::builder().temperature(0.0).build())
///     .build();
/// assert!(overrides.tools.is_none());
/// ```
#[derive(Debug, Clone, Default, Builder)]
pub struct ExecuteOverrides {
    #[builder(default)]
    pub sampling: SamplingParams,
    /// Tools advertised and dispatched for this call instead of the bound ones.
    pub tools: Option<Arc<ToolRegistry>>,
}
