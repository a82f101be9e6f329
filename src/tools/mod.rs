//! Tool registry and dispatch for function calling.

pub mod arguments;
pub mod dispatcher;
pub mod registry;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::{DecodedArguments, ToolArguments, NOTIFICATION_KEY};
pub use dispatcher::{DispatchMode, DispatchReport, ToolDispatcher};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolDescriptor};
pub use types::{ParameterBuilder, ToolSchema};
