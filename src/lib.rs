//! agentkit: a tool-calling conversation executor.
//!
//! An [`AgentExecutor`](executor::AgentExecutor) keeps a conversation
//! [`Context`](context::Context), sends it to a [`Backend`](backend::Backend),
//! runs any tools the backend asks for, feeds the results back and repeats
//! until the backend answers in plain content.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use agentkit::prelude::*;
//!
//! # async fn example(backend: Arc<dyn Backend>) -> agentkit::error::Result<()> {
//! let weather = ToolDescriptor::new(
//!     "get_weather",
//!     "Current weather for a city",
//!     ToolSchema::object().string("city", "City name", true).build(),
//!     |args| Ok(format!("18C sunny in {}", args.get_str("city")?).into()),
//! );
//!
//! let mut executor = AgentExecutor::new(backend, vec![weather.shared()], ExecutorConfig::default())?;
//! let reply = executor.run("What's the weather in Paris?").await?;
//! println!("{}", reply.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod context;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod tools;
pub mod types;
pub mod util;
