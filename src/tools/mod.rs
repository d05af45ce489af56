//! Tool system: typed arguments, internal handlers, normalized results.

pub mod arguments;
pub mod result;
pub mod tool;

pub use arguments::ToolArguments;
pub use result::{ContentItem, ToolCallResult};
pub use tool::{InternalTool, ToolExecutionContext};
