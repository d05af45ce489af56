//! The tool router: routing table, disclosure policy, dispatch, chaining.

pub mod chain;
pub mod core;
pub mod routing;
pub mod visibility;

pub use chain::ChainStep;
pub use core::{ToolRouter, CHAIN_TOOL, LOAD_TOOL, SEARCH_TOOLS};
pub use routing::{BackendId, RoutingTable};
pub use visibility::SessionVisibility;
