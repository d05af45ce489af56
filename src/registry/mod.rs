//! Backend registry contracts and the tool search index.

pub mod backend;
pub mod search;

pub use backend::{
    BackendClient, BackendRegistry, ClientHandle, MetaClient, ServerInfo, ServerStatus,
};
pub use search::{SearchHit, ToolSearchIndex};
