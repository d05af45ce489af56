//! The authoritative tool-name-to-backend map.

use std::collections::HashMap;

use crate::mcp::schema::MCPToolSchema;

/// Backend that owns a tool name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendId {
    /// Handler registered in-process.
    Internal,
    /// A named local MCP server.
    Server(String),
    /// The remote meta-service.
    Meta,
}

impl BackendId {
    /// Label used in invocation log records.
    pub fn label(&self) -> &str {
        match self {
            Self::Internal => "internal",
            Self::Server(name) => name,
            Self::Meta => "metamcp",
        }
    }
}

/// Routing table plus tool definition cache.
///
/// Invariant: every routed name has a cached definition. Both maps are
/// only ever written through the insert methods below, which maintain the
/// pair together.
#[derive(Debug, Default)]
pub struct RoutingTable {
    routes: HashMap<String, BackendId>,
    definitions: HashMap<String, MCPToolSchema>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tool, overwriting any existing entry for the name.
    ///
    /// Used for internal tools and local servers. When two local servers
    /// expose the same name, the one enumerated last wins; the overwrite is
    /// logged so the collision is visible.
    pub fn insert(&mut self, schema: MCPToolSchema, backend: BackendId) {
        let name = schema.name.clone();
        if let Some(previous) = self.routes.get(&name) {
            if *previous != backend {
                tracing::debug!(
                    tool = %name,
                    previous = %previous.label(),
                    replacement = %backend.label(),
                    "tool name collision, later backend wins"
                );
            }
        }
        self.definitions.insert(name.clone(), schema);
        self.routes.insert(name, backend);
    }

    /// Insert a tool from a local server.
    ///
    /// Overwrites entries from other local servers (enumeration order,
    /// last one wins) and from the meta-service, but never displaces an
    /// internal tool.
    pub fn insert_local(&mut self, schema: MCPToolSchema, server: &str) {
        if matches!(self.routes.get(&schema.name), Some(BackendId::Internal)) {
            tracing::debug!(
                tool = %schema.name,
                server,
                "local server tool shadowed by internal registration"
            );
            return;
        }
        self.insert(schema, BackendId::Server(server.to_owned()));
    }

    /// Insert a tool only if the name is not already routed.
    ///
    /// Used for the remote meta-service, which has strictly lowest priority.
    pub fn insert_if_absent(&mut self, schema: MCPToolSchema, backend: BackendId) {
        if self.routes.contains_key(&schema.name) {
            return;
        }
        self.insert(schema, backend);
    }

    pub fn resolve(&self, name: &str) -> Option<&BackendId> {
        self.routes.get(name)
    }

    pub fn definition(&self, name: &str) -> Option<&MCPToolSchema> {
        self.definitions.get(name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &MCPToolSchema> {
        self.definitions.values()
    }

    /// Names routed to a given backend kind.
    pub fn names_for(&self, backend: &BackendId) -> Vec<String> {
        self.routes
            .iter()
            .filter(|(_, owner)| *owner == backend)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(name: &str) -> MCPToolSchema {
        MCPToolSchema::new(name, format!("{name} description"), json!({"type": "object"}))
    }

    #[test]
    fn insert_overwrites_prior_entry() {
        let mut table = RoutingTable::new();
        table.insert(schema("search"), BackendId::Server("alpha".into()));
        table.insert(schema("search"), BackendId::Server("beta".into()));

        assert_eq!(
            table.resolve("search"),
            Some(&BackendId::Server("beta".into()))
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn insert_local_never_displaces_internal() {
        let mut table = RoutingTable::new();
        table.insert(schema("echo"), BackendId::Internal);
        table.insert_local(schema("echo"), "calc");

        assert_eq!(table.resolve("echo"), Some(&BackendId::Internal));
    }

    #[test]
    fn insert_local_last_server_wins() {
        let mut table = RoutingTable::new();
        table.insert_local(schema("search"), "alpha");
        table.insert_local(schema("search"), "beta");

        assert_eq!(
            table.resolve("search"),
            Some(&BackendId::Server("beta".into()))
        );
    }

    #[test]
    fn insert_if_absent_keeps_local_priority() {
        let mut table = RoutingTable::new();
        table.insert(schema("search"), BackendId::Server("alpha".into()));
        table.insert_if_absent(schema("search"), BackendId::Meta);

        assert_eq!(
            table.resolve("search"),
            Some(&BackendId::Server("alpha".into()))
        );
    }

    #[test]
    fn every_route_has_a_definition() {
        let mut table = RoutingTable::new();
        table.insert(schema("echo"), BackendId::Internal);
        table.insert_if_absent(schema("remote"), BackendId::Meta);

        for name in ["echo", "remote"] {
            assert!(table.resolve(name).is_some());
            assert!(table.definition(name).is_some());
        }
    }

    #[test]
    fn names_for_filters_by_backend() {
        let mut table = RoutingTable::new();
        table.insert(schema("echo"), BackendId::Internal);
        table.insert(schema("chain"), BackendId::Internal);
        table.insert(schema("add"), BackendId::Server("calc".into()));

        let mut internal = table.names_for(&BackendId::Internal);
        internal.sort();
        assert_eq!(internal, vec!["chain", "echo"]);
    }
}
