//! The tool router: registry refresh, progressive disclosure, dispatch.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};

use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::config::RouterConfig;
use crate::error::{Result, ToolGateError};
use crate::log::{InvocationRecord, InvocationSink, TracingSink};
use crate::mcp::schema::{MCPToolSchema, SchemaBuilder};
use crate::registry::backend::{BackendRegistry, MetaClient};
use crate::registry::search::ToolSearchIndex;
use crate::tools::arguments::ToolArguments;
use crate::tools::result::ToolCallResult;
use crate::tools::tool::{InternalTool, ToolExecutionContext};

use super::chain::{apply_json_path, substitute_chain_result, ChainArgs, ChainTraceEntry};
use super::routing::{BackendId, RoutingTable};
use super::visibility::SessionVisibility;

/// Meta-tool: keyword search over the registry.
pub const SEARCH_TOOLS: &str = "search_tools";
/// Meta-tool: make a tool visible to the calling session.
pub const LOAD_TOOL: &str = "load_tool";
/// Internal tool: sequential tool pipeline with data threading.
pub const CHAIN_TOOL: &str = "mcp_chain";

const DEFAULT_SEARCH_LIMIT: i64 = 10;

/// Aggregates tool definitions across backends behind one routing table and
/// dispatches calls to whichever backend currently owns a name.
///
/// All mutable state lives in this struct; collaborators receive an
/// `Arc<ToolRouter>` rather than touching ambient singletons. Refreshes
/// build a fresh table off to the side and swap it in, so lookups never
/// observe a half-built table.
pub struct ToolRouter {
    config: RouterConfig,
    registry: Arc<dyn BackendRegistry>,
    meta: Option<Arc<dyn MetaClient>>,
    sink: Arc<dyn InvocationSink>,
    internal: RwLock<HashMap<String, InternalTool>>,
    table: RwLock<RoutingTable>,
    search: RwLock<ToolSearchIndex>,
    visibility: Mutex<SessionVisibility>,
}

impl ToolRouter {
    /// Create a router logging invocations through the default tracing sink.
    pub fn new(
        config: RouterConfig,
        registry: Arc<dyn BackendRegistry>,
        meta: Option<Arc<dyn MetaClient>>,
    ) -> Arc<Self> {
        Self::with_sink(config, registry, meta, Arc::new(TracingSink))
    }

    /// Create a router with an explicit invocation sink.
    pub fn with_sink(
        config: RouterConfig,
        registry: Arc<dyn BackendRegistry>,
        meta: Option<Arc<dyn MetaClient>>,
        sink: Arc<dyn InvocationSink>,
    ) -> Arc<Self> {
        let meta = if config.meta_service_enabled { meta } else { None };
        let max_visible = config.max_visible_tools;

        Arc::new(Self {
            config,
            registry,
            meta,
            sink,
            internal: RwLock::new(HashMap::new()),
            table: RwLock::new(RoutingTable::new()),
            search: RwLock::new(ToolSearchIndex::new()),
            visibility: Mutex::new(SessionVisibility::new(max_visible)),
        })
    }

    /// Register the built-in `mcp_chain` tool.
    ///
    /// Kept separate from construction so hosts that expose no chaining
    /// keep a registry of exactly the two meta-tools plus their own
    /// registrations. The handler holds a weak reference; dropping the
    /// router invalidates the tool.
    pub fn register_chain_tool(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.register_internal_tool(chain_tool_schema(), move |args, ctx| {
            let weak = weak.clone();
            async move {
                let Some(router) = weak.upgrade() else {
                    return Err(ToolGateError::InvalidState("router dropped".into()));
                };
                router.run_chain(args, ctx).await
            }
        });
    }

    /// Connect the meta-service (non-fatal on failure), perform the initial
    /// registry refresh, and start reacting to backend topology changes.
    pub async fn start(self: &Arc<Self>) {
        if let Some(meta) = &self.meta {
            if let Err(e) = meta.connect().await {
                tracing::warn!(error = %e, "meta-service connection failed, continuing with local tools");
            }
        }

        self.refresh_registry().await;

        let weak = Arc::downgrade(self);
        let mut updates = self.registry.subscribe();
        tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        let Some(router) = weak.upgrade() else { break };
                        router.refresh_registry().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Register (or overwrite) an internal tool and its handler.
    ///
    /// The routing table entry is updated immediately; no full refresh runs.
    /// The search index picks the tool up on the next refresh.
    pub fn register_internal_tool<F, Fut>(&self, schema: MCPToolSchema, handler: F)
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let tool = InternalTool::new(schema, handler);
        self.table
            .write()
            .unwrap()
            .insert(tool.schema().clone(), BackendId::Internal);
        self.internal
            .write()
            .unwrap()
            .insert(tool.name().to_owned(), tool);
    }

    /// Rebuild the routing table by querying every known backend.
    ///
    /// Internal tools first, then every running local server (unconditional
    /// overwrite, enumeration order), then the meta-service (insert only if
    /// absent). A backend whose `list_tools` fails is logged and skipped;
    /// the refresh never aborts as a whole.
    pub async fn refresh_registry(&self) {
        let mut table = RoutingTable::new();

        let internal_schemas: Vec<MCPToolSchema> = self
            .internal
            .read()
            .unwrap()
            .values()
            .map(|tool| tool.schema().clone())
            .collect();
        for schema in internal_schemas {
            table.insert(schema, BackendId::Internal);
        }

        for server in self.registry.all_servers() {
            if !server.is_running() {
                continue;
            }
            let Some(client) = self.registry.client(&server.name) else {
                tracing::warn!(server = %server.name, "running server has no client, skipping");
                continue;
            };
            let listed = {
                let mut client = client.lock().await;
                client.list_tools().await
            };
            match listed {
                Ok(tools) => {
                    for tool in tools {
                        table.insert_local(tool, &server.name);
                    }
                }
                Err(e) => {
                    tracing::warn!(server = %server.name, error = %e, "list_tools failed, skipping backend");
                }
            }
        }

        if let Some(meta) = &self.meta {
            match meta.list_tools().await {
                Ok(tools) => {
                    for tool in tools {
                        table.insert_if_absent(tool, BackendId::Meta);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "meta-service unreachable, proceeding with local tools");
                }
            }
        }

        let mut index = ToolSearchIndex::new();
        index.rebuild(table.definitions());

        tracing::debug!(tools = table.len(), "registry refreshed");
        *self.table.write().unwrap() = table;
        *self.search.write().unwrap() = index;
    }

    /// Tool definitions visible to a caller.
    ///
    /// The `search_tools` and `load_tool` meta-tools are always present and
    /// take precedence over any colliding backend tool name. In progressive
    /// mode the rest is limited to internal tools plus whatever the session
    /// has loaded; in full-disclosure mode every cached definition returns.
    pub fn get_all_tools(&self, session_id: Option<&str>) -> Vec<MCPToolSchema> {
        let mut tools = vec![search_tools_schema(), load_tool_schema()];
        let mut seen: HashSet<String> = tools.iter().map(|tool| tool.name.clone()).collect();

        let table = self.table.read().unwrap();
        if self.config.progressive_disclosure {
            let mut names = table.names_for(&BackendId::Internal);
            names.sort();
            if let Some(session_id) = session_id {
                names.extend(self.visibility.lock().unwrap().visible(session_id));
            }
            for name in names {
                if let Some(definition) = table.definition(&name) {
                    if seen.insert(name) {
                        tools.push(definition.clone());
                    }
                }
            }
        } else {
            let mut definitions: Vec<MCPToolSchema> = table.definitions().cloned().collect();
            definitions.sort_by(|a, b| a.name.cmp(&b.name));
            for definition in definitions {
                if seen.insert(definition.name.clone()) {
                    tools.push(definition);
                }
            }
        }

        tools
    }

    /// Execute a named tool call against whichever backend owns it.
    ///
    /// Always returns a well-formed result; backend failures surface as
    /// `is_error` results, never as panics or propagated errors. A name
    /// missing from the routing table triggers exactly one best-effort
    /// refresh before the call is reported as not found.
    pub async fn call_tool(
        &self,
        name: &str,
        args: Value,
        session_id: Option<&str>,
    ) -> ToolCallResult {
        match name {
            SEARCH_TOOLS => return self.handle_search_tools(args),
            LOAD_TOOL => return self.handle_load_tool(args, session_id),
            _ => {}
        }

        if self.config.is_denied(name) {
            return ToolCallResult::error(format!("Tool '{name}' is blocked by policy"));
        }

        let Some(backend) = self.resolve_with_refresh(name).await else {
            return ToolCallResult::error(format!("Tool not found: {name}"));
        };
        let server = backend.label().to_owned();

        self.sink
            .record(InvocationRecord::request(name, &server, &args));

        match self.dispatch(&backend, name, args, session_id).await {
            Ok(result) => {
                if result.failed() {
                    self.sink.record(InvocationRecord::error(
                        name,
                        &server,
                        &result.text_content(),
                    ));
                } else {
                    let payload = serde_json::to_value(&result).unwrap_or(Value::Null);
                    self.sink
                        .record(InvocationRecord::response(name, &server, &payload));
                }
                result
            }
            Err(e) => {
                let message = e.to_string();
                self.sink
                    .record(InvocationRecord::error(name, &server, &message));
                ToolCallResult::error(message)
            }
        }
    }

    async fn resolve_with_refresh(&self, name: &str) -> Option<BackendId> {
        if let Some(backend) = self.table.read().unwrap().resolve(name).cloned() {
            return Some(backend);
        }
        // The table may be stale relative to backend reality (a server
        // started after the last refresh); retry once after a refresh.
        self.refresh_registry().await;
        self.table.read().unwrap().resolve(name).cloned()
    }

    async fn dispatch(
        &self,
        backend: &BackendId,
        name: &str,
        args: Value,
        session_id: Option<&str>,
    ) -> Result<ToolCallResult> {
        match backend {
            BackendId::Internal => {
                let tool = self
                    .internal
                    .read()
                    .unwrap()
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ToolGateError::ToolNotFound(name.to_owned()))?;
                let value = tool
                    .invoke(
                        ToolArguments::new(args),
                        ToolExecutionContext::for_session(session_id),
                    )
                    .await?;
                Ok(ToolCallResult::from_value(value))
            }
            BackendId::Server(server) => {
                let client = self
                    .registry
                    .client(server)
                    .ok_or_else(|| ToolGateError::ServerUnavailable(server.clone()))?;
                let result = {
                    let mut client = client.lock().await;
                    client.call_tool(name, args).await?
                };
                Ok(ToolCallResult::from_value(result.into_value_or_text()))
            }
            BackendId::Meta => {
                let meta = self
                    .meta
                    .as_ref()
                    .ok_or_else(|| ToolGateError::ServerUnavailable("metamcp".into()))?;
                let value = meta.call_tool(name, args).await?;
                Ok(ToolCallResult::from_value(value))
            }
        }
    }

    fn handle_search_tools(&self, args: Value) -> ToolCallResult {
        let args = ToolArguments::new(args);
        let query = match args.get_str("query") {
            Ok(query) => query.to_owned(),
            Err(e) => return ToolCallResult::error(e.to_string()),
        };
        let limit = args
            .get_i64_opt("limit")
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .max(0) as usize;

        let hits = self.search.read().unwrap().search(&query, limit);
        match serde_json::to_string(&hits) {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => ToolCallResult::error(format!("Failed to serialize search results: {e}")),
        }
    }

    fn handle_load_tool(&self, args: Value, session_id: Option<&str>) -> ToolCallResult {
        let Some(session_id) = session_id else {
            return ToolCallResult::error("load_tool requires a session identifier");
        };
        let args = ToolArguments::new(args);
        let name = match args.get_str("name") {
            Ok(name) => name.to_owned(),
            Err(e) => return ToolCallResult::error(e.to_string()),
        };

        let loaded = self.visibility.lock().unwrap().load(session_id, &name);
        if loaded {
            ToolCallResult::text(format!("Loaded tool '{name}'"))
        } else {
            ToolCallResult::text(format!("Tool '{name}' is already loaded"))
        }
    }

    /// Execute an `mcp_chain` pipeline. Re-entrant through `call_tool`, so
    /// steps may invoke any tool, including another chain.
    async fn run_chain(&self, args: ToolArguments, ctx: ToolExecutionContext) -> Result<Value> {
        let chain: ChainArgs = args.deserialize()?;
        let session_id = ctx.session_id.as_deref();

        let mut running = Value::Null;
        let mut trace: Vec<ChainTraceEntry> = Vec::new();

        for (index, step) in chain.mcp_path.iter().enumerate() {
            let mut template = step.tool_args.clone();
            if index > 0 {
                let mut piped = running.clone();
                if let Some(path) = &step.input_path {
                    piped = apply_json_path(&piped, path);
                }
                template = substitute_chain_result(&template, &piped);
            }

            let step_args: Value = serde_json::from_str(&template).map_err(|e| {
                ToolGateError::InvalidArgument(format!(
                    "Chain step {index} ({}) has malformed arguments after substitution: {e}",
                    step.tool_name
                ))
            })?;

            let result = self.call_tool(&step.tool_name, step_args, session_id).await;
            if result.failed() {
                let message = result.text_content();
                trace.push(ChainTraceEntry {
                    step: index,
                    tool: step.tool_name.clone(),
                    output: None,
                    error: Some(message.clone()),
                });
                let aborted = ToolCallResult::error(format!(
                    "Chain aborted at step {index} ({}): {message}",
                    step.tool_name
                ))
                .with_trace(serde_json::to_value(&trace)?);
                return Ok(serde_json::to_value(aborted)?);
            }

            let mut output = Value::String(result.text_content());
            if let Some(path) = &step.output_path {
                output = apply_json_path(&output, path);
            }
            trace.push(ChainTraceEntry {
                step: index,
                tool: step.tool_name.clone(),
                output: Some(output.clone()),
                error: None,
            });
            running = output;
        }

        let final_text = match &running {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        let result = ToolCallResult::text(final_text).with_trace(serde_json::to_value(&trace)?);
        Ok(serde_json::to_value(result)?)
    }
}

impl std::fmt::Debug for ToolRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRouter")
            .field("progressive", &self.config.progressive_disclosure)
            .field("tools", &self.table.read().unwrap().len())
            .finish()
    }
}

fn search_tools_schema() -> MCPToolSchema {
    MCPToolSchema::new(
        SEARCH_TOOLS,
        "Search the tool registry by keyword. Returns ranked matches without loading them.",
        SchemaBuilder::new()
            .property(
                "query",
                json!({"type": "string", "description": "Free-text search over tool names and descriptions"}),
                true,
            )
            .property(
                "limit",
                json!({"type": "number", "description": "Maximum number of results", "default": 10}),
                false,
            )
            .build(),
    )
}

fn load_tool_schema() -> MCPToolSchema {
    MCPToolSchema::new(
        LOAD_TOOL,
        "Make a tool visible to this session. Use search_tools first to find the name.",
        SchemaBuilder::new()
            .property(
                "name",
                json!({"type": "string", "description": "Name of the tool to load"}),
                true,
            )
            .build(),
    )
}

fn chain_tool_schema() -> MCPToolSchema {
    MCPToolSchema::new(
        CHAIN_TOOL,
        "Execute a sequence of tool calls, piping each step's output into the next step's arguments via the CHAIN_RESULT placeholder.",
        SchemaBuilder::new()
            .property(
                "mcpPath",
                json!({
                    "type": "array",
                    "description": "Ordered steps to execute",
                    "items": {
                        "type": "object",
                        "properties": {
                            "toolName": {"type": "string"},
                            "toolArgs": {
                                "type": "string",
                                "description": "JSON-encoded arguments; CHAIN_RESULT is replaced with the previous step's output"
                            },
                            "inputPath": {
                                "type": "string",
                                "description": "JSONPath applied to the previous output before substitution"
                            },
                            "outputPath": {
                                "type": "string",
                                "description": "JSONPath applied to this step's output"
                            }
                        },
                        "required": ["toolName", "toolArgs"]
                    }
                }),
                true,
            )
            .build(),
    )
}
