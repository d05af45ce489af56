//! Router configuration (code > env).

/// Default cap on per-session visible tools.
pub const DEFAULT_MAX_VISIBLE_TOOLS: usize = 200;

/// Configuration for the tool router.
///
/// Mode flags are read once at construction; they are not expected to
/// change at runtime.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Gate `get_all_tools` behind per-session visibility sets.
    pub progressive_disclosure: bool,
    /// Connect to the remote meta-service during `start`.
    pub meta_service_enabled: bool,
    /// Upper bound on each session's visible-tool set (FIFO eviction).
    pub max_visible_tools: usize,
    /// Tool names refused before any backend contact.
    pub denied_tools: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            progressive_disclosure: false,
            meta_service_enabled: true,
            max_visible_tools: DEFAULT_MAX_VISIBLE_TOOLS,
            denied_tools: Vec::new(),
        }
    }
}

impl RouterConfig {
    /// Load from environment variables (TOOLGATE_*).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();

        if let Ok(value) = std::env::var("TOOLGATE_PROGRESSIVE_TOOLS") {
            config.progressive_disclosure = parse_bool(&value);
        }
        if let Ok(value) = std::env::var("TOOLGATE_DISABLE_META") {
            config.meta_service_enabled = !parse_bool(&value);
        }
        if let Ok(value) = std::env::var("TOOLGATE_MAX_VISIBLE_TOOLS") {
            if let Ok(max) = value.trim().parse::<usize>() {
                if max > 0 {
                    config.max_visible_tools = max;
                }
            }
        }
        if let Ok(value) = std::env::var("TOOLGATE_DENIED_TOOLS") {
            config.denied_tools = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect();
        }

        config
    }

    /// Whether a tool name is on the deny list.
    pub fn is_denied(&self, tool_name: &str) -> bool {
        self.denied_tools.iter().any(|denied| denied == tool_name)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_full_disclosure_with_meta() {
        let config = RouterConfig::default();
        assert!(!config.progressive_disclosure);
        assert!(config.meta_service_enabled);
        assert_eq!(config.max_visible_tools, DEFAULT_MAX_VISIBLE_TOOLS);
        assert!(config.denied_tools.is_empty());
    }

    #[test]
    fn deny_list_matches_exact_names() {
        let config = RouterConfig {
            denied_tools: vec!["rm_rf".into(), "shutdown".into()],
            ..RouterConfig::default()
        };
        assert!(config.is_denied("rm_rf"));
        assert!(!config.is_denied("rm"));
    }

    #[test]
    fn parse_bool_accepts_common_truthy_forms() {
        assert!(parse_bool("1"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool(" yes "));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("off"));
    }
}
