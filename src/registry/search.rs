//! Keyword index over tool definitions for the `search_tools` meta-tool.

use serde::Serialize;

use crate::mcp::schema::MCPToolSchema;

/// One ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub description: String,
    pub score: u32,
}

#[derive(Debug, Clone)]
struct IndexedTool {
    name: String,
    name_lower: String,
    description: String,
    description_lower: String,
}

/// In-memory keyword index, rebuilt wholesale on every registry refresh.
#[derive(Debug, Default)]
pub struct ToolSearchIndex {
    entries: Vec<IndexedTool>,
}

impl ToolSearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the index from the full definition cache.
    pub fn rebuild<'a>(&mut self, tools: impl Iterator<Item = &'a MCPToolSchema>) {
        self.entries = tools
            .map(|tool| {
                let description = tool.description.clone().unwrap_or_default();
                IndexedTool {
                    name_lower: tool.name.to_lowercase(),
                    description_lower: description.to_lowercase(),
                    name: tool.name.clone(),
                    description,
                }
            })
            .collect();
        self.entries.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank tools against a free-text query. Exact name match dominates,
    /// then name substring hits, then description keyword overlap.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() || limit == 0 {
            return Vec::new();
        }
        let terms: Vec<&str> = query_lower.split_whitespace().collect();

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let score = score_entry(entry, &query_lower, &terms);
                (score > 0).then(|| SearchHit {
                    name: entry.name.clone(),
                    description: entry.description.clone(),
                    score,
                })
            })
            .collect();

        // Stable by name on ties: entries are already name-sorted.
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(limit);
        hits
    }
}

fn score_entry(entry: &IndexedTool, query_lower: &str, terms: &[&str]) -> u32 {
    if entry.name_lower == query_lower {
        return 100;
    }

    let mut score = 0;
    if entry.name_lower.contains(query_lower) {
        score += 40;
    }
    for term in terms {
        if entry.name_lower.contains(term) {
            score += 10;
        }
        if entry.description_lower.contains(term) {
            score += 3;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(name: &str, description: &str) -> MCPToolSchema {
        MCPToolSchema::new(name, description, json!({"type": "object"}))
    }

    fn index(tools: &[MCPToolSchema]) -> ToolSearchIndex {
        let mut index = ToolSearchIndex::new();
        index.rebuild(tools.iter());
        index
    }

    #[test]
    fn exact_name_match_ranks_first() {
        let index = index(&[
            tool("read_file", "Read a file from disk"),
            tool("file_search", "Search file names"),
            tool("web_search", "Search the web"),
        ]);

        let hits = index.search("file_search", 10);
        assert_eq!(hits[0].name, "file_search");
        assert_eq!(hits[0].score, 100);
    }

    #[test]
    fn description_keywords_contribute() {
        let index = index(&[
            tool("calc_add", "Add two numbers"),
            tool("fetch_url", "Fetch a web page"),
        ]);

        let hits = index.search("numbers", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "calc_add");
    }

    #[test]
    fn limit_truncates_results() {
        let index = index(&[
            tool("search_a", "search things"),
            tool("search_b", "search things"),
            tool("search_c", "search things"),
        ]);

        let hits = index.search("search", 2);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn empty_query_returns_nothing() {
        let index = index(&[tool("echo", "Echo")]);
        assert!(index.search("   ", 10).is_empty());
        assert!(index.search("echo", 0).is_empty());
    }

    #[test]
    fn rebuild_replaces_previous_entries() {
        let mut index = index(&[tool("old_tool", "gone after rebuild")]);
        let replacement = [tool("new_tool", "fresh")];
        index.rebuild(replacement.iter());

        assert!(index.search("old_tool", 10).is_empty());
        assert_eq!(index.search("new_tool", 10).len(), 1);
    }
}
