//! Per-session progressive-disclosure visibility sets.

use std::collections::{HashMap, HashSet, VecDeque};

/// Bounded FIFO set of visible tool names for one session.
///
/// Eviction is insertion-order FIFO, not LRU: re-loading an already visible
/// tool is a no-op and does not refresh its position.
#[derive(Debug, Default)]
struct VisibleSet {
    order: VecDeque<String>,
    names: HashSet<String>,
}

impl VisibleSet {
    fn insert(&mut self, name: &str, capacity: usize) -> bool {
        if self.names.contains(name) {
            return false;
        }
        while self.names.len() >= capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.names.remove(&oldest);
        }
        self.order.push_back(name.to_owned());
        self.names.insert(name.to_owned());
        true
    }
}

/// Visibility sets for all sessions, created lazily on first `load_tool`.
#[derive(Debug)]
pub struct SessionVisibility {
    capacity: usize,
    sessions: HashMap<String, VisibleSet>,
}

impl SessionVisibility {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            sessions: HashMap::new(),
        }
    }

    /// Make a tool visible to a session. Returns `true` if the set changed.
    pub fn load(&mut self, session_id: &str, tool_name: &str) -> bool {
        let capacity = self.capacity;
        self.sessions
            .entry(session_id.to_owned())
            .or_default()
            .insert(tool_name, capacity)
    }

    pub fn contains(&self, session_id: &str, tool_name: &str) -> bool {
        self.sessions
            .get(session_id)
            .map(|set| set.names.contains(tool_name))
            .unwrap_or(false)
    }

    /// Visible tool names for a session in insertion order.
    pub fn visible(&self, session_id: &str) -> Vec<String> {
        self.sessions
            .get(session_id)
            .map(|set| set.order.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn session_size(&self, session_id: &str) -> usize {
        self.sessions
            .get(session_id)
            .map(|set| set.names.len())
            .unwrap_or(0)
    }

    /// Drop a session's visibility set. The router never calls this;
    /// session lifecycle belongs to the caller.
    pub fn remove_session(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_is_idempotent() {
        let mut visibility = SessionVisibility::new(3);
        assert!(visibility.load("s1", "echo"));
        assert!(!visibility.load("s1", "echo"));
        assert_eq!(visibility.session_size("s1"), 1);
    }

    #[test]
    fn eviction_is_fifo_by_insertion() {
        let mut visibility = SessionVisibility::new(2);
        visibility.load("s1", "first");
        visibility.load("s1", "second");
        visibility.load("s1", "third");

        assert_eq!(visibility.session_size("s1"), 2);
        assert!(!visibility.contains("s1", "first"));
        assert!(visibility.contains("s1", "second"));
        assert!(visibility.contains("s1", "third"));
    }

    #[test]
    fn reload_does_not_refresh_fifo_position() {
        let mut visibility = SessionVisibility::new(2);
        visibility.load("s1", "first");
        visibility.load("s1", "second");
        // Re-loading "first" must not move it to the back of the queue.
        visibility.load("s1", "first");
        visibility.load("s1", "third");

        assert!(!visibility.contains("s1", "first"));
        assert_eq!(visibility.visible("s1"), vec!["second", "third"]);
    }

    #[test]
    fn sessions_are_isolated() {
        let mut visibility = SessionVisibility::new(10);
        visibility.load("s1", "echo");
        assert!(!visibility.contains("s2", "echo"));
        assert!(visibility.visible("s2").is_empty());
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let mut visibility = SessionVisibility::new(5);
        for i in 0..50 {
            visibility.load("s1", &format!("tool_{i}"));
            assert!(visibility.session_size("s1") <= 5);
        }
        // The five newest survive.
        for i in 45..50 {
            assert!(visibility.contains("s1", &format!("tool_{i}")));
        }
    }

    #[test]
    fn remove_session_clears_state() {
        let mut visibility = SessionVisibility::new(5);
        visibility.load("s1", "echo");
        visibility.remove_session("s1");
        assert_eq!(visibility.session_size("s1"), 0);
    }
}
