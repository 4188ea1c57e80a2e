//! Issue-type id cache
//!
//! JIRA identifies issue types per project by numeric id. Resolving them
//! costs a project lookup, so the JIRA adapter asks an injected cache first
//! and stores the whole project's type table on a miss.

use std::collections::HashMap;
use std::sync::Mutex;

/// Lowercased issue type name → type id, for one project
pub type IssueTypeTable = HashMap<String, String>;

/// Cache of issue type tables keyed by project
pub trait IssueTypeCache: Send + Sync {
    /// Cached table for `project`, if any
    fn get(&self, project: &str) -> Option<IssueTypeTable>;

    /// Store the table for `project`
    fn insert(&self, project: &str, table: IssueTypeTable);
}

/// Process-lifetime in-memory cache
#[derive(Debug, Default)]
pub struct MemoryIssueTypeCache {
    tables: Mutex<HashMap<String, IssueTypeTable>>,
}

impl MemoryIssueTypeCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IssueTypeCache for MemoryIssueTypeCache {
    fn get(&self, project: &str) -> Option<IssueTypeTable> {
        self.tables
            .lock()
            .ok()
            .and_then(|tables| tables.get(project).cloned())
    }

    fn insert(&self, project: &str, table: IssueTypeTable) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.insert(project.to_string(), table);
        }
    }
}

/// Cache that never stores anything; every lookup hits JIRA
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIssueTypeCache;

impl IssueTypeCache for NoopIssueTypeCache {
    fn get(&self, _project: &str) -> Option<IssueTypeTable> {
        None
    }

    fn insert(&self, _project: &str, _table: IssueTypeTable) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> IssueTypeTable {
        HashMap::from([
            ("story".to_string(), "10001".to_string()),
            ("feature".to_string(), "10005".to_string()),
        ])
    }

    #[test]
    fn test_memory_cache_per_project() {
        let cache = MemoryIssueTypeCache::new();
        assert!(cache.get("LEG").is_none());

        cache.insert("LEG", table());
        assert_eq!(
            cache.get("LEG").and_then(|t| t.get("feature").cloned()),
            Some("10005".to_string())
        );
        assert!(cache.get("OPS").is_none());
    }

    #[test]
    fn test_noop_cache_forgets() {
        let cache = NoopIssueTypeCache;
        cache.insert("LEG", table());
        assert!(cache.get("LEG").is_none());
    }
}
