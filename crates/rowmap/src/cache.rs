//! The per-mapper query result cache.

use std::collections::HashMap;

use rowmap_core::{Error, Row};

/// Caches executed statement outcomes by cache key.
///
/// Owned by exactly one mapper and torn down with it; two mappers never
/// share a cache even when pointed at the same table. The cache is
/// **unbounded by design**: there is no eviction, entries persist for the
/// life of the mapper, and mappers are expected to be scoped to one unit
/// of work. Failed executions are cached too, so repeating a failing
/// statement replays the stored error without touching the connection.
///
/// A hit hands back the rows from the beginning; iteration always starts
/// at the first row no matter how often the same statement is asked for.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<String, Result<Vec<Row>, Error>>,
}

impl QueryCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored outcome.
    pub fn get(&self, key: &str) -> Option<Result<Vec<Row>, Error>> {
        self.entries.get(key).cloned()
    }

    /// Store an outcome under its cache key.
    pub fn store(&mut self, key: String, outcome: Result<Vec<Row>, Error>) {
        self.entries.insert(key, outcome);
    }

    /// Drop every entry. Called after a successful write so later reads
    /// observe it.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached statements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
