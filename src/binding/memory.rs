use async_trait::async_trait;
use crossbeam_skiplist::SkipMap;
use log::debug;
use std::ops::Bound;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use super::{
    ListKey, ListOptions, ListResult, NamespacedStore, PutOptions, page_limit, validate_key,
    validate_ttl,
};
use crate::{Result, Value};

/// In-process namespaced store.
///
/// Behaves like the platform binding: keys are validated on write, expiring
/// items vanish once their window has passed, and listings come back in key
/// order one page at a time. Clones share the same namespace.
#[derive(Clone, Default)]
pub struct MemoryStore {
    items: Arc<SkipMap<String, Entry>>,
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.items.iter().filter(|e| !e.value().is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NamespacedStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let entry = match self.items.get(key) {
            Some(entry) => entry,
            None => return Ok(None),
        };
        if entry.value().is_expired(Instant::now()) {
            entry.remove();
            return Ok(None);
        }
        Ok(Some(entry.value().value.clone()))
    }

    async fn put(&self, key: &str, value: Value, opts: PutOptions) -> Result<()> {
        validate_key(key)?;
        validate_ttl(&opts)?;
        // a window past the clock's range never expires
        let expires_at = opts
            .expiration_ttl
            .and_then(|ttl| Instant::now().checked_add(Duration::from_secs(ttl)));
        debug!("put {} (expires {:?})", key, opts.expiration_ttl);
        self.items.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        debug!("delete {}", key);
        self.items.remove(key);
        Ok(())
    }

    async fn list(&self, opts: ListOptions) -> Result<ListResult> {
        let limit = page_limit(&opts);
        let prefix = opts.prefix.as_deref().unwrap_or("");
        let start = match (opts.cursor.as_deref(), prefix) {
            (Some(cursor), _) => Bound::Excluded(cursor),
            (None, "") => Bound::Unbounded,
            (None, prefix) => Bound::Included(prefix),
        };

        let now = Instant::now();
        let mut keys = Vec::with_capacity(limit);
        let mut list_complete = true;
        for entry in self.items.range::<str, _>((start, Bound::Unbounded)) {
            if !entry.key().starts_with(prefix) {
                break;
            }
            if entry.value().is_expired(now) {
                entry.remove();
                continue;
            }
            if keys.len() == limit {
                list_complete = false;
                break;
            }
            keys.push(ListKey { name: entry.key().clone() });
        }

        let cursor = if list_complete { None } else { keys.last().map(|k| k.name.clone()) };
        Ok(ListResult { keys, list_complete, cursor })
    }
}
