use async_trait::async_trait;
use crossbeam_skiplist::SkipMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::Error as _};
use std::fmt;
use std::sync::Arc;
use crate::{KvError, Result, Value};

/// Binding name used when a driver is configured without one.
pub const DEFAULT_BINDING: &str = "STORAGE";

/// Shortest expiration window a store accepts, in seconds.
pub const MIN_EXPIRATION_TTL: u64 = 60;

/// Longest key name a store accepts, in bytes.
pub const MAX_KEY_SIZE: usize = 512;

/// Default and largest page size of a listing.
pub const MAX_LIST_LIMIT: usize = 1000;

///NamespacedStore is the platform key-value binding a driver talks to
#[async_trait]
pub trait NamespacedStore: Send + Sync {
    ///get the item stored at key, `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    ///write the item at key, replacing any previous one
    async fn put(&self, key: &str, value: Value, opts: PutOptions) -> Result<()>;

    ///delete key, deleting an absent key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    ///list one page of key names in key order
    async fn list(&self, opts: ListOptions) -> Result<ListResult>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Seconds from now after which the item expires.
    pub expiration_ttl: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub prefix: Option<String>,
    /// Page size, capped at `MAX_LIST_LIMIT`.
    pub limit: Option<usize>,
    /// Cursor returned by the previous page.
    pub cursor: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListKey {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListResult {
    pub keys: Vec<ListKey>,
    pub list_complete: bool,
    pub cursor: Option<String>,
}

/// Checks a key name the way the platform does before a write.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        "key names must not be empty"
    } else if key.len() > MAX_KEY_SIZE {
        "key names must be at most 512 bytes"
    } else if key == "." || key == ".." {
        "key names must not be `.` or `..`"
    } else {
        return Ok(());
    };
    Err(KvError::InvalidKey { key: key.to_string(), reason: reason.to_string() })
}

pub(crate) fn validate_ttl(opts: &PutOptions) -> Result<()> {
    match opts.expiration_ttl {
        Some(ttl) if ttl < MIN_EXPIRATION_TTL => {
            Err(KvError::InvalidExpirationTtl { ttl, min: MIN_EXPIRATION_TTL })
        }
        _ => Ok(()),
    }
}

pub(crate) fn page_limit(opts: &ListOptions) -> usize {
    opts.limit.unwrap_or(MAX_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Reference to a store: either a live handle or a name looked up in a `BindingEnv`.
#[derive(Clone)]
pub enum BindingRef {
    Handle(Arc<dyn NamespacedStore>),
    Name(String),
}

impl BindingRef {
    pub fn handle(store: impl NamespacedStore + 'static) -> BindingRef {
        BindingRef::Handle(Arc::new(store))
    }

    pub fn name(name: impl Into<String>) -> BindingRef {
        BindingRef::Name(name.into())
    }
}

impl Default for BindingRef {
    fn default() -> Self {
        BindingRef::Name(DEFAULT_BINDING.to_string())
    }
}

impl fmt::Debug for BindingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingRef::Handle(_) => f.write_str("Handle([binding])"),
            BindingRef::Name(name) => f.debug_tuple("Name").field(name).finish(),
        }
    }
}

impl Serialize for BindingRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            BindingRef::Handle(_) => {
                Err(S::Error::custom("a binding handle has no name and cannot be serialized"))
            }
            BindingRef::Name(name) => serializer.serialize_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for BindingRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(BindingRef::Name)
    }
}

/// The bindings the host environment exposes, by name.
///
/// Clones share one table, so a host can bind or swap a store after drivers
/// were created and the next driver call sees it.
#[derive(Clone, Default)]
pub struct BindingEnv {
    bindings: Arc<SkipMap<String, Arc<dyn NamespacedStore>>>,
}

impl BindingEnv {
    pub fn new() -> BindingEnv {
        BindingEnv::default()
    }

    /// Exposes `store` under `name`, replacing any previous binding.
    pub fn bind(&self, name: impl Into<String>, store: Arc<dyn NamespacedStore>) {
        self.bindings.insert(name.into(), store);
    }

    pub fn unbind(&self, name: &str) {
        self.bindings.remove(name);
    }

    /// Resolves `binding` to a live store handle.
    ///
    /// # Errors
    ///
    /// It returns `KvError::InvalidBinding` if a named binding is not exposed.
    pub fn resolve(&self, binding: &BindingRef) -> Result<Arc<dyn NamespacedStore>> {
        match binding {
            BindingRef::Handle(store) => Ok(Arc::clone(store)),
            BindingRef::Name(name) => self
                .bindings
                .get(name)
                .map(|entry| Arc::clone(entry.value()))
                .ok_or_else(|| KvError::InvalidBinding {
                    name: name.clone(),
                    reason: "no such binding in the environment".to_string(),
                }),
        }
    }
}

mod memory;
mod sled;

pub use self::memory::MemoryStore;
pub use self::sled::SledStore;
