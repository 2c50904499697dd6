use async_trait::async_trait;
use futures::future::join_all;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use super::{SetOptions, StorageDriver};
use crate::binding::{BindingEnv, BindingRef, ListOptions, NamespacedStore, PutOptions};
use crate::{KeySpace, Result, Value};

pub const DRIVER_NAME: &str = "kv-binding";

/// Configuration of a `KvBindingDriver`.
///
/// ```json
/// { "binding": "STORAGE", "base": "app", "ttl": 3600 }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DriverConfig {
    /// Store to use, resolved on every call.
    pub binding: BindingRef,
    /// Prefix added to every stored key.
    pub base: Option<String>,
    /// Default expiration in seconds for items written without one.
    pub ttl: Option<u64>,
}

/// Builds a driver over the bindings of `env`.
pub fn create_driver(config: DriverConfig, env: BindingEnv) -> KvBindingDriver {
    KvBindingDriver::new(config, env)
}

/// Storage driver over a namespaced key-value binding.
///
/// Holds no store handle between calls: the binding is resolved through the
/// environment each time, so a host may swap it at any point.
#[derive(Clone)]
pub struct KvBindingDriver {
    config: DriverConfig,
    keys: KeySpace,
    env: BindingEnv,
}

impl KvBindingDriver {
    pub fn new(config: DriverConfig, env: BindingEnv) -> KvBindingDriver {
        let keys = KeySpace::new(config.base.as_deref());
        KvBindingDriver { config, keys, env }
    }

    /// The configuration this driver was built with.
    pub fn options(&self) -> &DriverConfig {
        &self.config
    }

    fn binding(&self) -> Result<Arc<dyn NamespacedStore>> {
        self.env.resolve(&self.config.binding)
    }

    /// Physical keys under `sub`, across every page of the listing.
    async fn physical_keys(&self, store: &dyn NamespacedStore, sub: &str) -> Result<Vec<String>> {
        let mut opts = ListOptions { prefix: self.keys.list_prefix(sub), ..Default::default() };
        let mut keys = Vec::new();
        loop {
            let page = store.list(opts.clone()).await?;
            keys.extend(page.keys.into_iter().map(|k| k.name));
            match page.cursor {
                Some(cursor) if !page.list_complete => opts.cursor = Some(cursor),
                _ => break,
            }
        }
        Ok(keys)
    }
}

#[async_trait]
impl StorageDriver for KvBindingDriver {
    fn name(&self) -> &str {
        DRIVER_NAME
    }

    async fn has_item(&self, key: &str) -> Result<bool> {
        let key = self.keys.physical(key);
        let binding = self.binding()?;
        Ok(binding.get(&key).await?.is_some())
    }

    async fn get_item(&self, key: &str) -> Result<Option<Value>> {
        let key = self.keys.physical(key);
        let binding = self.binding()?;
        binding.get(&key).await
    }

    async fn set_item(&self, key: &str, value: Value, opts: SetOptions) -> Result<()> {
        let key = self.keys.physical(key);
        let binding = self.binding()?;
        let ttl = opts.ttl.or(self.config.ttl).filter(|&ttl| ttl > 0);
        debug!("set {} (ttl {:?})", key, ttl);
        binding.put(&key, value, PutOptions { expiration_ttl: ttl }).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let key = self.keys.physical(key);
        let binding = self.binding()?;
        binding.delete(&key).await
    }

    async fn get_keys(&self) -> Result<Vec<String>> {
        let binding = self.binding()?;
        let keys = self.physical_keys(&*binding, "").await?;
        Ok(keys.iter().map(|key| self.keys.logical(key)).collect())
    }

    /// Deletes concurrently and waits for every deletion before reporting the
    /// first failure. Deletions that already went through are not undone.
    async fn clear(&self, base: Option<&str>) -> Result<()> {
        let binding = self.binding()?;
        let keys = self.physical_keys(&*binding, base.unwrap_or("")).await?;
        debug!("clear {} keys under {:?}", keys.len(), self.keys.list_prefix(base.unwrap_or("")));
        let results = join_all(keys.iter().map(|key| binding.delete(key))).await;
        results.into_iter().collect()
    }
}
