use async_trait::async_trait;
use crate::{Result, Value};

///StorageDriver is the capability set every storage driver offers
#[async_trait]
pub trait StorageDriver: Send + Sync {
    ///identifies the driver kind
    fn name(&self) -> &str;

    ///whether an item exists at key
    async fn has_item(&self, key: &str) -> Result<bool>;

    ///get the item at key, `None` if there is none
    async fn get_item(&self, key: &str) -> Result<Option<Value>>;

    ///store value at key, overwriting any previous item
    async fn set_item(&self, key: &str, value: Value, opts: SetOptions) -> Result<()>;

    ///remove the item at key, removing a missing item is not an error
    async fn remove_item(&self, key: &str) -> Result<()>;

    ///all keys owned by this driver
    async fn get_keys(&self) -> Result<Vec<String>>;

    ///remove every item owned by this driver, or only those under `base`
    async fn clear(&self, base: Option<&str>) -> Result<()>;
}

/// Per-call options of `set_item`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Seconds until the item expires. Overrides the driver default; `0` means never.
    pub ttl: Option<u64>,
}

impl SetOptions {
    pub fn ttl(secs: u64) -> SetOptions {
        SetOptions { ttl: Some(secs) }
    }
}

mod kv_binding;

pub use self::kv_binding::{DRIVER_NAME, DriverConfig, KvBindingDriver, create_driver};
