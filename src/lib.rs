//! A storage driver over a namespaced key-value binding.
//!
//! `KvBindingDriver` maps the uniform has/get/set/remove/keys/clear driver
//! interface onto a `NamespacedStore`, scoping every key under an optional
//! base prefix and attaching expirations on write.

pub use binding::{BindingEnv, BindingRef, MemoryStore, NamespacedStore, SledStore};
pub use common::init_logger;
pub use driver::{DRIVER_NAME, DriverConfig, KvBindingDriver, SetOptions, StorageDriver, create_driver};
pub use error::{KvError, Result};
pub use keys::KeySpace;
pub use value::Value;

///a module about the namespaced store a driver talks to
pub mod binding;
pub mod common;
///a module about storage drivers
pub mod driver;
///a module about errors
pub mod error;
pub mod keys;
pub mod value;
