use kvbind::binding::{PutOptions, DEFAULT_BINDING};
use kvbind::{
    BindingEnv, BindingRef, DriverConfig, KvError, MemoryStore, NamespacedStore, SetOptions,
    SledStore, StorageDriver, Value, create_driver,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn driver(env: &BindingEnv, base: Option<&str>) -> Box<dyn StorageDriver> {
    let config = DriverConfig { base: base.map(str::to_string), ..Default::default() };
    Box::new(create_driver(config, env.clone()))
}

fn env_with(store: Arc<dyn NamespacedStore>) -> BindingEnv {
    let env = BindingEnv::new();
    env.bind(DEFAULT_BINDING, store);
    env
}

fn sorted(mut keys: Vec<String>) -> Vec<String> {
    keys.sort();
    keys
}

#[tokio::test]
async fn app_prefix_scenario() {
    let store = MemoryStore::new();
    let env = env_with(Arc::new(store.clone()));
    let app = driver(&env, Some("app:"));

    app.set_item("user:1", "alice".into(), SetOptions::default()).await.unwrap();
    assert_eq!(store.get("app:user:1").await.unwrap(), Some(Value::from("alice")));
    assert_eq!(app.get_keys().await.unwrap(), vec!["user:1"]);

    app.clear(None).await.unwrap();
    assert!(store.is_empty());
    assert_eq!(app.get_item("user:1").await.unwrap(), None);
}

#[tokio::test]
async fn get_returns_what_set_stored() {
    let env = env_with(Arc::new(MemoryStore::new()));
    for base in [None, Some("app"), Some("a/b/")] {
        let d = driver(&env, base);
        for (key, value) in [
            ("plain", Value::from("text")),
            ("nested:key/with:parts", Value::Bytes(vec![0, 159, 146, 150])),
            (":leading", Value::from("")),
        ] {
            d.set_item(key, value.clone(), SetOptions::default()).await.unwrap();
            assert_eq!(d.get_item(key).await.unwrap(), Some(value));
            assert!(d.has_item(key).await.unwrap());
        }
    }
}

#[tokio::test]
async fn keys_come_back_exactly_as_set() {
    let env = env_with(Arc::new(MemoryStore::new()));
    let keys = ["user:1", ":odd", "app:nested", "a b c"];
    for base in [None, Some("app:")] {
        let d = driver(&env, base);
        d.clear(None).await.unwrap();
        for key in keys {
            d.set_item(key, "v".into(), SetOptions::default()).await.unwrap();
        }
        let expected: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(sorted(d.get_keys().await.unwrap()), sorted(expected));
    }
}

#[tokio::test]
async fn bases_are_isolated() {
    let env = env_with(Arc::new(MemoryStore::new()));
    let app = driver(&env, Some("app"));
    let apple = driver(&env, Some("apple"));
    app.set_item("x", "1".into(), SetOptions::default()).await.unwrap();
    apple.set_item("y", "2".into(), SetOptions::default()).await.unwrap();

    assert_eq!(app.get_keys().await.unwrap(), vec!["x"]);
    assert_eq!(apple.get_keys().await.unwrap(), vec!["y"]);
    assert!(!app.has_item("y").await.unwrap());

    app.clear(None).await.unwrap();
    assert_eq!(apple.get_item("y").await.unwrap(), Some(Value::from("2")));
}

#[tokio::test]
async fn clear_is_scoped() {
    let store = MemoryStore::new();
    let env = env_with(Arc::new(store.clone()));
    let a = driver(&env, Some("a"));
    let b = driver(&env, Some("b"));
    a.set_item("1", "v".into(), SetOptions::default()).await.unwrap();
    a.set_item("2", "v".into(), SetOptions::default()).await.unwrap();
    b.set_item("1", "v".into(), SetOptions::default()).await.unwrap();

    a.clear(None).await.unwrap();
    assert!(a.get_keys().await.unwrap().is_empty());
    assert!(b.has_item("1").await.unwrap());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn clear_under_sub_base() {
    let env = env_with(Arc::new(MemoryStore::new()));
    let d = driver(&env, Some("app"));
    for key in ["cache:1", "cache:2", "session:1"] {
        d.set_item(key, "v".into(), SetOptions::default()).await.unwrap();
    }
    d.clear(Some("cache:")).await.unwrap();
    assert_eq!(d.get_keys().await.unwrap(), vec!["session:1"]);

    let root = driver(&env, None);
    root.set_item("other", "v".into(), SetOptions::default()).await.unwrap();
    root.clear(Some("app:")).await.unwrap();
    assert_eq!(root.get_keys().await.unwrap(), vec!["other"]);
}

#[tokio::test]
async fn no_base_lists_the_whole_namespace() {
    let store = MemoryStore::new();
    store.put("seeded", "v".into(), PutOptions::default()).await.unwrap();
    let env = env_with(Arc::new(store));
    let d = driver(&env, None);
    d.set_item("user:1", "v".into(), SetOptions::default()).await.unwrap();
    assert_eq!(sorted(d.get_keys().await.unwrap()), vec!["seeded", "user:1"]);
}

#[tokio::test]
async fn remove_twice_is_fine() {
    let env = env_with(Arc::new(MemoryStore::new()));
    let d = driver(&env, Some("app"));
    d.set_item("k", "v".into(), SetOptions::default()).await.unwrap();
    d.remove_item("k").await.unwrap();
    d.remove_item("k").await.unwrap();
    assert!(!d.has_item("k").await.unwrap());
    assert_eq!(d.get_item("k").await.unwrap(), None);
}

#[tokio::test]
async fn empty_key_addresses_the_base_root() {
    let store = MemoryStore::new();
    let env = env_with(Arc::new(store.clone()));
    let d = driver(&env, Some("app"));
    d.set_item("", "root".into(), SetOptions::default()).await.unwrap();
    d.set_item("user:1", "alice".into(), SetOptions::default()).await.unwrap();
    assert_eq!(store.get("app:").await.unwrap(), Some(Value::from("root")));
    assert!(d.has_item("").await.unwrap());
    assert_eq!(d.get_keys().await.unwrap(), vec!["", "user:1"]);

    d.clear(None).await.unwrap();
    assert!(!d.has_item("").await.unwrap());
    assert!(store.is_empty());

    let plain = driver(&env, None);
    assert!(!plain.has_item("").await.unwrap());
    let err = plain.set_item("", "v".into(), SetOptions::default()).await.unwrap_err();
    assert!(matches!(err, KvError::InvalidKey { .. }));
}

#[tokio::test]
async fn clear_folds_sub_base_separators() {
    let env = env_with(Arc::new(MemoryStore::new()));
    let d = driver(&env, Some("app"));
    for key in ["cache:1", "cache:2", "cached", "session:1"] {
        d.set_item(key, "v".into(), SetOptions::default()).await.unwrap();
    }
    d.clear(Some("cache/")).await.unwrap();
    assert_eq!(d.get_keys().await.unwrap(), vec!["cached", "session:1"]);
}

#[tokio::test]
async fn huge_ttl_is_stored_without_panicking() {
    let dir = TempDir::new().unwrap();
    let stores: Vec<Arc<dyn NamespacedStore>> =
        vec![Arc::new(MemoryStore::new()), Arc::new(SledStore::open(dir.path()).unwrap())];
    for store in stores {
        let env = env_with(store);
        let d = driver(&env, Some("app"));
        d.set_item("k", "v".into(), SetOptions::ttl(u64::MAX)).await.unwrap();
        assert_eq!(d.get_item("k").await.unwrap(), Some(Value::from("v")));
        assert_eq!(d.get_keys().await.unwrap(), vec!["k"]);
    }
}

#[tokio::test(start_paused = true)]
async fn default_ttl_expires_items() {
    let env = env_with(Arc::new(MemoryStore::new()));
    let config = DriverConfig { base: Some("app".to_string()), ttl: Some(60), ..Default::default() };
    let d = create_driver(config, env);
    d.set_item("short", "v".into(), SetOptions::default()).await.unwrap();
    d.set_item("long", "v".into(), SetOptions::ttl(600)).await.unwrap();
    d.set_item("never", "v".into(), SetOptions::ttl(0)).await.unwrap();

    tokio::time::advance(Duration::from_secs(61)).await;
    assert!(!d.has_item("short").await.unwrap());
    assert_eq!(sorted(d.get_keys().await.unwrap()), vec!["long", "never"]);

    tokio::time::advance(Duration::from_secs(600)).await;
    assert_eq!(d.get_keys().await.unwrap(), vec!["never"]);
}

#[tokio::test]
async fn store_errors_pass_through() {
    let env = env_with(Arc::new(MemoryStore::new()));
    let d = driver(&env, Some("app"));
    let err = d.set_item("k", "v".into(), SetOptions::ttl(30)).await.unwrap_err();
    assert!(matches!(err, KvError::InvalidExpirationTtl { ttl: 30, min: 60 }));
    assert!(!err.is_configuration());
    assert!(!d.has_item("k").await.unwrap());
}

#[tokio::test]
async fn unknown_binding_is_a_configuration_error() {
    let env = BindingEnv::new();
    let config = DriverConfig { binding: BindingRef::name("MISSING"), ..Default::default() };
    let d = create_driver(config, env);
    let errors = vec![
        d.has_item("k").await.unwrap_err(),
        d.get_item("k").await.unwrap_err(),
        d.set_item("k", "v".into(), SetOptions::default()).await.unwrap_err(),
        d.remove_item("k").await.unwrap_err(),
        d.get_keys().await.unwrap_err(),
        d.clear(None).await.unwrap_err(),
    ];
    for err in errors {
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "invalid binding `MISSING`: no such binding in the environment");
    }
}

#[tokio::test]
async fn binding_is_resolved_on_every_call() {
    let env = BindingEnv::new();
    let d = driver(&env, Some("app"));
    assert!(d.get_keys().await.unwrap_err().is_configuration());

    let first = MemoryStore::new();
    env.bind(DEFAULT_BINDING, Arc::new(first.clone()));
    d.set_item("k", "first".into(), SetOptions::default()).await.unwrap();

    env.bind(DEFAULT_BINDING, Arc::new(MemoryStore::new()));
    assert_eq!(d.get_item("k").await.unwrap(), None);
    assert_eq!(first.get("app:k").await.unwrap(), Some(Value::from("first")));
}

#[tokio::test]
async fn many_keys_are_listed_and_cleared() {
    let store = MemoryStore::new();
    let env = env_with(Arc::new(store.clone()));
    let d = driver(&env, Some("bulk"));
    for i in 0..2500 {
        d.set_item(&format!("item:{:04}", i), "v".into(), SetOptions::default()).await.unwrap();
    }
    assert_eq!(d.get_keys().await.unwrap().len(), 2500);
    d.clear(None).await.unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn works_over_a_sled_binding() {
    let dir = TempDir::new().unwrap();
    let env = env_with(Arc::new(SledStore::open(dir.path()).unwrap()));
    let users = driver(&env, Some("users"));
    let teams = driver(&env, Some("teams"));

    users.set_item("1", Value::json(&["alice", "admin"]).unwrap(), SetOptions::ttl(3600)).await.unwrap();
    users.set_item("2", "bob".into(), SetOptions::default()).await.unwrap();
    teams.set_item("1", "core".into(), SetOptions::default()).await.unwrap();

    let user: Vec<String> = users.get_item("1").await.unwrap().unwrap().parse_json().unwrap();
    assert_eq!(user, vec!["alice", "admin"]);
    assert_eq!(sorted(users.get_keys().await.unwrap()), vec!["1", "2"]);

    users.clear(None).await.unwrap();
    assert!(users.get_keys().await.unwrap().is_empty());
    assert_eq!(teams.get_item("1").await.unwrap(), Some(Value::from("core")));
}
