use async_trait::async_trait;
use bincode::{Decode, Encode};
use chrono::Utc;
use log::debug;
use sled::{self, Db};
use std::ops::Bound;
use std::path::PathBuf;
use super::{
    ListKey, ListOptions, ListResult, NamespacedStore, PutOptions, page_limit, validate_key,
    validate_ttl,
};
use crate::{Result, Value};

/// Namespaced store persisted in a sled database.
#[derive(Clone)]
pub struct SledStore {
    t: Db,
}

/// What is written under each key.
#[derive(Encode, Decode, Debug)]
struct Record {
    value: Value,
    // unix seconds
    expires_at: Option<i64>,
}

impl Record {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

fn encode(record: &Record) -> Result<Vec<u8>> {
    Ok(bincode::encode_to_vec(record, bincode::config::standard())?)
}

fn decode(bytes: &[u8]) -> Result<Record> {
    let (record, _) = bincode::decode_from_slice(bytes, bincode::config::standard())?;
    Ok(record)
}

impl SledStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let db = sled::open(path.into())?;
        Ok(Self { t: db })
    }
}

#[async_trait]
impl NamespacedStore for SledStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let res = self.t.get(key.as_bytes())?;
        match res {
            Some(v) => {
                let record = decode(&v)?;
                if record.is_expired(Utc::now().timestamp()) {
                    self.t.remove(key.as_bytes())?;
                    return Ok(None);
                }
                Ok(Some(record.value))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Value, opts: PutOptions) -> Result<()> {
        validate_key(key)?;
        validate_ttl(&opts)?;
        let expires_at = opts
            .expiration_ttl
            .map(|ttl| {
                let now = Utc::now().timestamp();
                i64::try_from(ttl).map_or(i64::MAX, |ttl| now.saturating_add(ttl))
            });
        let record = Record { value, expires_at };
        debug!("put {} (expires at {:?})", key, expires_at);
        self.t.insert(key.as_bytes(), encode(&record)?)?;
        self.t.flush()?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.t.remove(key.as_bytes())?.is_some() {
            debug!("delete {}", key);
            self.t.flush()?;
        }
        Ok(())
    }

    async fn list(&self, opts: ListOptions) -> Result<ListResult> {
        let limit = page_limit(&opts);
        let prefix = opts.prefix.unwrap_or_default();
        let start = match opts.cursor {
            Some(cursor) => Bound::Excluded(cursor.into_bytes()),
            None => Bound::Included(prefix.clone().into_bytes()),
        };

        let now = Utc::now().timestamp();
        let mut keys = Vec::with_capacity(limit);
        let mut list_complete = true;
        for r in self.t.range::<Vec<u8>, _>((start, Bound::Unbounded)) {
            let (k, v) = r?;
            if !k.starts_with(prefix.as_bytes()) {
                break;
            }
            if decode(&v)?.is_expired(now) {
                self.t.remove(&k)?;
                continue;
            }
            if keys.len() == limit {
                list_complete = false;
                break;
            }
            keys.push(ListKey { name: String::from_utf8(k.to_vec())? });
        }

        let cursor = if list_complete { None } else { keys.last().map(|k| k.name.clone()) };
        Ok(ListResult { keys, list_complete, cursor })
    }
}
