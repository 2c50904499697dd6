use failure::Fail;
use std::{io, string::FromUtf8Error};

/// Error type for kvbind.
///
/// `InvalidBinding` is a configuration error. Every other variant comes from a
/// store and is handed back to the caller exactly as the store raised it.
#[derive(Fail, Debug)]
pub enum KvError {
    /// The binding reference could not be resolved to a live store.
    #[fail(display = "invalid binding `{}`: {}", name, reason)]
    InvalidBinding { name: String, reason: String },
    /// IO error.
    #[fail(display = "{}", _0)]
    Io(#[cause] io::Error),
    /// Serialization or deserialization error.
    #[fail(display = "{}", _0)]
    Serde(#[cause] serde_json::Error),
    /// bincode encode error.
    #[fail(display = "{}", _0)]
    BincodeEncodeError(#[cause] bincode::error::EncodeError),
    /// bincode decode error.
    #[fail(display = "{}", _0)]
    BincodeDecodeError(#[cause] bincode::error::DecodeError),
    /// Sled error
    #[fail(display = "sled error: {}", _0)]
    Sled(#[cause] sled::Error),
    /// Value is not a valid UTF-8 sequence
    #[fail(display = "UTF-8 error: {}", _0)]
    Utf8(#[cause] FromUtf8Error),
    /// The store refused the key name.
    #[fail(display = "invalid key `{}`: {}", key, reason)]
    InvalidKey { key: String, reason: String },
    /// The store refused the expiration window.
    #[fail(
        display = "invalid expiration_ttl of {}: expiration ttl must be at least {}",
        ttl, min
    )]
    InvalidExpirationTtl { ttl: u64, min: u64 },
    /// Error with a string message, for stores without a richer error
    #[fail(display = "{}", _0)]
    StringError(String),
}

impl KvError {
    /// Whether this error comes from binding resolution rather than the store.
    pub fn is_configuration(&self) -> bool {
        matches!(self, KvError::InvalidBinding { .. })
    }
}

impl From<io::Error> for KvError {
    fn from(err: io::Error) -> KvError {
        KvError::Io(err)
    }
}

impl From<serde_json::Error> for KvError {
    fn from(err: serde_json::Error) -> KvError {
        KvError::Serde(err)
    }
}

impl From<bincode::error::EncodeError> for KvError {
    fn from(err: bincode::error::EncodeError) -> Self {
        KvError::BincodeEncodeError(err)
    }
}

impl From<bincode::error::DecodeError> for KvError {
    fn from(err: bincode::error::DecodeError) -> Self {
        KvError::BincodeDecodeError(err)
    }
}

impl From<sled::Error> for KvError {
    fn from(err: sled::Error) -> KvError {
        KvError::Sled(err)
    }
}

impl From<FromUtf8Error> for KvError {
    fn from(err: FromUtf8Error) -> KvError {
        KvError::Utf8(err)
    }
}

/// Result type for kvbind.
pub type Result<T> = std::result::Result<T, KvError>;
