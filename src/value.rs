use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use crate::Result;

/// An item as held by a namespaced store.
///
/// The store does not interpret items. Structured data travels as JSON text.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Serializes `data` to a JSON text item.
    pub fn json<T: Serialize + ?Sized>(data: &T) -> Result<Value> {
        Ok(Value::Text(serde_json::to_string(data)?))
    }

    /// Parses the item as JSON.
    pub fn parse_json<T: DeserializeOwned>(&self) -> Result<T> {
        let data = match self {
            Value::Text(s) => serde_json::from_str(s)?,
            Value::Bytes(b) => serde_json::from_slice(b)?,
        };
        Ok(data)
    }

    /// Returns the item as text, decoding bytes as UTF-8.
    pub fn into_text(self) -> Result<String> {
        match self {
            Value::Text(s) => Ok(s),
            Value::Bytes(b) => Ok(String::from_utf8(b)?),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Value::Text(s) => s.as_bytes(),
            Value::Bytes(b) => b,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}
