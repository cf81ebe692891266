//! Serialization layer. Tab-indented JSON via serde_json by default.
//!
//! Implement [`Serializer`] if you need a different text format for records.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Default indent written into record files.
pub const DEFAULT_INDENT: &str = "\t";

/// Converts record values to/from the bytes stored in a record file.
pub trait Serializer: Send + Sync {
    /// Encode a value. The output ends with exactly one `\n`.
    fn serialize<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized;

    /// Decode a stored document.
    fn deserialize<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned;
}

/// JSON serializer, pretty-printed with a configurable indent or compact.
#[derive(Debug, Clone)]
pub struct JsonSerializer {
    indent: Option<String>,
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::pretty(DEFAULT_INDENT)
    }
}

impl JsonSerializer {
    /// Tab-indented JSON.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented JSON using `indent` for each nesting level.
    pub fn pretty(indent: impl Into<String>) -> Self {
        Self {
            indent: Some(indent.into()),
        }
    }

    /// Single-line JSON.
    pub fn compact() -> Self {
        Self { indent: None }
    }
}

impl Serializer for JsonSerializer {
    fn serialize<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        let mut out = Vec::with_capacity(128);
        let res = match &self.indent {
            Some(indent) => {
                let fmt = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
                let mut ser = serde_json::Serializer::with_formatter(&mut out, fmt);
                value.serialize(&mut ser)
            }
            None => serde_json::to_writer(&mut out, value),
        };
        res.map_err(|e| {
            if e.is_io() {
                Error::Io(e.to_string())
            } else {
                Error::Serialize(e.to_string())
            }
        })?;
        out.push(b'\n');
        Ok(out)
    }

    fn deserialize<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(bytes).map_err(|e| Error::Deserialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn default_is_tab_indented_with_trailing_newline() {
        let bytes = JsonSerializer::new()
            .serialize(&json!({"name": "Ann"}))
            .unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\n\t\"name\": \"Ann\"\n}\n");
    }

    #[test]
    fn compact_is_one_line() {
        let bytes = JsonSerializer::compact().serialize(&json!([1, 2])).unwrap();
        assert_eq!(bytes, b"[1,2]\n");
    }

    #[test]
    fn non_string_map_keys_fail_to_serialize() {
        let mut m = BTreeMap::new();
        m.insert(vec![1u8], 1);
        let err = JsonSerializer::new().serialize(&m).unwrap_err();
        assert!(matches!(err, Error::Serialize(_)));
    }

    #[test]
    fn wrong_shape_is_a_deserialize_error() {
        let ser = JsonSerializer::new();
        assert!(matches!(
            ser.deserialize::<u32>(b"\"text\"\n"),
            Err(Error::Deserialize(_))
        ));
        assert!(matches!(
            ser.deserialize::<u32>(b"{ broken"),
            Err(Error::Deserialize(_))
        ));
    }
}
