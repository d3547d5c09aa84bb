use std::collections::BTreeMap;
use std::iter::FromIterator;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::errors::{CfsError, ErrorInfo};

fn serde_error(code: &str, err: impl ToString) -> CfsError {
    CfsError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic key ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CfsError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| serde_error("json_write", err))?;
    Ok(bytes)
}

/// Canonical JSON rendered as a UTF-8 string.
pub fn to_canonical_json_string<T: Serialize>(value: &T) -> Result<String, CfsError> {
    let bytes = to_canonical_json_bytes(value)?;
    String::from_utf8(bytes).map_err(|err| serde_error("json_utf8", err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, CfsError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml_deserialize", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_bytes_ignore_insertion_order() {
        let a = json!({"b": 1, "a": {"y": 2, "x": 3}});
        let mut map = Map::new();
        map.insert("a".into(), json!({"x": 3, "y": 2}));
        map.insert("b".into(), json!(1));
        let b = Value::Object(map);
        assert_eq!(
            to_canonical_json_bytes(&a).unwrap(),
            to_canonical_json_bytes(&b).unwrap()
        );
        assert_eq!(
            to_canonical_json_string(&a).unwrap(),
            r#"{"a":{"x":3,"y":2},"b":1}"#
        );
    }
}
