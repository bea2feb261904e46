//! # Record Codec
//!
//! Stateless conversions between typed records and the generic JSON tree that is persisted
//! on disk. Every `encode_*` function has a `decode_*` counterpart such that decoding an
//! encoded record yields the original record.

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::constants::EXTRA_INTERFACES_KEY;
use crate::models::{self, AliasDefinition, NetworkInterface};

/// A persisted document does not have the shape a record expects.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Key '{key}' is missing.")]
    MissingKey { key: String },
    #[error("Key '{key}' must be {expected}.")]
    WrongType { key: String, expected: &'static str },
    #[error("Element {index} of '{key}' is invalid: {reason}")]
    InvalidElement {
        key: String,
        index: usize,
        reason: String,
    },
    #[error("Alias '{name}' is defined more than once.")]
    DuplicateAlias { name: String },
}

/// Renders a document the way it is stored on disk: pretty-printed with a trailing newline.
pub fn json_to_string(document: &Value) -> String {
    let mut out = serde_json::to_string_pretty(document).unwrap_or_else(|_| "{}".to_string());
    out.push('\n');
    out
}

// --- Aliases ---

/// Encodes aliases as an array of objects, in the given order.
pub fn encode_alias_list(aliases: &[AliasDefinition]) -> Value {
    Value::Array(
        aliases
            .iter()
            .map(|alias| serde_json::to_value(alias).unwrap_or(Value::Null))
            .collect(),
    )
}

/// Decodes an array of alias objects. `key` only labels errors.
///
/// Names must pass [`models::is_valid_alias_name`]; they are used as script file names.
pub fn decode_alias_list(key: &str, value: &Value) -> Result<Vec<AliasDefinition>, SchemaError> {
    let elements = value.as_array().ok_or_else(|| SchemaError::WrongType {
        key: key.to_string(),
        expected: "an array of alias objects",
    })?;

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| -> Result<AliasDefinition, SchemaError> {
            if !element.is_object() {
                return Err(SchemaError::InvalidElement {
                    key: key.to_string(),
                    index,
                    reason: "expected an object".to_string(),
                });
            }
            let definition =
                AliasDefinition::deserialize(element).map_err(|e| SchemaError::InvalidElement {
                    key: key.to_string(),
                    index,
                    reason: e.to_string(),
                })?;
            if !models::is_valid_alias_name(&definition.name) {
                return Err(SchemaError::InvalidElement {
                    key: key.to_string(),
                    index,
                    reason: format!("'{}' is not a valid alias name", definition.name),
                });
            }
            Ok(definition)
        })
        .collect()
}

// --- String lists ---

/// Encodes strings as a JSON array.
pub fn encode_string_list(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

/// Reads the array of strings stored under `key` in `record`.
pub fn decode_string_list(key: &str, record: &Map<String, Value>) -> Result<Vec<String>, SchemaError> {
    let value = record.get(key).ok_or_else(|| SchemaError::MissingKey {
        key: key.to_string(),
    })?;
    let wrong_type = || SchemaError::WrongType {
        key: key.to_string(),
        expected: "an array of strings",
    };

    value
        .as_array()
        .ok_or_else(wrong_type)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(wrong_type))
        .collect()
}

// --- Network interfaces ---

/// Encodes the `extra_interfaces` array of an instance record.
pub fn encode_extra_interfaces(interfaces: &[NetworkInterface]) -> Value {
    Value::Array(
        interfaces
            .iter()
            .map(|iface| serde_json::to_value(iface).unwrap_or(Value::Null))
            .collect(),
    )
}

/// Reads the `extra_interfaces` array of an instance record. Records written before the
/// field existed have no such key and decode to an empty list.
pub fn decode_extra_interfaces(
    record: &Map<String, Value>,
) -> Result<Vec<NetworkInterface>, SchemaError> {
    let Some(value) = record.get(EXTRA_INTERFACES_KEY) else {
        return Ok(Vec::new());
    };
    let elements = value.as_array().ok_or_else(|| SchemaError::WrongType {
        key: EXTRA_INTERFACES_KEY.to_string(),
        expected: "an array of interface objects",
    })?;

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            NetworkInterface::deserialize(element).map_err(|e| SchemaError::InvalidElement {
                key: EXTRA_INTERFACES_KEY.to_string(),
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}
